//! Error types
//!
//! Nothing here is fatal: callers log the error and treat the triggering
//! operation as a no-op. The worst outcome is a stalled turn that a restart
//! clears.

use thiserror::Error;

/// Errors raised while driving a turn
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no active stick while {state:?}")]
    MissingStick { state: crate::sim::TurnState },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write key {key}")]
    WriteFailed { key: String },
    #[error("value under {key} is malformed: {source}")]
    Malformed {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}
