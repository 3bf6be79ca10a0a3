//! Save/load through a string key-value store
//!
//! The game only ever persists two counters (best score, bonus tally) plus
//! player settings. Values are JSON strings; an absent key means "nothing
//! saved yet" and is never an error.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

/// Storage keys
pub mod keys {
    pub const BEST_SCORE: &str = "stick_bridge_best_score";
    pub const BONUS_TALLY: &str = "stick_bridge_bonus_tally";
    pub const SETTINGS: &str = "stick_bridge_settings";
}

/// String key-value persistence contract
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Read and decode a JSON value; `Ok(None)` when the key is absent
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key) else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Malformed {
            key: key.to_owned(),
            source,
        })
}

/// Encode a value as JSON and write it
pub fn save_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, &json)
}
