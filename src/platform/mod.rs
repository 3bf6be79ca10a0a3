//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging (console on web, env_logger natively)
//! - Panic reporting
//! - The default key-value store

use crate::persistence::KeyValueStore;

/// Install the logger for the current platform. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already installed");
    }
}

/// Install the logger for the current platform. Safe to call more than once.
///
/// Defaults to `info`; `RUST_LOG` overrides it.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already installed");
    }
}

/// `localStorage` when available, otherwise an in-memory store
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match crate::persistence::LocalStore::open() {
        Some(store) => Box::new(store),
        None => Box::new(crate::persistence::MemoryStore::new()),
    }
}

/// In-memory store; native runs do not persist between processes
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    log::debug!("Using in-memory store");
    Box::new(crate::persistence::MemoryStore::new())
}
