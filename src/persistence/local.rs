//! Browser `localStorage` backend

use web_sys::Storage;

use super::KeyValueStore;
use crate::error::StoreError;

/// Store backed by the window's `localStorage`
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// `None` when the page has no usable `localStorage` (private mode, sandboxed iframe)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("localStorage unavailable, progress will not be saved");
        }
        storage.map(|storage| Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| StoreError::WriteFailed {
                key: key.to_owned(),
            })
    }
}
