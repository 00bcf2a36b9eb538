//! Browser LocalStorage backend

use web_sys::Storage;

use super::{ScoreStore, StoreError};

pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// The window's LocalStorage, if the browser allows it
    pub fn open() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("LocalStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl ScoreStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}
