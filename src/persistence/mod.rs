//! Key/value persistence for records and preferences
//!
//! Everything the game keeps between sessions is a JSON string under a fixed
//! key. Backends:
//! - [`MemoryStore`] for tests and throwaway sessions
//! - [`FileStore`] one file per key on native targets
//! - [`LocalStorageStore`] browser LocalStorage on wasm32

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Best score ever recorded, as a bare number
pub const HIGH_SCORE_KEY: &str = "ssa-high-score";
/// Top five `{initials, score}` entries
pub const LEADERBOARD_KEY: &str = "ssa-leaderboard";
/// Player preferences
pub const SETTINGS_KEY: &str = "ssa-settings";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// String key/value storage
pub trait ScoreStore {
    /// Stored value, `None` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store; nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a key, logging and swallowing backend failures
pub fn read_or_warn(store: &dyn ScoreStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Could not read {}: {}", key, e);
            None
        }
    }
}

/// Encode `value` as JSON and store it under `key`
pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn ScoreStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Write a key, logging and swallowing backend failures
pub fn write_or_warn(store: &mut dyn ScoreStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        log::warn!("Could not write {}: {}", key, e);
    }
}
