//! One JSON file per key in a save directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ScoreStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(dir);
        fs::create_dir_all(&store.dir).map_err(|source| StoreError::Io {
            key: store.dir.display().to_string(),
            source,
        })?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ScoreStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Writes to a temp file first, then renames over the old value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let io = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io)?;
        fs::rename(&tmp, &path).map_err(io)?;
        log::debug!("Saved {} to {}", key, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{HIGH_SCORE_KEY, SETTINGS_KEY};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ssa-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_key_reads_none() {
        let store = FileStore::new(scratch_dir("missing"));
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_creates_dir_and_overwrites() {
        let dir = scratch_dir("overwrite");
        let mut store = FileStore::new(&dir);
        store.set(SETTINGS_KEY, "{\"volume\":0.5}").unwrap();
        store.set(SETTINGS_KEY, "{\"volume\":0.25}").unwrap();
        assert_eq!(
            store.get(SETTINGS_KEY).unwrap().as_deref(),
            Some("{\"volume\":0.25}")
        );
        assert!(!dir.join("ssa-settings.json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_creates_dir() {
        let dir = scratch_dir("open").join("nested");
        let store = FileStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
        let _ = fs::remove_dir_all(dir.parent().unwrap());
    }
}
