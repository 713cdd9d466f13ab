//! On-disk credential store.
//!
//! All keys live in one JSON object file so a `set`/`remove` is a single
//! atomic replace: the new content is written to a temp file in the same
//! directory and renamed over `credentials.json`. A missing file reads as an
//! empty store.

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;

use super::CredentialStore;
use crate::error::StoreError;

const FILE_NAME: &str = "credentials.json";

/// Credential store persisted under the platform config directory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at the platform default location
    /// (`<config dir>/shhava/credentials.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory can be determined or the
    /// directory cannot be created.
    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("com", "shhava", "shhava").ok_or(StoreError::NoConfigDir)?;
        Self::open_in(dirs.config_dir().to_path_buf())
    }

    /// Open the store in an explicit directory (used by tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_in(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)?;
        Ok(Self { path: dir.join(FILE_NAME), lock: Mutex::new(()) })
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut values = self.read_all()?;
        values.insert(key.to_owned(), value.to_owned());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}
