//! File-backed persistence
//!
//! Each key is stored as `<data_dir>/<key>.json`.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/viewlater/` (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Persistence, StorageError, StorageResult};
use crate::config::Config;

/// Persistence backend writing one JSON file per key
pub struct JsonFilePersistence {
    data_dir: PathBuf,
}

impl JsonFilePersistence {
    /// Store files in the given directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Store files in the configured data directory
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    /// Check if a value has been stored for `key`
    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// Delete the stored value for `key`
    pub fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::from_io(e, path))?;
        }
        Ok(())
    }
}

impl Persistence for JsonFilePersistence {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(key);

        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Read {} bytes from {:?}", bytes.len(), path);
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_read(e, path)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key);
        atomic_write(&path, value)?;
        debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn quarantine(&mut self, key: &str, details: String) -> StorageError {
        let path = self.path_for(key);
        let mut backup_name = path.clone().into_os_string();
        backup_name.push(".corrupt.backup");
        let backup_path = PathBuf::from(backup_name);

        if let Err(e) = fs::copy(&path, &backup_path) {
            return StorageError::from_io(e, backup_path);
        }
        warn!("Corrupt collection at {:?} backed up to {:?}", path, backup_path);

        StorageError::CorruptDocument {
            path,
            backup_path,
            details,
        }
    }

    fn size(&self, key: &str) -> Option<u64> {
        fs::metadata(self.path_for(key)).ok().map(|m| m.len())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let result = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .map_err(|e| StorageError::from_io(e, temp_path.clone()));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })
}
