//! In-memory persistence, for tests and embedding

use std::collections::HashMap;
use std::path::PathBuf;

use super::{Persistence, StorageError, StorageResult};

/// Keeps values in a map; nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryPersistence {
    values: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw value already stored under `key`
    pub fn with_value(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value.into());
        Self {
            values,
            fail_writes: false,
        }
    }

    /// Make every subsequent `set` fail, as a full disk would
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw stored value, for assertions
    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.values.get(key).map(Vec::as_slice)
    }
}

impl Persistence for MemoryPersistence {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Unavailable(format!(
                "writes to '{}' are disabled",
                key
            )));
        }
        self.values.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn quarantine(&mut self, key: &str, details: String) -> StorageError {
        let backup_key = format!("{}.corrupt.backup", key);
        if let Some(value) = self.values.get(key).cloned() {
            self.values.insert(backup_key.clone(), value);
        }
        StorageError::CorruptDocument {
            path: PathBuf::from(key),
            backup_path: PathBuf::from(backup_key),
            details,
        }
    }

    fn size(&self, key: &str) -> Option<u64> {
        self.values.get(key).map(|v| v.len() as u64)
    }
}
