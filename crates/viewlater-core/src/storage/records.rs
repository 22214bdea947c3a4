//! Whole-collection record store
//!
//! `load` returns every record, `save` replaces every record. Both go
//! through a `Persistence` backend under a single key.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::{Persistence, StorageError, StorageResult, COLLECTION_KEY};
use crate::models::{LinkRecord, RecordId, StoredRecord};

/// Storage statistics for the collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Whether anything has been written yet
    pub exists: bool,
    /// Size of the stored collection in bytes
    pub size: u64,
}

impl StorageStats {
    /// Human-readable size, e.g. "1.5 KB"
    pub fn size_human(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;

        if self.size >= MB {
            format!("{:.1} MB", self.size as f64 / MB as f64)
        } else if self.size >= KB {
            format!("{:.1} KB", self.size as f64 / KB as f64)
        } else {
            format!("{} B", self.size)
        }
    }
}

/// Reads and writes the complete link collection
pub struct RecordStore<P> {
    persistence: P,
    key: String,
}

impl<P: Persistence> RecordStore<P> {
    /// Store the collection under the default key
    pub fn new(persistence: P) -> Self {
        Self::with_key(persistence, COLLECTION_KEY)
    }

    /// Store the collection under a custom key
    pub fn with_key(persistence: P, key: impl Into<String>) -> Self {
        Self {
            persistence,
            key: key.into(),
        }
    }

    /// The key the collection lives under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the persistence backend
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Get the persistence backend mutably
    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Load the whole collection
    ///
    /// Returns an empty collection if nothing has been stored yet. Records
    /// written without an id, or sharing an id with an earlier record, get
    /// one derived from their content and the upgraded collection is written
    /// back once. Derived ids are the same on every load, so they stay
    /// usable when the write-back fails.
    pub fn load(&mut self) -> StorageResult<Vec<LinkRecord>> {
        let Some(bytes) = self.persistence.get(&self.key)? else {
            debug!("No collection stored under '{}'", self.key);
            return Ok(Vec::new());
        };

        let stored: Vec<StoredRecord> = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(e) => return Err(self.persistence.quarantine(&self.key, e.to_string())),
        };

        let mut seen: HashSet<RecordId> = HashSet::with_capacity(stored.len());
        let mut upgraded = 0;
        let mut records = Vec::with_capacity(stored.len());

        for entry in stored {
            let (mut record, assigned) = entry.into_record();
            let mut changed = assigned;
            let mut attempt = 0;
            while !seen.insert(record.id.clone()) {
                attempt += 1;
                record.id = record.content_id(attempt);
                changed = true;
            }
            if changed {
                upgraded += 1;
            }
            records.push(record);
        }

        if upgraded > 0 {
            info!("Assigned ids to {} legacy record(s)", upgraded);
            if let Err(e) = self.save(&records) {
                warn!("Could not write upgraded collection: {}", e);
            }
        }

        debug!("Loaded {} record(s)", records.len());
        Ok(records)
    }

    /// Replace the stored collection
    pub fn save(&mut self, records: &[LinkRecord]) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(records).map_err(|e| StorageError::Encode {
            key: self.key.clone(),
            details: e.to_string(),
        })?;
        self.persistence.set(&self.key, &bytes)?;
        debug!("Saved {} record(s)", records.len());
        Ok(())
    }

    /// Size information for the stored collection
    pub fn stats(&self) -> StorageStats {
        match self.persistence.size(&self.key) {
            Some(size) => StorageStats { exists: true, size },
            None => StorageStats::default(),
        }
    }
}
