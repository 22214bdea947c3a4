//! Storage layer
//!
//! The whole link collection is read and written as a single JSON value
//! stored under one well-known key.
//!
//! ## Architecture
//!
//! - **Persistence**: raw key/value backend (JSON file or in-memory)
//! - **RecordStore**: decodes the collection, upgrades legacy records, and
//!   writes the complete collection back in one step
//!
//! There is no partial update: callers load, mutate in memory, and save.

pub mod error;
pub mod memory;
pub mod persistence;
pub mod records;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryPersistence;
pub use persistence::JsonFilePersistence;
pub use records::{RecordStore, StorageStats};

/// Key the link collection is stored under
pub const COLLECTION_KEY: &str = "myLinks";

/// A key/value backend holding serialized collections
pub trait Persistence {
    /// Read the raw value for `key`, `None` if nothing was ever stored
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the value for `key`
    ///
    /// Either the whole value is written or the previous value stays intact.
    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Set aside an unreadable value and describe the failure
    ///
    /// Returns the error to report; the backend keeps a copy of the bad
    /// value so the user can recover it by hand.
    fn quarantine(&mut self, key: &str, details: String) -> StorageError;

    /// Size in bytes of the stored value, if any
    fn size(&self, key: &str) -> Option<u64>;
}
