//! viewlater Core Library
//!
//! This crate provides the core functionality for viewlater, a personal
//! collection of saved links with optional groups and notes.
//!
//! # Architecture
//!
//! The whole collection is stored as one JSON value under the `myLinks`
//! key. Every operation loads it, works on it in memory, and writes it
//! back in a single step.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! // Save a link
//! let page = ActivePage::new("https://example.com").with_title("Example");
//! store.save_link(&page, NewLink::prefilled(&page))?;
//!
//! // Query links
//! let result = store.query(&Query::new().search("example"))?;
//! ```
//!
//! # Modules
//!
//! - `store`: Facade over every operation (main entry point)
//! - `models`: Link records and user input types
//! - `storage`: Persistence backends and the record store
//! - `duplicate`: Duplicate detection
//! - `query`: Filtering, ordering and paging
//! - `session`: Single-record edit sessions
//! - `bookmarks`: Browser bookmark trees
//! - `import`: Merging bookmark trees into the collection
//! - `config`: Application configuration

pub mod bookmarks;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod import;
pub mod models;
pub mod query;
pub mod session;
pub mod storage;
pub mod store;

pub use bookmarks::{load_bookmarks, parse_bookmarks, BookmarkNode};
pub use config::Config;
pub use error::{LinkError, LinkResult};
pub use import::IMPORTED_GROUP;
pub use models::{ActivePage, GroupChoice, LinkEdit, LinkRecord, NewLink, RecordId};
pub use query::{Query, QueryResult};
pub use session::EditSession;
pub use storage::{
    JsonFilePersistence, MemoryPersistence, Persistence, RecordStore, StorageError, StorageStats,
};
pub use store::Store;
