//! Link collection facade
//!
//! The `Store` ties the record store, duplicate detection, queries, edit
//! sessions and bookmark import together. Every operation reads the whole
//! collection, and writes it back only when something changed.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! let page = ActivePage::new("https://example.com").with_title("Example");
//! store.save_link(&page, NewLink::prefilled(&page))?;
//!
//! let recent = store.query(&store.default_query())?;
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::bookmarks::BookmarkNode;
use crate::config::Config;
use crate::duplicate::{is_duplicate, DuplicateKey};
use crate::error::{LinkError, LinkResult};
use crate::import;
use crate::models::{ActivePage, LinkEdit, LinkRecord, NewLink, RecordId};
use crate::query::{self, Query, QueryResult};
use crate::session::EditSession;
use crate::storage::{JsonFilePersistence, Persistence, RecordStore, StorageStats};

/// Entry point for working with the link collection
pub struct Store<P = JsonFilePersistence> {
    records: RecordStore<P>,
    config: Config,
}

impl Store<JsonFilePersistence> {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config))
    }

    /// Open the store with a specific configuration
    ///
    /// Nothing is read until the first operation; a missing collection
    /// file is an empty collection.
    pub fn open_with_config(config: Config) -> Self {
        let persistence = JsonFilePersistence::from_config(&config);
        Self::with_persistence(persistence, config)
    }
}

impl<P: Persistence> Store<P> {
    /// Build a store over any persistence backend
    pub fn with_persistence(persistence: P, config: Config) -> Self {
        Self {
            records: RecordStore::new(persistence),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the underlying record store
    pub fn records(&self) -> &RecordStore<P> {
        &self.records
    }

    /// Get the underlying record store mutably
    pub fn records_mut(&mut self) -> &mut RecordStore<P> {
        &mut self.records
    }

    // ==================== Link Operations ====================

    /// Save the active page as a new link
    ///
    /// Fails with `InvalidInput` when the page has no URL and with
    /// `DuplicateRecord` when a link with the same URL, title and group
    /// already exists. Title, notes and group are trimmed.
    pub fn save_link(&mut self, page: &ActivePage, input: NewLink) -> LinkResult<LinkRecord> {
        let url = page
            .url()
            .ok_or_else(|| LinkError::InvalidInput("No URL available for this page".to_string()))?;
        let group = input.group.resolve()?;
        let record = LinkRecord::new(url, input.title.trim())
            .with_notes(input.notes.trim())
            .with_group(group);

        let mut collection = self.records.load()?;
        if is_duplicate(DuplicateKey::from(&record), &collection, None) {
            debug!("Refusing duplicate of {}", record.url);
            return Err(LinkError::DuplicateRecord {
                url: record.url,
                title: record.title,
                group: record.group,
            });
        }

        collection.push(record.clone());
        self.records.save(&collection)?;
        info!("Saved link {} ({})", record.id.short(), record.url);
        Ok(record)
    }

    /// Delete a link, returning the removed record
    pub fn delete_link(&mut self, id: &RecordId) -> LinkResult<LinkRecord> {
        let mut collection = self.records.load()?;
        let pos = collection
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| LinkError::RecordNotFound(id.clone()))?;

        let removed = collection.remove(pos);
        self.records.save(&collection)?;
        info!("Deleted link {}", id.short());
        Ok(removed)
    }

    /// Get a link by ID
    pub fn get_link(&mut self, id: &RecordId) -> LinkResult<Option<LinkRecord>> {
        Ok(self
            .records
            .load()?
            .into_iter()
            .find(|record| &record.id == id))
    }

    /// Get all links in stored order
    pub fn all_links(&mut self) -> LinkResult<Vec<LinkRecord>> {
        Ok(self.records.load()?)
    }

    /// Resolve a full ID or unique ID prefix to a record ID
    pub fn resolve_id(&mut self, id_or_prefix: &str) -> LinkResult<RecordId> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(LinkError::InvalidInput("Link ID cannot be empty".to_string()));
        }

        let collection = self.records.load()?;
        if let Some(record) = collection.iter().find(|r| r.id.as_str() == needle) {
            return Ok(record.id.clone());
        }

        let matches: Vec<&LinkRecord> = collection
            .iter()
            .filter(|r| r.id.as_str().starts_with(needle))
            .collect();

        match matches.as_slice() {
            [] => Err(LinkError::RecordNotFound(RecordId::from(needle))),
            [record] => Ok(record.id.clone()),
            _ => Err(LinkError::InvalidInput(format!(
                "Ambiguous ID prefix '{}' matches {} links",
                needle,
                matches.len()
            ))),
        }
    }

    // ==================== Queries ====================

    /// A query using the configured page size
    pub fn default_query(&self) -> Query {
        Query::new().limit(self.config.display_limit)
    }

    /// Filter, order and page the collection
    pub fn query(&mut self, query: &Query) -> LinkResult<QueryResult> {
        let collection = self.records.load()?;
        Ok(query.run(&collection))
    }

    /// Distinct non-empty groups, sorted
    pub fn groups(&mut self) -> LinkResult<Vec<String>> {
        Ok(query::group_index(&self.records.load()?))
    }

    /// Groups with their link counts
    pub fn group_counts(&mut self) -> LinkResult<Vec<(String, usize)>> {
        Ok(query::group_counts(&self.records.load()?))
    }

    // ==================== Editing ====================

    /// Open `id` for editing in `session`
    pub fn begin_edit(
        &mut self,
        session: &mut EditSession,
        id: &RecordId,
    ) -> LinkResult<LinkRecord> {
        let collection = self.records.load()?;
        session.open(id, &collection)
    }

    /// Commit the edit in progress
    pub fn commit_edit(
        &mut self,
        session: &mut EditSession,
        edit: LinkEdit,
    ) -> LinkResult<LinkRecord> {
        let updated = session.commit(edit, &mut self.records)?;
        info!("Updated link {}", updated.id.short());
        Ok(updated)
    }

    // ==================== Import ====================

    /// Merge a bookmark tree into the collection
    ///
    /// Returns how many links were added. The collection is written once,
    /// and only if something was added.
    pub fn import_bookmarks(&mut self, tree: &[BookmarkNode]) -> LinkResult<usize> {
        let mut collection = self.records.load()?;
        let imported = import::merge(tree, &mut collection, Utc::now());

        if imported > 0 {
            self.records.save(&collection)?;
        }
        info!("Imported {} bookmark(s)", imported);
        Ok(imported)
    }

    // ==================== Stats ====================

    /// Get count of links
    pub fn link_count(&mut self) -> LinkResult<usize> {
        Ok(self.records.load()?.len())
    }

    /// Size information for the stored collection
    pub fn stats(&self) -> StorageStats {
        self.records.stats()
    }
}
