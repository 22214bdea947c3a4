//! Data models for viewlater
//!
//! Defines the persisted `LinkRecord`, its identifier, and the input types
//! callers hand to the manager when saving or editing a link.
//!
//! Field names serialize in camelCase so the on-disk collection keeps the
//! same shape as the browser extension's `myLinks` array.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LinkError;

/// Shown when a record has neither a title nor a URL
pub const MISSING_TITLE: &str = "Link Title Missing (URL corrupted)";

/// Opaque identifier of a saved link
///
/// New records get a UUID v4 string. Identifiers written by older versions
/// (timestamp plus random suffix) are kept verbatim. Records stored without
/// one get a UUID v5 derived from their content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Name-based identifier, the same every time for the same `name`
    pub fn derived(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string())
    }

    /// Borrow the identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in list output
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A saved link with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// Unique identifier, assigned at creation
    pub id: RecordId,
    /// The saved URL (empty means the record is corrupted)
    #[serde(default)]
    pub url: String,
    /// Title as entered by the user
    #[serde(default)]
    pub title: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Group tag, empty when ungrouped
    #[serde(default)]
    pub group: String,
    /// When the link was saved; never changed by an update
    #[serde(default = "epoch")]
    pub saved_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Create a new record saved now
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new_at(url, title, Utc::now())
    }

    /// Create a new record with an explicit save time
    pub fn new_at(url: impl Into<String>, title: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::generate(),
            url: url.into(),
            title: title.into(),
            notes: String::new(),
            group: String::new(),
            saved_at: at,
        }
    }

    /// Builder-style notes setter
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Builder-style group setter
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Title to show, falling back to the URL
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else if !self.url.is_empty() {
            &self.url
        } else {
            MISSING_TITLE
        }
    }

    /// Whether the record lost its URL
    pub fn is_corrupted(&self) -> bool {
        self.url.is_empty()
    }

    pub fn is_grouped(&self) -> bool {
        !self.group.is_empty()
    }

    /// Identifier derived from the record's content
    ///
    /// `attempt` separates records whose content is identical.
    pub(crate) fn content_id(&self, attempt: usize) -> RecordId {
        RecordId::derived(&format!(
            "{}\n{}\n{}\n{}\n{}",
            self.url,
            self.title,
            self.group,
            self.saved_at.to_rfc3339(),
            attempt
        ))
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// A record as found on disk, possibly written before ids existed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredRecord {
    #[serde(default)]
    id: Option<RecordId>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    group: String,
    #[serde(default = "epoch")]
    saved_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Convert to a `LinkRecord`, returning whether an id had to be assigned
    pub(crate) fn into_record(self) -> (LinkRecord, bool) {
        let mut record = LinkRecord {
            id: self.id.unwrap_or_else(|| RecordId::from(String::new())),
            url: self.url,
            title: self.title,
            notes: self.notes,
            group: self.group,
            saved_at: self.saved_at,
        };
        let assigned = record.id.as_str().is_empty();
        if assigned {
            record.id = record.content_id(0);
        }
        (record, assigned)
    }
}

/// How the user picked a group for a link
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupChoice {
    /// No group
    #[default]
    Ungrouped,
    /// One of the groups already in use
    Existing(String),
    /// A group typed in by the user
    New(String),
}

impl GroupChoice {
    /// Resolve the choice to the stored group name
    ///
    /// A new group with a blank name is rejected.
    pub fn resolve(&self) -> Result<String, LinkError> {
        match self {
            GroupChoice::Ungrouped => Ok(String::new()),
            GroupChoice::Existing(name) => Ok(name.trim().to_string()),
            GroupChoice::New(name) => {
                let name = name.trim();
                if name.is_empty() {
                    Err(LinkError::InvalidInput(
                        "Please enter a name for the new group.".to_string(),
                    ))
                } else {
                    Ok(name.to_string())
                }
            }
        }
    }
}

/// The page the user wants to save, as supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivePage {
    pub url: Option<String>,
    pub title: Option<String>,
}

impl ActivePage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The page URL, if one is available and non-blank
    pub fn url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// User-entered fields for a new link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLink {
    pub title: String,
    pub notes: String,
    pub group: GroupChoice,
}

impl NewLink {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Prefill the title from the page, as the save form does
    pub fn prefilled(page: &ActivePage) -> Self {
        Self::new(page.title.as_deref().unwrap_or("").trim())
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn group(mut self, group: GroupChoice) -> Self {
        self.group = group;
        self
    }
}

/// Replacement values for the editable fields of a link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkEdit {
    pub title: String,
    pub notes: String,
    pub group: GroupChoice,
}

impl LinkEdit {
    /// Start from the record's current values
    pub fn from_record(record: &LinkRecord) -> Self {
        Self {
            title: record.title.clone(),
            notes: record.notes.clone(),
            group: if record.group.is_empty() {
                GroupChoice::Ungrouped
            } else {
                GroupChoice::Existing(record.group.clone())
            },
        }
    }
}
