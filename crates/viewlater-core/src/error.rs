//! Errors returned by link collection operations

use thiserror::Error;

use crate::models::RecordId;
use crate::storage::StorageError;

/// Errors that can occur while saving, editing, deleting or importing links
#[derive(Error, Debug)]
pub enum LinkError {
    /// Reading or writing the collection failed; nothing was changed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Another record already has the same URL, title and group
    #[error("This link already exists: '{title}' ({url}) in {}", group_label(.group))]
    DuplicateRecord {
        url: String,
        title: String,
        group: String,
    },

    /// The record is gone, possibly deleted elsewhere
    #[error("Link not found: {0}")]
    RecordNotFound(RecordId),

    /// Rejected before touching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// commit or cancel called with no edit in progress
    #[error("No edit in progress")]
    NotEditing,
}

impl LinkError {
    /// Whether this error should be shown to the user
    ///
    /// `NotEditing` indicates a caller bug rather than something the user did.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, LinkError::NotEditing)
    }

    /// Whether the error is a soft warning rather than a failure
    pub fn is_warning(&self) -> bool {
        matches!(self, LinkError::RecordNotFound(_))
    }
}

fn group_label(group: &str) -> String {
    if group.is_empty() {
        "no group".to_string()
    } else {
        format!("group '{}'", group)
    }
}

/// Result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;
