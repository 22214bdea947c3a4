//! Single-record edit session
//!
//! An `EditSession` is either idle or editing exactly one record. Opening
//! captures the fields an edit may not change (`id`, `url`, `savedAt`);
//! committing rebuilds the record from that snapshot plus the new title,
//! notes and group.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::duplicate::{find_duplicate, DuplicateKey};
use crate::error::{LinkError, LinkResult};
use crate::models::{LinkEdit, LinkRecord, RecordId};
use crate::storage::{Persistence, RecordStore};

/// Immutable fields of the record being edited
#[derive(Debug, Clone, PartialEq)]
pub struct EditSnapshot {
    pub id: RecordId,
    pub url: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum EditState {
    #[default]
    Idle,
    Editing(EditSnapshot),
}

/// Tracks at most one in-progress edit
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    state: EditState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    /// Id of the record being edited
    pub fn active_id(&self) -> Option<&RecordId> {
        self.snapshot().map(|s| &s.id)
    }

    pub fn snapshot(&self) -> Option<&EditSnapshot> {
        match &self.state {
            EditState::Editing(snapshot) => Some(snapshot),
            EditState::Idle => None,
        }
    }

    /// Start editing the record with `id`
    ///
    /// Returns the record's current values so the caller can prefill its
    /// form. Opening while another edit is active replaces that edit. If the
    /// record is missing the session is left as it was.
    pub fn open(&mut self, id: &RecordId, collection: &[LinkRecord]) -> LinkResult<LinkRecord> {
        let record = collection
            .iter()
            .find(|record| &record.id == id)
            .ok_or_else(|| LinkError::RecordNotFound(id.clone()))?;

        debug!("Editing link {}", id);
        self.state = EditState::Editing(EditSnapshot {
            id: record.id.clone(),
            url: record.url.clone(),
            saved_at: record.saved_at,
        });
        Ok(record.clone())
    }

    /// Apply `edit` to the record being edited and persist it
    ///
    /// On a duplicate, invalid input or storage failure the session stays
    /// open so the caller can fix the input and retry. If the record was
    /// deleted in the meantime the session closes with `RecordNotFound`.
    pub fn commit<P: Persistence>(
        &mut self,
        edit: LinkEdit,
        store: &mut RecordStore<P>,
    ) -> LinkResult<LinkRecord> {
        let snapshot = self.snapshot().cloned().ok_or(LinkError::NotEditing)?;
        let group = edit.group.resolve()?;

        let updated = LinkRecord {
            id: snapshot.id.clone(),
            url: snapshot.url,
            title: edit.title.trim().to_string(),
            notes: edit.notes.trim().to_string(),
            group,
            saved_at: snapshot.saved_at,
        };

        let mut collection = store.load()?;

        let Some(pos) = collection.iter().position(|r| r.id == snapshot.id) else {
            warn!("Link {} disappeared during edit", snapshot.id);
            self.state = EditState::Idle;
            return Err(LinkError::RecordNotFound(snapshot.id));
        };

        if let Some(existing) =
            find_duplicate(DuplicateKey::from(&updated), &collection, Some(&snapshot.id))
        {
            debug!("Edit of {} collides with {}", snapshot.id, existing.id);
            return Err(LinkError::DuplicateRecord {
                url: updated.url,
                title: updated.title,
                group: updated.group,
            });
        }

        collection[pos] = updated.clone();
        store.save(&collection)?;

        self.state = EditState::Idle;
        Ok(updated)
    }

    /// Abandon the current edit without saving
    pub fn cancel(&mut self) -> LinkResult<()> {
        if !self.is_editing() {
            return Err(LinkError::NotEditing);
        }
        self.state = EditState::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupChoice;
    use crate::storage::MemoryPersistence;

    fn store_with(records: &[LinkRecord]) -> RecordStore<MemoryPersistence> {
        let mut store = RecordStore::new(MemoryPersistence::new());
        store.save(records).unwrap();
        store
    }

    fn edit(title: &str, notes: &str, group: GroupChoice) -> LinkEdit {
        LinkEdit {
            title: title.to_string(),
            notes: notes.to_string(),
            group,
        }
    }

    #[test]
    fn test_starts_idle() {
        let session = EditSession::new();
        assert!(!session.is_editing());
        assert!(session.active_id().is_none());
    }

    #[test]
    fn test_open_missing_stays_idle() {
        let mut session = EditSession::new();
        let links = vec![LinkRecord::new("a.com", "A")];

        let err = session.open(&RecordId::from("missing"), &links).unwrap_err();
        assert!(matches!(err, LinkError::RecordNotFound(_)));
        assert!(!session.is_editing());
    }

    #[test]
    fn test_open_returns_current_values() {
        let mut session = EditSession::new();
        let links = vec![LinkRecord::new("a.com", "A").with_notes("n").with_group("Work")];

        let current = session.open(&links[0].id, &links).unwrap();
        assert_eq!(current, links[0]);
        assert_eq!(session.active_id(), Some(&links[0].id));
        assert_eq!(session.snapshot().unwrap().url, "a.com");
    }

    #[test]
    fn test_commit_preserves_identity() {
        let original = LinkRecord::new("a.com", "A");
        let mut store = store_with(&[original.clone()]);
        let mut session = EditSession::new();
        session.open(&original.id, &store.load().unwrap()).unwrap();

        let updated = session
            .commit(
                edit(" New title ", "notes", GroupChoice::New("Work".to_string())),
                &mut store,
            )
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.url, original.url);
        assert_eq!(updated.saved_at, original.saved_at);
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.group, "Work");
        assert!(!session.is_editing());
        assert_eq!(store.load().unwrap(), vec![updated]);
    }

    #[test]
    fn test_commit_keeping_same_values_is_not_duplicate() {
        let original = LinkRecord::new("a.com", "A");
        let mut store = store_with(&[original.clone()]);
        let mut session = EditSession::new();
        session.open(&original.id, &store.load().unwrap()).unwrap();

        let updated = session
            .commit(LinkEdit::from_record(&original), &mut store)
            .unwrap();
        assert_eq!(updated, original);
    }

    #[test]
    fn test_commit_duplicate_stays_editing() {
        let a = LinkRecord::new("a.com", "A").with_group("Work");
        let b = LinkRecord::new("a.com", "B");
        let mut store = store_with(&[a.clone(), b.clone()]);
        let mut session = EditSession::new();
        session.open(&b.id, &store.load().unwrap()).unwrap();

        let err = session
            .commit(
                edit("A", "", GroupChoice::Existing("Work".to_string())),
                &mut store,
            )
            .unwrap_err();

        assert!(matches!(err, LinkError::DuplicateRecord { .. }));
        assert!(session.is_editing());
        assert_eq!(store.load().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_commit_blank_new_group_rejected() {
        let original = LinkRecord::new("a.com", "A");
        let mut store = store_with(&[original.clone()]);
        let mut session = EditSession::new();
        session.open(&original.id, &store.load().unwrap()).unwrap();

        let err = session
            .commit(edit("A", "", GroupChoice::New("  ".to_string())), &mut store)
            .unwrap_err();
        assert!(matches!(err, LinkError::InvalidInput(_)));
        assert!(session.is_editing());
    }

    #[test]
    fn test_commit_after_delete_closes_session() {
        let original = LinkRecord::new("a.com", "A");
        let mut store = store_with(&[original.clone()]);
        let mut session = EditSession::new();
        session.open(&original.id, &store.load().unwrap()).unwrap();

        // Deleted from elsewhere
        store.save(&[]).unwrap();

        let err = session
            .commit(edit("B", "", GroupChoice::Ungrouped), &mut store)
            .unwrap_err();
        assert!(matches!(err, LinkError::RecordNotFound(_)));
        assert!(!session.is_editing());
    }

    #[test]
    fn test_commit_storage_failure_keeps_session() {
        let original = LinkRecord::new("a.com", "A");
        let mut store = store_with(&[original.clone()]);
        let mut session = EditSession::new();
        session.open(&original.id, &store.load().unwrap()).unwrap();

        store.persistence_mut().set_fail_writes(true);
        let err = session
            .commit(edit("B", "", GroupChoice::Ungrouped), &mut store)
            .unwrap_err();
        assert!(matches!(err, LinkError::Storage(_)));
        assert!(session.is_editing());
        assert_eq!(store.load().unwrap(), vec![original]);

        // Retry once storage recovers
        store.persistence_mut().set_fail_writes(false);
        let updated = session
            .commit(edit("B", "", GroupChoice::Ungrouped), &mut store)
            .unwrap();
        assert_eq!(updated.title, "B");
    }

    #[test]
    fn test_commit_while_idle() {
        let mut store = store_with(&[]);
        let mut session = EditSession::new();
        let err = session
            .commit(edit("A", "", GroupChoice::Ungrouped), &mut store)
            .unwrap_err();
        assert!(matches!(err, LinkError::NotEditing));
    }

    #[test]
    fn test_cancel() {
        let links = vec![LinkRecord::new("a.com", "A")];
        let mut session = EditSession::new();

        assert!(matches!(session.cancel(), Err(LinkError::NotEditing)));

        session.open(&links[0].id, &links).unwrap();
        session.cancel().unwrap();
        assert!(!session.is_editing());
    }

    #[test]
    fn test_open_replaces_previous_edit() {
        let links = vec![LinkRecord::new("a.com", "A"), LinkRecord::new("b.com", "B")];
        let mut session = EditSession::new();

        session.open(&links[0].id, &links).unwrap();
        session.open(&links[1].id, &links).unwrap();
        assert_eq!(session.active_id(), Some(&links[1].id));
    }
}
