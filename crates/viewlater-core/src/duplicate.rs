//! Duplicate detection
//!
//! Two records are duplicates when their url, title and group are all
//! equal. Notes and save time are not part of the comparison.

use crate::models::{LinkRecord, RecordId};

/// The fields that identify a link for duplicate checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateKey<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub group: &'a str,
}

impl<'a> DuplicateKey<'a> {
    pub fn new(url: &'a str, title: &'a str, group: &'a str) -> Self {
        Self { url, title, group }
    }
}

impl<'a> From<&'a LinkRecord> for DuplicateKey<'a> {
    fn from(record: &'a LinkRecord) -> Self {
        Self::new(&record.url, &record.title, &record.group)
    }
}

/// Check whether `candidate` collides with a record in `collection`
///
/// The record whose id equals `exclude` is skipped, so an edited record
/// never collides with its own previous version.
pub fn is_duplicate(
    candidate: DuplicateKey<'_>,
    collection: &[LinkRecord],
    exclude: Option<&RecordId>,
) -> bool {
    find_duplicate(candidate, collection, exclude).is_some()
}

/// Like `is_duplicate`, returning the colliding record
pub fn find_duplicate<'c>(
    candidate: DuplicateKey<'_>,
    collection: &'c [LinkRecord],
    exclude: Option<&RecordId>,
) -> Option<&'c LinkRecord> {
    collection
        .iter()
        .filter(|record| exclude != Some(&record.id))
        .find(|record| DuplicateKey::from(*record) == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> Vec<LinkRecord> {
        vec![
            LinkRecord::new("a.com", "A"),
            LinkRecord::new("b.com", "B").with_group("Work"),
        ]
    }

    #[test]
    fn test_same_triple_is_duplicate() {
        let links = collection();
        assert!(is_duplicate(DuplicateKey::new("a.com", "A", ""), &links, None));
        assert!(is_duplicate(
            DuplicateKey::new("b.com", "B", "Work"),
            &links,
            None
        ));
    }

    #[test]
    fn test_different_group_is_not_duplicate() {
        let links = collection();
        assert!(!is_duplicate(
            DuplicateKey::new("a.com", "A", "Work"),
            &links,
            None
        ));
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let links = collection();
        assert!(!is_duplicate(DuplicateKey::new("a.com", "a", ""), &links, None));
    }

    #[test]
    fn test_notes_and_saved_at_ignored() {
        let links = vec![LinkRecord::new("a.com", "A").with_notes("first visit")];
        let candidate = LinkRecord::new("a.com", "A").with_notes("something else");
        assert!(is_duplicate((&candidate).into(), &links, None));
    }

    #[test]
    fn test_excluded_record_is_skipped() {
        let links = collection();
        let own_id = links[0].id.clone();

        assert!(!is_duplicate(
            DuplicateKey::new("a.com", "A", ""),
            &links,
            Some(&own_id)
        ));
        // Excluding one record does not hide another
        assert!(is_duplicate(
            DuplicateKey::new("b.com", "B", "Work"),
            &links,
            Some(&own_id)
        ));
    }

    #[test]
    fn test_find_duplicate_returns_match() {
        let links = collection();
        let found = find_duplicate(DuplicateKey::new("b.com", "B", "Work"), &links, None).unwrap();
        assert_eq!(found.id, links[1].id);
    }

    #[test]
    fn test_empty_collection() {
        assert!(!is_duplicate(DuplicateKey::new("a.com", "A", ""), &[], None));
    }
}
