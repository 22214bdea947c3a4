//! Bookmark import
//!
//! Copies every bookmark in an external tree into the collection under the
//! "Imported Links" group, skipping ones that are already there.

use chrono::{DateTime, Utc};

use crate::bookmarks::BookmarkNode;
use crate::duplicate::{is_duplicate, DuplicateKey};
use crate::models::LinkRecord;

/// Group every imported bookmark is filed under
pub const IMPORTED_GROUP: &str = "Imported Links";

/// Merge the bookmarks in `tree` into `collection`
///
/// Walks the tree depth-first, a node's own bookmark before its children.
/// Duplicates are checked against the collection as it grows, so a
/// bookmark appearing twice in the tree is added once. Returns the number
/// of records added; all of them get `saved_at` as their save time.
pub fn merge(
    tree: &[BookmarkNode],
    collection: &mut Vec<LinkRecord>,
    saved_at: DateTime<Utc>,
) -> usize {
    let mut imported = 0;
    let mut stack: Vec<&BookmarkNode> = tree.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if let Some(url) = node.bookmark_url() {
            let title = node
                .title
                .as_deref()
                .filter(|title| !title.is_empty())
                .unwrap_or(url);

            let key = DuplicateKey::new(url, title, IMPORTED_GROUP);
            if !is_duplicate(key, collection.as_slice(), None) {
                collection
                    .push(LinkRecord::new_at(url, title, saved_at).with_group(IMPORTED_GROUP));
                imported += 1;
            }
        }

        stack.extend(node.children().iter().rev());
    }

    imported
}
