//! External bookmark trees
//!
//! Browsers hand bookmarks over as a tree of nodes: a node with a `url` is
//! a bookmark, a node with `children` is a folder. Three JSON shapes are
//! accepted:
//!
//! - the array returned by the extension bookmarks API
//! - a single node of that tree
//! - a Chromium profile `Bookmarks` file (`{"roots": {...}}`, nodes use
//!   `name` instead of `title`)
//!
//! Folders may nest arbitrarily deep. Parsing grows the stack on demand and
//! dropping a tree does not recurse.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, DeserializeOwned, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// One node of a bookmark tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookmarkNode {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    /// A bookmark leaf
    pub fn link(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
            children: None,
        }
    }

    /// A folder holding `children`
    pub fn folder(title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        Self {
            url: None,
            title: Some(title.into()),
            children: Some(children),
        }
    }

    /// The url, if present and non-empty
    pub fn bookmark_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn children(&self) -> &[BookmarkNode] {
        self.children.as_deref().unwrap_or_default()
    }
}

impl Drop for BookmarkNode {
    fn drop(&mut self) {
        let mut pending = self.children.take().unwrap_or_default();
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children.take() {
                pending.extend(children);
            }
        }
    }
}

/// Top-level object: either a profile file or a single node
#[derive(Deserialize)]
struct BookmarkDocument {
    #[serde(default)]
    roots: Option<BTreeMap<String, RootEntry>>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, alias = "name")]
    title: Option<String>,
    #[serde(default)]
    children: Option<Vec<BookmarkNode>>,
}

impl BookmarkDocument {
    fn into_nodes(self) -> Vec<BookmarkNode> {
        match self.roots {
            Some(roots) => roots.into_values().filter_map(|entry| entry.0).collect(),
            None => vec![BookmarkNode {
                url: self.url,
                title: self.title,
                children: self.children,
            }],
        }
    }
}

/// Value under profile `roots`
///
/// Roots also hold non-node entries such as "sync_transaction_version";
/// only objects are folders.
struct RootEntry(Option<BookmarkNode>);

impl<'de> Deserialize<'de> for RootEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RootEntryVisitor)
    }
}

struct RootEntryVisitor;

impl<'de> Visitor<'de> for RootEntryVisitor {
    type Value = RootEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a bookmark folder")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<RootEntry, A::Error> {
        let node = BookmarkNode::deserialize(MapAccessDeserializer::new(map))?;
        Ok(RootEntry(Some(node)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RootEntry, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RootEntry(None))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<RootEntry, E> {
        Ok(RootEntry(None))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<RootEntry, E> {
        Ok(RootEntry(None))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<RootEntry, E> {
        Ok(RootEntry(None))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<RootEntry, E> {
        Ok(RootEntry(None))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<RootEntry, E> {
        Ok(RootEntry(None))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RootEntry, E> {
        Ok(RootEntry(None))
    }
}

/// Parse a bookmark tree from JSON text
pub fn parse_bookmarks(json: &str) -> Result<Vec<BookmarkNode>> {
    let nodes = if json.trim_start().starts_with('[') {
        from_json::<Vec<BookmarkNode>>(json)
    } else {
        from_json::<BookmarkDocument>(json).map(BookmarkDocument::into_nodes)
    };
    nodes.context("Not a recognised bookmark file")
}

/// Deserialize with no nesting limit, growing the stack as needed
fn from_json<T: DeserializeOwned>(json: &str) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Read and parse a bookmark file
pub fn load_bookmarks(path: &Path) -> Result<Vec<BookmarkNode>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bookmark file {:?}", path))?;
    parse_bookmarks(&content).with_context(|| format!("Failed to parse {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_api_tree() {
        let json = r#"[
            {"id": "0", "title": "", "children": [
                {"id": "1", "title": "Bookmarks bar", "children": [
                    {"id": "5", "title": "Rust", "url": "https://rust-lang.org"}
                ]}
            ]}
        ]"#;
        let nodes = parse_bookmarks(json).unwrap();
        assert_eq!(nodes.len(), 1);
        let bar = &nodes[0].children()[0];
        assert_eq!(bar.title.as_deref(), Some("Bookmarks bar"));
        assert_eq!(bar.children()[0].bookmark_url(), Some("https://rust-lang.org"));
    }

    #[test]
    fn test_parse_single_node() {
        let json = r#"{"title": "Folder", "children": [{"title": "A", "url": "https://a.com"}]}"#;
        let nodes = parse_bookmarks(json).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children().len(), 1);
    }

    #[test]
    fn test_parse_profile_file() {
        let json = r#"{
            "checksum": "abc",
            "roots": {
                "bookmark_bar": {"type": "folder", "name": "Bookmarks bar", "children": [
                    {"type": "url", "name": "Docs", "url": "https://docs.rs"}
                ]},
                "other": {"type": "folder", "name": "Other bookmarks", "children": []},
                "sync_transaction_version": "1"
            },
            "version": 1
        }"#;
        let nodes = parse_bookmarks(json).unwrap();
        assert_eq!(nodes.len(), 2);
        let bar = nodes
            .iter()
            .find(|n| n.title.as_deref() == Some("Bookmarks bar"))
            .unwrap();
        assert_eq!(bar.children()[0].title.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_bookmarks("42").is_err());
        assert!(parse_bookmarks("not json").is_err());
    }

    #[test]
    fn test_empty_url_is_not_a_bookmark() {
        let node = BookmarkNode {
            url: Some(String::new()),
            title: None,
            children: None,
        };
        assert!(node.bookmark_url().is_none());
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_parse_profile_ignores_non_folder_roots() {
        let json = r#"{"roots": {"synced": [1, 2], "flag": true, "none": null}}"#;
        assert!(parse_bookmarks(json).unwrap().is_empty());
    }

    #[test]
    fn test_parse_trailing_garbage_rejected() {
        assert!(parse_bookmarks(r#"[{"title": "A", "url": "https://a.com"}] x"#).is_err());
    }

    fn nested_json(depth: usize) -> String {
        let mut json = String::from("[");
        for level in 0..depth {
            json.push_str(&format!(r#"{{"title": "level {}", "children": ["#, level));
        }
        json.push_str(r#"{"title": "Deep", "url": "https://deep.com"}"#);
        json.push_str(&"]}".repeat(depth));
        json.push(']');
        json
    }

    #[test]
    fn test_parse_deeply_nested_folders() {
        let nodes = parse_bookmarks(&nested_json(5_000)).unwrap();

        let mut links = Vec::new();
        let imported = crate::import::merge(&nodes, &mut links, chrono::Utc::now());
        assert_eq!(imported, 1);
        assert_eq!(links[0].url, "https://deep.com");
        assert_eq!(links[0].title, "Deep");
    }

    #[test]
    fn test_parse_deeply_nested_profile() {
        let depth = 2_000;
        let json = format!(
            r#"{{"roots": {{"bookmark_bar": {{"name": "Bar", "children": [{}]}}}}}}"#,
            nested_json(depth).trim_start_matches('[').trim_end_matches(']')
        );
        let nodes = parse_bookmarks(&json).unwrap();

        let mut links = Vec::new();
        assert_eq!(crate::import::merge(&nodes, &mut links, chrono::Utc::now()), 1);
    }

    #[test]
    fn test_drop_deep_tree() {
        let mut node = BookmarkNode::link("https://deep.com", "Deep");
        for depth in 0..200_000 {
            node = BookmarkNode::folder(format!("level {}", depth), vec![node]);
        }
        drop(node);
    }

    #[test]
    fn test_load_bookmarks_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookmarks.json");
        fs::write(&path, r#"[{"title": "A", "url": "https://a.com"}]"#).unwrap();

        let nodes = load_bookmarks(&path).unwrap();
        assert_eq!(nodes, vec![BookmarkNode::link("https://a.com", "A")]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_bookmarks(&temp_dir.path().join("nope.json")).is_err());
    }
}
