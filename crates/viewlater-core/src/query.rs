//! Query engine
//!
//! Filters a collection by group and free text, orders it newest first,
//! and truncates it to a page. Each call is independent; toggling between
//! the short and full view is the caller's business.

use std::collections::BTreeMap;

use crate::models::LinkRecord;

/// Number of records shown before the user asks for all of them
pub const DEFAULT_LIMIT: usize = 3;

/// Parameters for a single query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Exact, case-sensitive group to keep; empty keeps every group
    pub group: String,
    /// Case-insensitive text matched against title, url, notes and group
    pub search: String,
    /// Page size when `show_all` is false
    pub limit: usize,
    /// Return every match instead of the first `limit`
    pub show_all: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            group: String::new(),
            search: String::new(),
            limit: DEFAULT_LIMIT,
            show_all: false,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    /// Check whether a record passes the group and text filters
    pub fn matches(&self, record: &LinkRecord) -> bool {
        if !self.group.is_empty() && record.group != self.group {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        [&record.title, &record.url, &record.notes, &record.group]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Run the query against a collection
    pub fn run(&self, collection: &[LinkRecord]) -> QueryResult {
        let mut records: Vec<LinkRecord> = collection
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();

        // Stable: records saved at the same instant keep their input order
        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));

        let total = records.len();
        if !self.show_all {
            records.truncate(self.limit);
        }

        QueryResult { records, total }
    }
}

/// Output of `Query::run`
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Matching records, newest first, truncated unless `show_all`
    pub records: Vec<LinkRecord>,
    /// Number of matches before truncation
    pub total: usize,
}

impl QueryResult {
    /// Whether some matches were cut off by the page limit
    pub fn is_truncated(&self) -> bool {
        self.records.len() < self.total
    }

    /// No record matched the filters
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Run a query with the default page limit
pub fn query(
    collection: &[LinkRecord],
    group: &str,
    search: &str,
    show_all: bool,
) -> QueryResult {
    Query::new()
        .group(group)
        .search(search)
        .show_all(show_all)
        .run(collection)
}

/// Distinct non-empty groups, sorted
pub fn group_index(collection: &[LinkRecord]) -> Vec<String> {
    group_counts(collection)
        .into_iter()
        .map(|(group, _)| group)
        .collect()
}

/// Distinct non-empty groups with the number of records in each
pub fn group_counts(collection: &[LinkRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in collection.iter().filter(|r| r.is_grouped()) {
        *counts.entry(record.group.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(group, count)| (group.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(minutes: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn five_links() -> Vec<LinkRecord> {
        vec![
            LinkRecord::new_at("https://one.com", "One", at(1)),
            LinkRecord::new_at("https://four.com", "Four", at(4)).with_group("Work"),
            LinkRecord::new_at("https://two.com", "Two", at(2)).with_notes("Rust tips"),
            LinkRecord::new_at("https://five.com", "Five", at(5)).with_group("Reading"),
            LinkRecord::new_at("https://three.com", "Three", at(3)).with_group("Work"),
        ]
    }

    fn titles(result: &QueryResult) -> Vec<&str> {
        result.records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_no_filters_sorts_newest_first() {
        let links = five_links();
        let result = Query::new().show_all(true).run(&links);
        assert_eq!(titles(&result), vec!["Five", "Four", "Three", "Two", "One"]);
        assert_eq!(result.total, 5);
        assert!(!result.is_truncated());
    }

    #[test]
    fn test_query_is_deterministic() {
        let links = five_links();
        let first = query(&links, "", "", true);
        let second = query(&links, "", "", true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_page_is_three_newest() {
        let links = five_links();
        let short = query(&links, "", "", false);
        assert_eq!(titles(&short), vec!["Five", "Four", "Three"]);
        assert_eq!(short.total, 5);
        assert!(short.is_truncated());

        let full = query(&links, "", "", true);
        assert_eq!(&full.records[..3], &short.records[..]);
        assert_eq!(full.records.len(), 5);
    }

    #[test]
    fn test_group_filter_is_exact() {
        let links = five_links();
        let result = Query::new().group("Work").run(&links);
        assert_eq!(titles(&result), vec!["Four", "Three"]);

        let result = Query::new().group("work").run(&links);
        assert!(result.is_empty());
    }

    #[test]
    fn test_search_across_fields() {
        let links = five_links();

        // notes
        assert_eq!(titles(&Query::new().search("rust").run(&links)), vec!["Two"]);
        // url
        assert_eq!(titles(&Query::new().search("FIVE.COM").run(&links)), vec!["Five"]);
        // group
        assert_eq!(
            titles(&Query::new().search("read").run(&links)),
            vec!["Five"]
        );
        // title
        assert_eq!(titles(&Query::new().search("thr").run(&links)), vec!["Three"]);
    }

    #[test]
    fn test_group_and_search_combined() {
        let links = five_links();
        let result = Query::new().group("Work").search("four").run(&links);
        assert_eq!(titles(&result), vec!["Four"]);
    }

    #[test]
    fn test_no_matches() {
        let links = five_links();
        let result = Query::new().search("nothing like this").run(&links);
        assert!(result.is_empty());
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_custom_limit() {
        let links = five_links();
        let result = Query::new().limit(1).run(&links);
        assert_eq!(titles(&result), vec!["Five"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let links = vec![
            LinkRecord::new_at("https://a.com", "A", at(0)),
            LinkRecord::new_at("https://b.com", "B", at(0)),
        ];
        assert_eq!(titles(&query(&links, "", "", true)), vec!["A", "B"]);
    }

    #[test]
    fn test_group_index_sorted_and_distinct() {
        let links = five_links();
        assert_eq!(group_index(&links), vec!["Reading", "Work"]);
        assert_eq!(
            group_counts(&links),
            vec![("Reading".to_string(), 1), ("Work".to_string(), 2)]
        );
        assert!(group_index(&[]).is_empty());
    }
}
