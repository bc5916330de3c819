//! Catalog - the in-memory record table
//!
//! Provides:
//! - Record shape with derived search blob and clean category
//! - Record indexing (search blob precomputation)
//! - Category listing and category scoping
//! - Loading from a spreadsheet JSON export
//! - ABNT citation rendering

mod category;
mod citation;
mod loader;

pub use category::clean_category;
pub use citation::abnt_citation;
pub use loader::{canonical_field, load_catalog, parse_catalog};

use serde::Serialize;

use crate::context::normalize;

/// Canonical field names produced by the loader
pub mod fields {
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const SUMMARY: &str = "summary";
    pub const CATEGORY: &str = "category";
    pub const YEAR: &str = "year";
    pub const PUBLISHER: &str = "publisher";
    pub const DDC: &str = "ddc";
    pub const CALL_NUMBER: &str = "call_number";
    pub const KEYWORDS: &str = "keywords";
}

/// Placeholder strings a spreadsheet export leaves in empty cells.
const NULL_SENTINELS: &[&str] = &["nan", "none", "null", "nat", "<na>"];

/// One catalog entry.
///
/// Fields are fixed once the record is indexed, so `search_blob` and
/// `category_clean` always reflect the current field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    id: usize,
    fields: Vec<(String, String)>,
    #[serde(skip)]
    search_blob: String,
    category_clean: String,
}

impl Record {
    /// Row position within the table load
    pub fn id(&self) -> usize {
        self.id
    }

    /// Field value, or "" when the record has no such field
    pub fn field(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// All fields in source column order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn title(&self) -> &str {
        self.field(fields::TITLE)
    }

    pub fn author(&self) -> &str {
        self.field(fields::AUTHOR)
    }

    pub fn search_blob(&self) -> &str {
        &self.search_blob
    }

    pub fn category_clean(&self) -> &str {
        &self.category_clean
    }
}

/// Builds indexed records from raw field values.
#[derive(Debug, Clone)]
pub struct RecordIndexer {
    searchable_fields: Vec<String>,
}

impl RecordIndexer {
    pub fn new(searchable_fields: Vec<String>) -> Self {
        Self { searchable_fields }
    }

    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    /// Sanitize field values and precompute the derived columns.
    ///
    /// A duplicated field name keeps its first value.
    pub fn index(&self, id: usize, raw_fields: Vec<(String, String)>) -> Record {
        let mut cleaned: Vec<(String, String)> = Vec::with_capacity(raw_fields.len());
        for (name, value) in raw_fields {
            if cleaned.iter().any(|(existing, _)| *existing == name) {
                continue;
            }
            cleaned.push((name, sanitize_value(&value)));
        }

        let mut record = Record {
            id,
            fields: cleaned,
            search_blob: String::new(),
            category_clean: String::new(),
        };

        record.category_clean = clean_category(record.field(fields::CATEGORY));
        record.search_blob = self.blob_for(&record);
        record
    }

    fn blob_for(&self, record: &Record) -> String {
        let joined = self
            .searchable_fields
            .iter()
            .map(|name| {
                if name == fields::CATEGORY {
                    record.category_clean()
                } else {
                    record.field(name)
                }
            })
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        normalize(&joined)
    }
}

impl Default for RecordIndexer {
    fn default() -> Self {
        Self::new(
            [
                fields::TITLE,
                fields::AUTHOR,
                fields::CATEGORY,
                fields::SUMMARY,
                fields::KEYWORDS,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
    }
}

fn sanitize_value(value: &str) -> String {
    let trimmed = value.trim();
    if NULL_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
    {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// The record table. Built once per load and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Index raw rows, using row position as the record id
    pub fn from_rows(rows: Vec<Vec<(String, String)>>, indexer: &RecordIndexer) -> Self {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(id, fields)| indexer.index(id, fields))
            .collect();
        Self::new(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Sorted distinct categories, ignoring blank or stray short values
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .records
            .iter()
            .map(|record| record.category_clean())
            .filter(|category| category.chars().count() > 2)
            .map(String::from)
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Records whose clean category equals `category`.
    ///
    /// An unknown category gives an empty scope, not the whole table.
    pub fn scope_by_category(&self, category: &str) -> Vec<&Record> {
        let wanted = category.trim();
        self.records
            .iter()
            .filter(|record| record.category_clean() == wanted)
            .collect()
    }

    /// Every record, in table order
    pub fn all(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }

    /// First `size` records of the unfiltered table
    pub fn fallback_pool(&self, size: usize) -> &[Record] {
        &self.records[..size.min(self.records.len())]
    }
}


#[cfg(test)]
mod tests {
    use super::testing::sample_catalog;
    use super::*;

    #[test]
    fn test_missing_field_reads_as_empty() {
        let record = RecordIndexer::default().index(0, vec![("title".into(), "Só título".into())]);
        assert_eq!(record.field("author"), "");
        assert_eq!(record.field("call_number"), "");
    }

    #[test]
    fn test_null_sentinels_become_empty() {
        let record = RecordIndexer::default().index(
            0,
            vec![
                ("title".into(), "Roma".into()),
                ("author".into(), "nan".into()),
                ("summary".into(), "None".into()),
            ],
        );
        assert_eq!(record.author(), "");
        assert_eq!(record.field("summary"), "");
        assert_eq!(record.search_blob(), "roma");
    }

    #[test]
    fn test_search_blob_is_normalized_concatenation() {
        let record = RecordIndexer::default().index(
            3,
            vec![
                ("title".into(), "Montagem Soviética".into()),
                ("author".into(), "Eisenstein".into()),
                ("category".into(), "Cinema +1".into()),
                ("publisher".into(), "Zahar".into()),
            ],
        );
        assert_eq!(record.search_blob(), "montagem sovietica eisenstein cinema");
        assert_eq!(record.category_clean(), "Cinema");
        assert_eq!(record.field("category"), "Cinema +1");
    }

    #[test]
    fn test_searchable_fields_are_configurable() {
        let indexer = RecordIndexer::new(vec!["publisher".into()]);
        let record = indexer.index(
            0,
            vec![
                ("title".into(), "Roma".into()),
                ("publisher".into(), "Cosac Naify".into()),
            ],
        );
        assert_eq!(record.search_blob(), "cosac naify");
    }

    #[test]
    fn test_categories_are_sorted_and_distinct() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.categories(),
            vec!["Antropologia", "Cinema", "Filosofia", "Fotografia"]
        );
    }

    #[test]
    fn test_scope_by_category() {
        let catalog = sample_catalog();
        let cinema = catalog.scope_by_category("Cinema");
        assert_eq!(cinema.len(), 2);
        assert!(catalog.scope_by_category("Culinária").is_empty());
    }

    #[test]
    fn test_fallback_pool_is_bounded_by_table() {
        let catalog = sample_catalog();
        assert_eq!(catalog.fallback_pool(2).len(), 2);
        assert_eq!(catalog.fallback_pool(40).len(), 5);
        assert!(Catalog::default().fallback_pool(10).is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let catalog = sample_catalog();
        assert_eq!(catalog.get(1).map(Record::title), Some("Montagem Soviética"));
        assert!(catalog.get(99).is_none());
    }
}
