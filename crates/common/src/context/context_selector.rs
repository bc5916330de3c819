//! Context Selector - assembles bounded context blocks
//!
//! Provides:
//! - Deduplication by a configurable key field
//! - Fallback padding up to a minimum size
//! - Truncation to a maximum size
//! - Deterministic text rendering with a character budget

use serde::Serialize;
use std::collections::HashSet;

use super::ScoredRecord;
use crate::catalog::{fields, Record};
use crate::config::SearchConfig;

/// Field order used when rendering a record
const RENDER_ORDER: &[(&str, &str)] = &[
    (fields::TITLE, "Título"),
    (fields::AUTHOR, "Autor"),
    (fields::PUBLISHER, "Editora"),
    (fields::YEAR, "Ano"),
    (fields::CATEGORY, "Categoria"),
    (fields::DDC, "CDD"),
    (fields::CALL_NUMBER, "Chamada"),
    (fields::SUMMARY, "Resumo"),
];

/// Selected context for downstream use
#[derive(Debug, Clone, Serialize)]
pub struct ContextBlock<'a> {
    /// Final ordered records: matches first, then padding
    #[serde(skip)]
    pub records: Vec<&'a Record>,

    /// Distinct genuine matches before truncation
    pub matched_count: usize,

    /// Whether fallback records were appended
    pub was_padded: bool,

    /// Rendered text, one entry per record
    pub rendered: String,
}

impl ContextBlock<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Context selector configuration
#[derive(Debug, Clone)]
pub struct ContextSelectorConfig {
    /// Floor: pad sparse matches up to this many records
    pub min_size: usize,

    /// Ceiling on records in the block
    pub max_size: usize,

    /// Field that identifies duplicates
    pub dedupe_key: String,

    /// Ceiling on rendered characters
    pub max_chars: usize,
}

impl Default for ContextSelectorConfig {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for ContextSelectorConfig {
    fn from(search: &SearchConfig) -> Self {
        Self {
            min_size: search.min_context,
            max_size: search.max_context,
            dedupe_key: search.dedupe_key.clone(),
            max_chars: search.max_context_chars,
        }
    }
}

/// Context selector for building bounded, deduplicated context
#[derive(Debug, Clone)]
pub struct ContextSelector {
    config: ContextSelectorConfig,
}

impl ContextSelector {
    /// Create a new context selector
    pub fn new(config: ContextSelectorConfig) -> Self {
        Self { config }
    }

    /// Build a context block from matches, padding from `fallback_pool`.
    pub fn select<'a>(
        &self,
        matches: &[ScoredRecord<'a>],
        fallback_pool: &'a [Record],
    ) -> ContextBlock<'a> {
        let mut seen_keys: HashSet<String> = HashSet::new();
        let mut seen_ids: HashSet<usize> = HashSet::new();
        let mut selected: Vec<&'a Record> = Vec::new();

        for scored in matches {
            if seen_ids.contains(&scored.record.id()) {
                continue;
            }
            if seen_keys.insert(self.dedupe_key(scored.record)) {
                seen_ids.insert(scored.record.id());
                selected.push(scored.record);
            }
        }

        let matched_count = selected.len();
        let mut was_padded = false;

        if selected.len() < self.config.min_size {
            for record in fallback_pool {
                if selected.len() >= self.config.min_size {
                    break;
                }
                if seen_ids.contains(&record.id()) {
                    continue;
                }
                if seen_keys.insert(self.dedupe_key(record)) {
                    seen_ids.insert(record.id());
                    selected.push(record);
                    was_padded = true;
                }
            }
        }

        selected.truncate(self.config.max_size);

        // records the budget cannot fit are dropped so the block and its
        // text always agree
        let (rendered, fitted) = self.render_fitting(&selected);
        selected.truncate(fitted);

        tracing::debug!(
            matched_count,
            selected = selected.len(),
            was_padded,
            rendered_chars = rendered.chars().count(),
            "Context selected"
        );

        ContextBlock {
            records: selected,
            matched_count,
            was_padded,
            rendered,
        }
    }

    /// Dedupe key for `record`. Blank key values fall back to the record
    /// id so unrelated untitled rows are not collapsed together.
    fn dedupe_key(&self, record: &Record) -> String {
        let value = record.field(&self.config.dedupe_key).trim();
        if value.is_empty() {
            format!("#{}", record.id())
        } else {
            format!("={}", value.to_lowercase())
        }
    }

    /// Render records as numbered entries, stopping before an entry would
    /// exceed the character budget.
    ///
    /// The first entry is always rendered, clipped to the budget when it is
    /// too long on its own.
    pub fn render(&self, records: &[&Record]) -> String {
        self.render_fitting(records).0
    }

    /// Rendered text and the number of records it holds
    fn render_fitting(&self, records: &[&Record]) -> (String, usize) {
        let budget = self.config.max_chars;
        let mut out = String::new();
        let mut used = 0usize;
        let mut fitted = 0usize;

        for (i, record) in records.iter().enumerate() {
            let entry = render_entry(i + 1, record);
            let entry_chars = entry.chars().count();

            if used + entry_chars > budget {
                if i == 0 {
                    out.extend(entry.chars().take(budget.saturating_sub(1)));
                    out.push('\n');
                    fitted = 1;
                }
                break;
            }

            used += entry_chars;
            out.push_str(&entry);
            fitted += 1;
        }

        (out, fitted)
    }
}

impl Default for ContextSelector {
    fn default() -> Self {
        Self::new(ContextSelectorConfig::default())
    }
}

fn render_entry(position: usize, record: &Record) -> String {
    let parts: Vec<String> = RENDER_ORDER
        .iter()
        .filter_map(|(field, label)| {
            let value = if *field == fields::CATEGORY {
                record.category_clean()
            } else {
                record.field(field)
            };
            (!value.is_empty()).then(|| format!("{}: {}", label, value))
        })
        .collect();

    format!("[{}] {}\n", position, parts.join(" | "))
}
