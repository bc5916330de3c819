//! Search engine facade
//!
//! Wires the catalog and the context components into the three actions the
//! gateway exposes: search, context assembly and consultation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{Catalog, Record};
use crate::config::{AppConfig, SearchConfig};
use crate::context::{
    match_records, ContextBlock, ContextSelector, ContextSelectorConfig, Generator, MatchMode,
    PromptBuilder, QueryParser, QueryParserConfig, ScoredRecord,
};
use crate::errors::{AppError, Result};
use crate::metrics::{self, SearchOutcome};

/// A single search action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,

    /// Overrides the configured default mode
    #[serde(default)]
    pub mode: Option<MatchMode>,

    /// Restricts matching to one clean category
    #[serde(default)]
    pub category: Option<String>,

    /// Overrides the configured minimum token length
    #[serde(default)]
    pub min_token_len: Option<usize>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_token_len(mut self, min_token_len: usize) -> Self {
        self.min_token_len = Some(min_token_len);
        self
    }

    fn scope_name(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
    }
}

/// Matches for one query
#[derive(Debug, Clone)]
pub struct SearchResults<'a> {
    /// Significant terms in query order
    pub terms: Vec<String>,
    pub mode: MatchMode,
    pub matches: Vec<ScoredRecord<'a>>,
}

/// Context block plus how it was reached
#[derive(Debug, Clone, Serialize)]
pub struct ContextOutcome<'a> {
    pub terms: Vec<String>,
    #[serde(flatten)]
    pub block: ContextBlock<'a>,

    /// Set when the query had no significant terms and the block is
    /// padding only
    pub query_too_vague: bool,
}

/// Generated answer with the context that grounded it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Consultation {
    pub answer: String,
    pub terms: Vec<String>,
    pub record_ids: Vec<usize>,
    pub matched_count: usize,
    pub was_padded: bool,
    pub query_too_vague: bool,
}

/// Read-only search engine over a loaded catalog.
///
/// Holds no per-query state, so one instance serves concurrent callers.
pub struct SearchEngine {
    catalog: Arc<Catalog>,
    parser: QueryParser,
    selector: ContextSelector,
    prompts: PromptBuilder,
    config: SearchConfig,
}

impl SearchEngine {
    /// Create a new engine from application configuration
    pub fn new(catalog: Arc<Catalog>, config: &AppConfig) -> Self {
        Self {
            catalog,
            parser: QueryParser::new(QueryParserConfig::from(&config.search)),
            selector: ContextSelector::new(ContextSelectorConfig::from(&config.search)),
            prompts: PromptBuilder::new(config.generation.prompt_template.clone()),
            config: config.search.clone(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parse the query and match it within its scope.
    ///
    /// Fails with `EmptyQuery` when no significant term survives parsing.
    /// Zero matches is a normal, successful result.
    pub fn search(&self, query: &Query) -> Result<SearchResults<'_>> {
        let start = Instant::now();
        let mode = query.mode.unwrap_or(self.config.default_mode);
        let min_len = query.min_token_len.unwrap_or(self.parser.min_token_len());

        let parsed = self.parser.parse_with(&query.text, min_len);
        if parsed.is_empty() {
            metrics::record_search(
                start.elapsed().as_secs_f64(),
                mode.as_str(),
                SearchOutcome::EmptyQuery,
                0,
            );
            tracing::info!(query = %query.text, mode = %mode, "Query has no significant terms");
            return Err(AppError::EmptyQuery {
                query: query.text.clone(),
            });
        }

        let scope = self.scope(query);
        let matches = match_records(scope.iter().copied(), &parsed.terms, mode);

        let outcome = if matches.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Matched
        };
        let duration = start.elapsed();
        metrics::record_search(duration.as_secs_f64(), mode.as_str(), outcome, matches.len());

        tracing::info!(
            query = %query.text,
            mode = %mode,
            category = query.scope_name().unwrap_or(""),
            scope_size = scope.len(),
            terms = parsed.terms.len(),
            matches = matches.len(),
            latency_us = duration.as_micros() as u64,
            "Search completed"
        );

        Ok(SearchResults {
            terms: parsed.terms,
            mode,
            matches,
        })
    }

    /// Build a bounded context block for the query.
    ///
    /// A query with no significant terms still yields a block made entirely
    /// of fallback records, flagged with `query_too_vague`.
    pub fn build_context(&self, query: &Query) -> Result<ContextOutcome<'_>> {
        let pool = self.catalog.fallback_pool(self.config.fallback_pool);

        let (terms, block, query_too_vague) = match self.search(query) {
            Ok(results) => {
                let block = self.selector.select(&results.matches, pool);
                (results.terms, block, false)
            }
            Err(AppError::EmptyQuery { .. }) => (Vec::new(), self.selector.select(&[], pool), true),
            Err(e) => return Err(e),
        };

        metrics::record_context(block.was_padded);

        tracing::debug!(
            records = block.len(),
            matched_count = block.matched_count,
            was_padded = block.was_padded,
            query_too_vague,
            "Context built"
        );

        Ok(ContextOutcome {
            terms,
            block,
            query_too_vague,
        })
    }

    /// Answer a question with the generator, grounded on the context block
    pub async fn consult(&self, query: &Query, generator: &dyn Generator) -> Result<Consultation> {
        let outcome = self.build_context(query)?;
        let prompt = self.prompts.build(&outcome.block.rendered, &query.text);

        let mut consultation = Consultation {
            answer: String::new(),
            terms: outcome.terms,
            record_ids: outcome.block.records.iter().map(|record| record.id()).collect(),
            matched_count: outcome.block.matched_count,
            was_padded: outcome.block.was_padded,
            query_too_vague: outcome.query_too_vague,
        };

        let start = Instant::now();
        let result = generator.generate(&prompt).await;
        let duration = start.elapsed();
        metrics::record_generation(duration.as_secs_f64(), result.is_ok());

        consultation.answer = result.map_err(|e| {
            tracing::error!(error = %e, model = generator.model_name(), "Generation failed");
            AppError::from(e)
        })?;

        tracing::info!(
            model = generator.model_name(),
            records = consultation.record_ids.len(),
            prompt_chars = prompt.chars().count(),
            latency_ms = duration.as_millis() as u64,
            "Consultation answered"
        );

        Ok(consultation)
    }

    fn scope(&self, query: &Query) -> Vec<&Record> {
        match query.scope_name() {
            Some(category) => self.catalog.scope_by_category(category),
            None => self.catalog.all(),
        }
    }
}
