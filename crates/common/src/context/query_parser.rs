//! Query Parser - turns free-text queries into significant terms
//!
//! Provides:
//! - Normalization of the raw query
//! - Whitespace tokenization with a minimum token length
//! - Stopword filtering against a configurable set

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::normalize;
use crate::config::SearchConfig;

/// Parsed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Original query text
    pub original_query: String,

    /// Significant terms, in the order the user typed them
    pub terms: Vec<String>,
}

impl ParsedQuery {
    /// True when filtering discarded every token
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Query parser configuration
#[derive(Debug, Clone)]
pub struct QueryParserConfig {
    /// Minimum token length in characters
    pub min_token_len: usize,

    /// Words dropped from every query
    pub stop_words: Vec<String>,
}

impl Default for QueryParserConfig {
    fn default() -> Self {
        let search = SearchConfig::default();
        Self {
            min_token_len: search.min_token_len,
            stop_words: search.stop_words,
        }
    }
}

impl From<&SearchConfig> for QueryParserConfig {
    fn from(search: &SearchConfig) -> Self {
        Self {
            min_token_len: search.min_token_len,
            stop_words: search.stop_words.clone(),
        }
    }
}

/// Query parser for catalog searches
#[derive(Debug, Clone)]
pub struct QueryParser {
    min_token_len: usize,

    /// Stopwords, stored normalized so "até" and "ate" both match
    stop_words: HashSet<String>,
}

impl QueryParser {
    /// Create a new query parser
    pub fn new(config: QueryParserConfig) -> Self {
        let stop_words = config
            .stop_words
            .iter()
            .map(|word| normalize(word).trim().to_string())
            .filter(|word| !word.is_empty())
            .collect();

        Self {
            min_token_len: config.min_token_len,
            stop_words,
        }
    }

    pub fn min_token_len(&self) -> usize {
        self.min_token_len
    }

    /// Parse with the configured minimum token length
    pub fn parse(&self, query: &str) -> ParsedQuery {
        self.parse_with(query, self.min_token_len)
    }

    /// Parse with an explicit minimum token length
    pub fn parse_with(&self, query: &str, min_token_len: usize) -> ParsedQuery {
        let terms = self.tokenize(&normalize(query), min_token_len);

        tracing::debug!(
            query = %query,
            terms = ?terms,
            min_token_len,
            "Query parsed"
        );

        ParsedQuery {
            original_query: query.to_string(),
            terms,
        }
    }

    /// Split already-normalized text into significant terms.
    ///
    /// May return an empty list when every token is a stopword or shorter
    /// than `min_len`; callers decide what that means.
    pub fn tokenize(&self, normalized: &str, min_len: usize) -> Vec<String> {
        normalized
            .split_whitespace()
            .filter(|token| token.chars().count() >= min_len)
            .filter(|token| !self.is_stop_word(token))
            .map(String::from)
            .collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(QueryParserConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_keep_query_order() {
        let parser = QueryParser::default();
        let parsed = parser.parse("Roteiro e montagem no cinema soviético");
        assert_eq!(parsed.terms, vec!["roteiro", "montagem", "cinema", "sovietico"]);
    }

    #[test]
    fn test_all_stopwords_yield_empty() {
        let parser = QueryParser::default();
        let parsed = parser.parse("o que");
        assert!(parsed.is_empty());
        assert_eq!(parsed.original_query, "o que");
    }

    #[test]
    fn test_catalog_noise_words_are_dropped() {
        let parser = QueryParser::default();
        let parsed = parser.parse("Quero livros sobre fotografia");
        assert_eq!(parsed.terms, vec!["fotografia"]);
    }

    #[test]
    fn test_min_len_is_a_parameter() {
        let parser = QueryParser::default();
        assert_eq!(parser.parse("tv ou rádio").terms, vec!["radio"]);
        assert_eq!(parser.parse_with("tv ou rádio", 2).terms, vec!["tv", "radio"]);
    }

    #[test]
    fn test_min_len_counts_characters_not_bytes() {
        let parser = QueryParser::new(QueryParserConfig {
            min_token_len: 3,
            stop_words: vec![],
        });
        assert_eq!(parser.tokenize("ção çã", 3), vec!["ção"]);
    }

    #[test]
    fn test_stop_words_are_configurable_and_folded() {
        let parser = QueryParser::new(QueryParserConfig {
            min_token_len: 1,
            stop_words: vec!["Cinéma".to_string()],
        });
        assert_eq!(parser.parse("cinema novo").terms, vec!["novo"]);
        assert!(parser.is_stop_word("cinema"));
    }

    #[test]
    fn test_punctuation_does_not_fuse_words() {
        let parser = QueryParser::default();
        assert_eq!(parser.parse("Godard/Truffaut").terms, vec!["godard", "truffaut"]);
    }
}
