//! Matching and scoring of parsed terms against indexed records
//!
//! Two policies:
//! - Strict: every term must occur in the record's search blob (AND)
//! - Ranked: score is the summed occurrence count of all terms

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::Record;
use crate::errors::AppError;

/// Matching policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// All terms present, table order
    #[default]
    Strict,
    /// Occurrence-sum score, best first
    Ranked,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Strict => "strict",
            MatchMode::Ranked => "ranked",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "and" => Ok(MatchMode::Strict),
            "ranked" | "score" => Ok(MatchMode::Ranked),
            other => Err(AppError::Validation {
                message: format!("unknown match mode {:?}", other),
                field: Some("mode".to_string()),
            }),
        }
    }
}

/// A matched record with its score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredRecord<'a> {
    pub record: &'a Record,
    /// Always 1 in strict mode
    pub score: u32,
}

/// Evaluate `terms` against `records` under `mode`.
///
/// An empty term list matches nothing; callers are expected to have
/// rejected it as too vague before getting here. Ranked ties keep input
/// order.
pub fn match_records<'a, I>(records: I, terms: &[String], mode: MatchMode) -> Vec<ScoredRecord<'a>>
where
    I: IntoIterator<Item = &'a Record>,
{
    if terms.is_empty() {
        return Vec::new();
    }

    match mode {
        MatchMode::Strict => records
            .into_iter()
            .filter(|record| {
                let blob = record.search_blob();
                terms.iter().all(|term| blob.contains(term.as_str()))
            })
            .map(|record| ScoredRecord { record, score: 1 })
            .collect(),

        MatchMode::Ranked => {
            let mut scored: Vec<ScoredRecord<'a>> = records
                .into_iter()
                .map(|record| ScoredRecord {
                    record,
                    score: score_blob(record.search_blob(), terms),
                })
                .filter(|scored| scored.score > 0)
                .collect();

            // stable: equal scores keep table order
            scored.sort_by(|a, b| b.score.cmp(&a.score));
            scored
        }
    }
}

/// Summed non-overlapping occurrence count of every term in `blob`
pub fn score_blob(blob: &str, terms: &[String]) -> u32 {
    terms
        .iter()
        .filter(|term| !term.is_empty())
        .map(|term| blob.matches(term.as_str()).count() as u32)
        .sum()
}
