//! Search handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use super::validate_request;
use crate::AppState;
use acervo_common::{
    context::MatchMode,
    engine::Query,
    errors::Result,
};

/// Search request
#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 1000))]
    pub query: String,

    /// strict (default from config) or ranked
    #[serde(default)]
    pub mode: Option<MatchMode>,

    /// Clean category to scope the search to
    #[serde(default)]
    #[validate(length(max = 200))]
    pub category: Option<String>,

    #[serde(default)]
    #[validate(range(min = 1, max = 32))]
    pub min_token_len: Option<usize>,
}

impl From<SearchRequest> for Query {
    fn from(request: SearchRequest) -> Self {
        Query {
            text: request.query,
            mode: request.mode,
            category: request.category,
            min_token_len: request.min_token_len,
        }
    }
}

/// Search response
#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: MatchMode,
    pub terms: Vec<String>,
    pub total_results: usize,
    pub results: Vec<SearchResultItem>,
    pub processing_time_ms: u64,
}

#[derive(Serialize)]
pub struct SearchResultItem {
    pub id: usize,
    pub title: String,
    pub author: String,
    pub category: String,
    pub score: u32,
}

/// Context response
#[derive(Serialize)]
pub struct ContextResponse {
    pub query: String,
    pub terms: Vec<String>,
    pub record_ids: Vec<usize>,
    pub matched_count: usize,
    pub was_padded: bool,
    pub query_too_vague: bool,
    pub context: String,
    pub processing_time_ms: u64,
}

/// Perform a search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start = Instant::now();
    validate_request(&request)?;

    let query = Query::from(request);
    let results = state.engine.search(&query)?;

    let items: Vec<SearchResultItem> = results
        .matches
        .iter()
        .map(|scored| SearchResultItem {
            id: scored.record.id(),
            title: scored.record.title().to_string(),
            author: scored.record.author().to_string(),
            category: scored.record.category_clean().to_string(),
            score: scored.score,
        })
        .collect();

    Ok(Json(SearchResponse {
        query: query.text,
        mode: results.mode,
        terms: results.terms,
        total_results: items.len(),
        results: items,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Build the context block a prompt would be grounded on
pub async fn context(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ContextResponse>> {
    let start = Instant::now();
    validate_request(&request)?;

    let query = Query::from(request);
    let outcome = state.engine.build_context(&query)?;

    Ok(Json(ContextResponse {
        record_ids: outcome.block.records.iter().map(|record| record.id()).collect(),
        matched_count: outcome.block.matched_count,
        was_padded: outcome.block.was_padded,
        query_too_vague: outcome.query_too_vague,
        context: outcome.block.rendered,
        terms: outcome.terms,
        query: query.text,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
