//! Catalog browsing handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::AppState;
use acervo_common::{
    catalog::{abnt_citation, Record},
    errors::{AppError, Result},
};

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub id: usize,
    pub title: String,
    pub author: String,
    pub category: String,
    pub fields: BTreeMap<String, String>,
    pub citation: String,
}

impl From<&Record> for RecordResponse {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id(),
            title: record.title().to_string(),
            author: record.author().to_string(),
            category: record.category_clean().to_string(),
            fields: record
                .fields()
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .cloned()
                .collect(),
            citation: abnt_citation(record),
        }
    }
}

/// List the clean categories available for scoping
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let categories = state.engine.catalog().categories();
    Json(CategoriesResponse {
        total: categories.len(),
        categories,
    })
}

/// Get a single record with its ABNT reference
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<usize>,
) -> Result<Json<RecordResponse>> {
    let record = state
        .engine
        .catalog()
        .get(id)
        .ok_or(AppError::RecordNotFound { id })?;

    Ok(Json(RecordResponse::from(record)))
}
