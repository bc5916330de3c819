//! Consultant handler - generated answers grounded on the catalog

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use super::validate_request;
use crate::AppState;
use acervo_common::{
    context::MatchMode,
    engine::{Consultation, Query},
    errors::Result,
};

/// Consult request
#[derive(Debug, Deserialize, Validate)]
pub struct ConsultRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    #[serde(default)]
    pub mode: Option<MatchMode>,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub category: Option<String>,
}

/// Ask the library consultant
pub async fn consult(
    State(state): State<AppState>,
    Json(request): Json<ConsultRequest>,
) -> Result<Json<Consultation>> {
    validate_request(&request)?;

    let query = Query {
        text: request.question,
        mode: request.mode,
        category: request.category,
        min_token_len: None,
    };

    let consultation = state.engine.consult(&query, state.generator.as_ref()).await?;

    tracing::info!(
        matched_count = consultation.matched_count,
        was_padded = consultation.was_padded,
        answer_chars = consultation.answer.chars().count(),
        "Consult request served"
    );

    Ok(Json(consultation))
}
