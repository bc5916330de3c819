//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub catalog: CheckResult,
    pub generation: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: acervo_common::VERSION.to_string(),
    })
}

/// Readiness probe - the catalog must be loaded and non-empty
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let records = state.engine.catalog().len();

    let catalog = CheckResult {
        status: if records > 0 { "up" } else { "down" }.to_string(),
        records: Some(records),
        detail: (records == 0).then(|| "catalog is empty".to_string()),
    };

    // generation is optional: search works without it
    let configured = state.config.generation.api_key.is_some();
    let generation = CheckResult {
        status: if configured { "configured" } else { "disabled" }.to_string(),
        records: None,
        detail: Some(state.generator.model_name().to_string()),
    };

    Json(ReadyResponse {
        status: if records > 0 { "ready" } else { "not_ready" }.to_string(),
        checks: HealthChecks {
            catalog,
            generation,
        },
    })
}
