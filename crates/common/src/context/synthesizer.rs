//! LLM Synthesizer - the generation collaborator
//!
//! Provides:
//! - A single-method `Generator` capability the engine is handed
//! - Prompt assembly from a configurable template
//! - A `generateContent`-style HTTP client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::GenerationConfig;

/// Opaque failure of the generation backend.
///
/// Callers decide whether to surface or retry; nothing here retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("generation backend is not configured (missing API key)")]
    NotConfigured,

    #[error("generation backend rejected the credentials")]
    Unauthorized,

    #[error("generation quota exhausted")]
    QuotaExceeded,

    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("unusable generation response: {0}")]
    InvalidResponse(String),
}

/// Text generation capability
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a response for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Fills the prompt template with the context block and the question
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl PromptBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute `{context}` and `{question}`.
    ///
    /// Placeholders are only recognized in the template itself, never in
    /// the substituted context.
    pub fn build(&self, context: &str, question: &str) -> String {
        let question = question.trim();
        match self.template.split_once("{context}") {
            Some((before, after)) => format!(
                "{}{}{}",
                before.replace("{question}", question),
                context,
                after.replace("{question}", question)
            ),
            None => self.template.replace("{question}", question),
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(GenerationConfig::default().prompt_template)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Client for a `models/{model}:generateContent` REST endpoint
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    /// Create a new generator from configuration
    pub fn new(config: &GenerationConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::NotConfigured)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.model, "Generation request rejected");
            return Err(classify_status(status.as_u16(), &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        extract_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn classify_status(status: u16, body: &str) -> ServiceError {
    match status {
        401 | 403 => ServiceError::Unauthorized,
        429 => ServiceError::QuotaExceeded,
        _ => {
            let snippet: String = body.chars().take(200).collect();
            ServiceError::Transport(format!("HTTP {}: {}", status, snippet))
        }
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, ServiceError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::InvalidResponse(
            "no candidate text in response".to_string(),
        ));
    }

    Ok(text)
}
