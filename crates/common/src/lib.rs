//! Acervo Common Library
//!
//! Core of the library catalog search service:
//! - Catalog loading and record indexing
//! - Query parsing, matching and context selection
//! - Generation client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod catalog;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use catalog::{Catalog, Record};
pub use config::AppConfig;
pub use context::{Generator, MatchMode, ServiceError};
pub use engine::{Consultation, ContextOutcome, Query, SearchEngine, SearchResults};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
