//! Context Engine Core Components
//!
//! The retrieval core that turns a question into grounded context:
//! - Text normalization
//! - Query parsing into significant terms
//! - Strict and ranked matching
//! - Bounded context selection
//! - LLM synthesis through an injected generator

mod context_selector;
mod matcher;
mod normalizer;
mod query_parser;
mod synthesizer;

pub use context_selector::{ContextBlock, ContextSelector, ContextSelectorConfig};
pub use matcher::{match_records, score_blob, MatchMode, ScoredRecord};
pub use normalizer::normalize;
pub use query_parser::{ParsedQuery, QueryParser, QueryParserConfig};
pub use synthesizer::{GeminiGenerator, Generator, PromptBuilder, ServiceError};
