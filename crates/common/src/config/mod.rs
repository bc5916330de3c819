//! Configuration management for Acervo services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with ACERVO__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::context::MatchMode;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Record table source and indexing
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Query parsing, matching and context selection
    #[serde(default)]
    pub search: SearchConfig,

    /// Generation backend
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Path to the JSON export of the spreadsheet
    #[serde(default = "default_catalog_path")]
    pub path: String,

    /// Fields concatenated into each record's search blob
    #[serde(default = "default_searchable_fields")]
    pub searchable_fields: Vec<String>,

    /// How many leading rows to scan for the real header row
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Function words and catalog noise dropped from queries
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,

    /// Tokens shorter than this (in characters) are dropped
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,

    /// Matching policy when a query does not name one
    #[serde(default)]
    pub default_mode: MatchMode,

    /// Context floor; sparse matches are padded up to this size
    #[serde(default = "default_min_context")]
    pub min_context: usize,

    /// Context ceiling
    #[serde(default = "default_max_context")]
    pub max_context: usize,

    /// Number of leading table records used as padding material
    #[serde(default = "default_fallback_pool")]
    pub fallback_pool: usize,

    /// Field used to collapse duplicate records in a context block
    #[serde(default = "default_dedupe_key")]
    pub dedupe_key: String,

    /// Upper bound on the rendered context text, in characters
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// API base URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model to use
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// API key (unset means the consultant is unavailable)
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Prompt with `{context}` and `{question}` placeholders
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

/// Stopwords shipped with the default configuration.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "de", "do", "da", "dos", "das", "em", "no", "na", "nos",
    "nas", "para", "por", "com", "sem", "sobre", "e", "ou", "que", "se", "livro", "livros",
    "obra", "obras", "quero", "gostaria", "quais", "qual", "como", "quando", "onde", "tem",
    "algum", "alguma", "me", "mais",
];

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_catalog_path() -> String { "biblioteca.json".to_string() }
fn default_searchable_fields() -> Vec<String> {
    ["title", "author", "category", "summary", "keywords"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_header_scan_rows() -> usize { 15 }
fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect()
}
fn default_min_token_len() -> usize { 3 }
fn default_min_context() -> usize { 5 }
fn default_max_context() -> usize { 30 }
fn default_fallback_pool() -> usize { 40 }
fn default_dedupe_key() -> String { "title".to_string() }
fn default_max_context_chars() -> usize { 12_000 }
fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_generation_model() -> String { "gemini-1.5-flash".to_string() }
fn default_generation_timeout() -> u64 { 30 }
fn default_prompt_template() -> String {
    "Você é o bibliotecário do acervo de Cinema & Artes. \
     Baseado nestes livros:\n{context}\n\
     Responda objetivamente à pergunta: {question}"
        .to_string()
}
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "acervo".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            searchable_fields: default_searchable_fields(),
            header_scan_rows: default_header_scan_rows(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            stop_words: default_stop_words(),
            min_token_len: default_min_token_len(),
            default_mode: MatchMode::default(),
            min_context: default_min_context(),
            max_context: default_max_context(),
            fallback_pool: default_fallback_pool(),
            dedupe_key: default_dedupe_key(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key: None,
            timeout_secs: default_generation_timeout(),
            prompt_template: default_prompt_template(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., ACERVO__SERVER__PORT=8081
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ACERVO")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("search.stop_words")
        .with_list_parse_key("catalog.searchable_fields")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.search.min_token_len, 3);
        assert_eq!(config.search.default_mode, MatchMode::Strict);
        assert_eq!(config.search.dedupe_key, "title");
        assert!(config.generation.api_key.is_none());
    }

    #[test]
    fn test_default_stop_words_cover_query_noise() {
        let config = AppConfig::default();
        for word in ["o", "que", "livro", "sobre", "quais"] {
            assert!(config.search.stop_words.iter().any(|w| w == word), "{word}");
        }
    }

    #[test]
    fn test_prompt_template_has_placeholders() {
        let template = AppConfig::default().generation.prompt_template;
        assert!(template.contains("{context}"));
        assert!(template.contains("{question}"));
    }

    #[test]
    fn test_from_file_reads_toml() {
        let path = std::env::temp_dir().join(format!("acervo-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[catalog]\npath = \"acervo.json\"\n[server]\nport = 9001\n").unwrap();

        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.catalog.path, "acervo.json");
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.search.min_context, 5);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                "[search]\nmin_token_len = 2\ndefault_mode = \"ranked\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.search.min_token_len, 2);
        assert_eq!(config.search.default_mode, MatchMode::Ranked);
        assert_eq!(config.search.max_context, 30);
        assert_eq!(config.server.port, 8080);
    }
}
