//! Metrics and observability utilities
//!
//! Prometheus-style metrics with a shared `acervo_` prefix. Recording is a
//! no-op until a recorder (the gateway's Prometheus exporter) is installed.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all Acervo metrics
pub const METRICS_PREFIX: &str = "acervo";

/// Buckets for in-memory search latency (in seconds)
pub const SEARCH_BUCKETS: &[f64] = &[
    0.0001, // 100us
    0.0005, // 500us
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.500,  // 500ms
];

/// Buckets for generation latency (remote, much slower)
pub const GENERATION_BUCKETS: &[f64] = &[
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.000, // 2s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
];

/// Outcome label for a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Matched,
    NoMatches,
    EmptyQuery,
}

impl SearchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOutcome::Matched => "matched",
            SearchOutcome::NoMatches => "no_matches",
            SearchOutcome::EmptyQuery => "empty_query",
        }
    }
}

fn name(suffix: &str) -> String {
    format!("{}_{}", METRICS_PREFIX, suffix)
}

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        name("search_queries_total"),
        Unit::Count,
        "Total number of search queries"
    );

    describe_histogram!(
        name("search_duration_seconds"),
        Unit::Seconds,
        "Search latency in seconds"
    );

    describe_gauge!(
        name("search_results_count"),
        Unit::Count,
        "Number of matches returned by the last search"
    );

    describe_counter!(
        name("context_padded_total"),
        Unit::Count,
        "Context blocks that needed fallback padding"
    );

    describe_counter!(
        name("generation_requests_total"),
        Unit::Count,
        "Total generation requests"
    );

    describe_histogram!(
        name("generation_duration_seconds"),
        Unit::Seconds,
        "Generation latency in seconds"
    );

    describe_gauge!(
        name("catalog_records"),
        Unit::Count,
        "Records in the loaded catalog"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, mode: &str, outcome: SearchOutcome, result_count: usize) {
    counter!(
        name("search_queries_total"),
        "mode" => mode.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(name("search_duration_seconds"), "mode" => mode.to_string()).record(duration_secs);

    gauge!(name("search_results_count"), "mode" => mode.to_string()).set(result_count as f64);
}

/// Helper to record context assembly
pub fn record_context(was_padded: bool) {
    if was_padded {
        counter!(name("context_padded_total")).increment(1);
    }
}

/// Helper to record generation metrics
pub fn record_generation(duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(name("generation_requests_total"), "status" => status).increment(1);

    if success {
        histogram!(name("generation_duration_seconds")).record(duration_secs);
    }
}

/// Helper to publish the catalog size after a load
pub fn set_catalog_size(records: usize) {
    gauge!(name("catalog_records")).set(records as f64);
}
