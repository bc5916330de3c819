//! Acervo API Gateway
//!
//! HTTP surface over the catalog search engine.
//! Handles:
//! - Catalog loading at startup
//! - Request routing and validation
//! - Observability (logging, metrics, tracing)

mod handlers;

use acervo_common::{
    catalog::{load_catalog, RecordIndexer},
    config::{AppConfig, ObservabilityConfig},
    context::{GeminiGenerator, Generator},
    engine::SearchEngine,
    metrics,
};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<SearchEngine>,
    pub generator: Arc<dyn Generator>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration, from an explicit file when one is named
    let loaded = match std::env::var("ACERVO_CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path),
        Err(_) => AppConfig::load(),
    };
    let config = loaded.map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting Acervo API Gateway v{}",
        acervo_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    install_metrics_exporter(config.observability.metrics_port)?;

    // Load and index the catalog once
    let indexer = RecordIndexer::new(config.catalog.searchable_fields.clone());
    let catalog = load_catalog(&config.catalog.path, &indexer, config.catalog.header_scan_rows)
        .map_err(|e| {
            tracing::error!(error = %e, path = %config.catalog.path, "Failed to load catalog");
            e
        })?;
    metrics::set_catalog_size(catalog.len());

    let engine = Arc::new(SearchEngine::new(Arc::new(catalog), &config));

    let generator = GeminiGenerator::new(&config.generation)?;
    if config.generation.api_key.is_none() {
        tracing::warn!("No generation API key configured; /v1/consult will fail");
    }

    // Create app state
    let state = AppState {
        config: config.clone(),
        engine,
        generator: Arc::new(generator),
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Install the Prometheus scrape listener; port 0 disables it
fn install_metrics_exporter(port: u16) -> anyhow::Result<()> {
    if port == 0 {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets_for_metric(
            Matcher::Suffix("search_duration_seconds".to_string()),
            metrics::SEARCH_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Suffix("generation_duration_seconds".to_string()),
            metrics::GENERATION_BUCKETS,
        )?
        .install()?;

    info!(port, "Prometheus exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());

    // API routes
    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Catalog endpoints
        .route("/categories", get(handlers::catalog::list_categories))
        .route("/records/{id}", get(handlers::catalog::get_record))
        // Search endpoints
        .route("/search", post(handlers::search::search))
        .route("/context", post(handlers::search::context))
        // Consultant
        .route("/consult", post(handlers::consult::consult));

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acervo_common::catalog::{fields, Catalog};
    use acervo_common::context::ServiceError;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
            Ok(format!("prompt had {} lines", prompt.lines().count()))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct RejectingGenerator;

    #[async_trait]
    impl Generator for RejectingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
            Err(ServiceError::Unauthorized)
        }

        fn model_name(&self) -> &str {
            "rejecting"
        }
    }

    fn app(generator: Arc<dyn Generator>) -> Router {
        let rows = [
            ("A Estética da Fome", "Glauber Rocha", "Cinema +1", "Manifesto do Cinema Novo"),
            ("Montagem Soviética", "Serguei Eisenstein", "Cinema", "Teoria da montagem"),
            ("Tristes Trópicos", "Claude Lévi-Strauss", "Antropologia +3", "Relato etnográfico"),
        ]
        .iter()
        .map(|(title, author, category, summary)| {
            vec![
                (fields::TITLE.to_string(), title.to_string()),
                (fields::AUTHOR.to_string(), author.to_string()),
                (fields::CATEGORY.to_string(), category.to_string()),
                (fields::SUMMARY.to_string(), summary.to_string()),
                (fields::PUBLISHER.to_string(), "Companhia das Letras".to_string()),
            ]
        })
        .collect();

        let catalog = Catalog::from_rows(rows, &RecordIndexer::default());
        let config = Arc::new(AppConfig::default());
        let engine = Arc::new(SearchEngine::new(Arc::new(catalog), &config));

        create_router(AppState {
            config,
            engine,
            generator,
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(Arc::new(EchoGenerator)), get("/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_catalog_size() {
        let (status, body) = send(app(Arc::new(EchoGenerator)), get("/v1/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"]["catalog"]["records"], 3);
    }

    #[tokio::test]
    async fn test_ranked_search() {
        let request = post("/v1/search", json!({ "query": "montagem", "mode": "ranked" }));
        let (status, body) = send(app(Arc::new(EchoGenerator)), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "ranked");
        assert_eq!(body["total_results"], 1);
        assert_eq!(body["results"][0]["title"], "Montagem Soviética");
    }

    #[tokio::test]
    async fn test_vague_search_is_unprocessable() {
        let request = post("/v1/search", json!({ "query": "o que" }));
        let (status, body) = send(app(Arc::new(EchoGenerator)), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EMPTY_QUERY");
    }

    #[tokio::test]
    async fn test_blank_search_fails_validation() {
        let request = post("/v1/search", json!({ "query": "" }));
        let (status, body) = send(app(Arc::new(EchoGenerator)), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_vague_context_is_padding_only() {
        let request = post("/v1/context", json!({ "query": "o que" }));
        let (status, body) = send(app(Arc::new(EchoGenerator)), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query_too_vague"], true);
        assert_eq!(body["matched_count"], 0);
        assert_eq!(body["record_ids"], json!([0, 1, 2]));
    }

    #[tokio::test]
    async fn test_context_scoped_by_category() {
        let request = post(
            "/v1/context",
            json!({ "query": "cinema", "category": "Cinema", "mode": "ranked" }),
        );
        let (status, body) = send(app(Arc::new(EchoGenerator)), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched_count"], 2);
        assert_eq!(body["was_padded"], true);
        assert!(body["context"].as_str().unwrap().starts_with("[1] Título:"));
    }

    #[tokio::test]
    async fn test_categories() {
        let (status, body) = send(app(Arc::new(EchoGenerator)), get("/v1/categories")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"], json!(["Antropologia", "Cinema"]));
    }

    #[tokio::test]
    async fn test_record_with_citation() {
        let (status, body) = send(app(Arc::new(EchoGenerator)), get("/v1/records/2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "Antropologia");
        assert_eq!(
            body["citation"],
            "LÉVI-STRAUSS, Claude Lévi-Strauss. Tristes Trópicos. Companhia das Letras."
        );

        let (status, body) = send(app(Arc::new(EchoGenerator)), get("/v1/records/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_consult() {
        let request = post("/v1/consult", json!({ "question": "Teoria da montagem?" }));
        let (status, body) = send(app(Arc::new(EchoGenerator)), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().unwrap().starts_with("prompt had"));
        assert_eq!(body["record_ids"][0], 1);
    }

    #[tokio::test]
    async fn test_consult_generation_failure_is_bad_gateway() {
        let request = post("/v1/consult", json!({ "question": "montagem" }));
        let (status, body) = send(app(Arc::new(RejectingGenerator)), request).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_ERROR");
    }
}
