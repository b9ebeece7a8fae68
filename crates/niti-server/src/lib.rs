//! Niti Web Server
//!
//! Axum-based REST API over the Niti wisdom pipeline.
//!
//! The knowledge base, configuration and prompt template are loaded once at
//! startup and shared read-only by every request. Handlers are synchronous
//! computations with no I/O, so there is no locking anywhere.
//!
//! Security features:
//! - Restrictive CORS policy (origins opt-in via `NITI_ALLOWED_ORIGINS`)
//! - Request body size limit
//! - JSON error bodies with explicit status codes

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

use niti_core::WisdomAdvisor;

mod handlers;

/// Maximum request body size (2 MB of expense records)
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Maximum number of expense records accepted per request
pub const MAX_EXPENSES: usize = 50_000;

/// Server configuration
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `NITI_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Self {
        Self {
            allowed_origins: parse_origins(
                &std::env::var("NITI_ALLOWED_ORIGINS").unwrap_or_default(),
            ),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared application state
pub struct AppState {
    pub advisor: WisdomAdvisor,
}

/// Create the application router
pub fn create_router(advisor: WisdomAdvisor, config: ServerConfig) -> Router {
    let state = Arc::new(AppState { advisor });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Knowledge base
        .route("/principles", get(handlers::list_principles))
        .route("/principles/:id", get(handlers::get_principle))
        // Pipeline
        .route("/context", post(handlers::analyze_context))
        .route("/wisdom", post(handlers::find_wisdom))
        .route("/prompt", post(handlers::build_prompt));

    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// Start the server with configuration from the environment
pub async fn serve(advisor: WisdomAdvisor, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(advisor, host, port, ServerConfig::from_env()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    advisor: WisdomAdvisor,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        principles = advisor.knowledge().principles().len(),
        origins = config.allowed_origins.len(),
        "Knowledge base loaded"
    );

    let app = create_router(advisor, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Client-facing error with an HTTP status code
///
/// Handlers only fail on bad input; the pipeline itself is infallible once
/// the advisor is loaded.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}
