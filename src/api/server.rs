//! SheetBridge API server
//!
//! HTTP REST API built on Axum: sheet listing, region extraction to JSON/CSV,
//! CSV → .xlsx conversion and .docx text extraction.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::handlers;

/// Default cap on request bodies (32 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// API Server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the application router with its middleware stack
pub fn build_router(state: Arc<AppState>, config: &ApiConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/api/1.0", get(handlers::root))
        .route("/api/1.0/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Spreadsheet endpoints
        .route("/api/1.0/xlsx/sheets", post(handlers::sheets))
        .route("/api/1.0/xlsx/extract/json", post(handlers::extract_json))
        .route("/api/1.0/xlsx/extract/csv", post(handlers::extract_csv))
        .route("/api/1.0/xlsx/from/csv", post(handlers::from_csv))
        // Document endpoints
        .route("/api/1.0/docx/extract", post(handlers::docx_extract))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Install the global tracing subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    // A subscriber may already be installed by the embedding process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbridge=info,tower_http=info".into()),
        )
        .try_init();
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    init_tracing();

    let state = Arc::new(AppState::default());
    let app = build_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("SheetBridge API Server starting on http://{}", addr);
    info!("   Endpoints: /api/1.0/xlsx/sheets, /api/1.0/xlsx/extract/{{json,csv}}, /api/1.0/xlsx/from/csv, /api/1.0/docx/extract");
    info!("   Health: /health, Version: /version");
    info!("   Upload limit: {} bytes", config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SheetBridge API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
