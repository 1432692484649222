//! HTTP server bootstrap for DOV Bridge.
//!
//! This module wires together:
//! - configuration
//! - the SQLite record store (with startup migrations)
//! - the XDS SOAP client and verification flow
//! - uploads and audit log storage
//! - the Axum router

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::api::handlers::health;
use crate::flow::VerificationFlow;
use crate::infra::{AuditLog, PollConfig, SqliteRecordStore, UploadStore};
use crate::xds::{XdsClient, XdsConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL.
    pub database_url: String,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Directory holding uploaded verification photos.
    pub uploads_dir: PathBuf,
    /// Plain-text audit log path.
    pub audit_log_path: PathBuf,
    /// DOV result polling budget.
    pub poll: PollConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:verifications.db".to_string());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        let uploads_dir =
            PathBuf::from(std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));

        let audit_log_path = PathBuf::from(
            std::env::var("AUDIT_LOG_FILE").unwrap_or_else(|_| "dov_audit_log.txt".to_string()),
        );

        let max_attempts: u32 = std::env::var("POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            database_url,
            listen_addr,
            uploads_dir,
            audit_log_path,
            poll: PollConfig {
                max_attempts,
                interval: Duration::from_secs(interval_secs),
            },
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteRecordStore>,
    pub flow: Arc<VerificationFlow>,
    pub uploads: Arc<UploadStore>,
    pub audit: Arc<AuditLog>,
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting DOV Bridge v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Database: {}", config.database_url);
    info!("  Uploads: {}", config.uploads_dir.display());
    info!("  Audit log: {}", config.audit_log_path.display());

    // Open the record store and bring the schema up to date
    let store = SqliteRecordStore::from_url(&config.database_url).await?;
    store.initialize().await?;
    info!("Database ready");

    // Local storage
    let uploads = UploadStore::new(&config.uploads_dir);
    uploads.ensure_layout()?;
    let audit = AuditLog::new(&config.audit_log_path);
    audit.ensure_exists()?;

    // Upstream client and verification flow
    let xds_config = XdsConfig::from_env();
    info!("  XDS endpoint: {}", xds_config.endpoint);
    let client = XdsClient::new(xds_config)?;
    let flow = VerificationFlow::new(
        store.clone(),
        client,
        uploads.clone(),
        audit.clone(),
        config.poll.clone(),
    );

    // Create application state
    let state = AppState {
        store: Arc::new(store),
        flow: Arc::new(flow),
        uploads: Arc::new(uploads),
        audit: Arc::new(audit),
    };

    // Build router
    let app = build_router(&config)?.with_state(state);

    // Start server
    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("DOV Bridge is ready to accept connections");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

/// Build the router: application routes, health endpoints, static uploads.
pub fn build_router(config: &Config) -> anyhow::Result<Router<AppState>> {
    let mut router = crate::api::router()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(TraceLayer::new_for_http());

    if let Some(cors_layer) = cors_layer_from_env()? {
        router = router.layer(cors_layer);
    }

    Ok(router)
}

fn cors_layer_from_env() -> anyhow::Result<Option<CorsLayer>> {
    let origins = match std::env::var("CORS_ALLOW_ORIGINS") {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };

    let origins = origins.trim();
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([axum::http::header::CONTENT_TYPE]),
    ))
}
