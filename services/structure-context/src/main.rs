//! PDB Context Structure Service
//!
//! Serves compact, cacheable summaries of PDB entries.
//! Integrates with the RCSB PDB Data API.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get},
    Router,
};
use pdbctx_models::StructureSummary;
use pdbctx_utils::{init_logging, AppConfig, CacheStats, ErrorResponse, PdbContextError};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

mod middleware;
mod pdb_client;
mod service;

use middleware::request_id_middleware;
use pdb_client::PdbClient;
use service::{StructureCache, StructureService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting PDB Context Structure Service");

    // Invalid cache settings are fatal
    let cache = StructureCache::from_config(&config.cache)?;
    info!(
        enabled = cache.is_enabled(),
        max_size = cache.max_size(),
        ttl_seconds = cache.ttl().as_secs_f64(),
        "Structure cache initialized"
    );

    let client = PdbClient::new(&config.pdb_api)?;
    info!(base_url = %client.base_url(), "PDB API client initialized");

    let service = StructureService::new(Arc::new(cache), Arc::new(client));
    let app = create_app(service, &config);

    // Start server
    let ip: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Structure Context Service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Structure Context Service stopped");
    Ok(())
}

fn create_app(service: StructureService, config: &AppConfig) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/health", get(health_check))
        .route("/api/v1/structures/:pdb_id", get(get_structure))
        .route("/api/v1/cache/stats", get(cache_stats))
        .route("/api/v1/cache", delete(clear_cache))
        .route("/api/v1/cache/:pdb_id", delete(invalidate_cache_entry))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout_seconds)))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(service)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Error returned by handlers, rendered as an [`ErrorResponse`] body.
struct ApiError(PdbContextError);

impl From<PdbContextError> for ApiError {
    fn from(error: PdbContextError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else {
            warn!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

async fn read_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the PDB Context API.",
        "structures": "/api/v1/structures/{pdb_id}"
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "structure-context",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Get the structure summary for a PDB entry
async fn get_structure(
    State(service): State<StructureService>,
    Path(pdb_id): Path<String>,
) -> Result<Json<StructureSummary>, ApiError> {
    info!(pdb_id = %pdb_id, "Received structure request");

    let summary = service.build_structure_context(&pdb_id).await?;
    Ok(Json(StructureSummary::clone(&summary)))
}

async fn cache_stats(State(service): State<StructureService>) -> Json<CacheStats> {
    Json(service.cache_stats())
}

async fn clear_cache(State(service): State<StructureService>) -> StatusCode {
    service.clear_cache();
    StatusCode::NO_CONTENT
}

async fn invalidate_cache_entry(
    State(service): State<StructureService>,
    Path(pdb_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.invalidate(&pdb_id)?;
    Ok(StatusCode::NO_CONTENT)
}
