//! HTTP API server for source resolution.
//!
//! Exposes the orchestrator to the presentation layer. The provider list
//! is process-wide configuration: constructed once at startup and handed
//! to request handlers by reference, with no mutable shared state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use slipstream_core::SlipstreamError;
use slipstream_core::config::HttpConfig;
use slipstream_sources::SourceOrchestrator;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::catalog::CatalogClient;
use crate::handlers::api_sources;

/// Shared state injected into request handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SourceOrchestrator>,
    pub catalog: Arc<CatalogClient>,
    pub request_deadline: Duration,
}

impl AppState {
    /// Assembles app state from the orchestrator and catalog client.
    pub fn new(
        orchestrator: SourceOrchestrator,
        catalog: CatalogClient,
        config: &HttpConfig,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            catalog: Arc::new(catalog),
            request_deadline: config.request_deadline,
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sources", get(api_sources))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the API server until the process is stopped.
///
/// # Errors
/// - `SlipstreamError::Configuration` - The bind address is malformed
/// - `SlipstreamError::Server` - Binding or serving failed
pub async fn run_server(config: &HttpConfig, state: AppState) -> slipstream_core::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| SlipstreamError::Configuration {
            reason: format!("invalid bind address: {e}"),
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SlipstreamError::Server {
            reason: format!("could not bind {addr}: {e}"),
        })?;
    info!(
        providers = ?state.orchestrator.provider_names(),
        "API server listening on http://{addr}"
    );

    axum::serve(listener, router(state))
        .await
        .map_err(|e| SlipstreamError::Server {
            reason: e.to_string(),
        })?;
    Ok(())
}
