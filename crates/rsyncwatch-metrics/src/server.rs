//! HTTP scrape endpoint for the metrics registry.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ExporterError, Result};
use crate::registry::MetricsRegistry;

/// Pull-based scrape endpoint serving `/metrics` and `/health`.
#[derive(Debug, Clone)]
pub struct MetricsServer {
    registry: MetricsRegistry,
}

impl MetricsServer {
    /// Creates a server over the given registry.
    #[must_use]
    pub fn new(registry: MetricsRegistry) -> Self {
        Self { registry }
    }

    /// Binds `addr` and serves scrapes until a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::BindFailed`] if the address cannot be
    /// bound; callers treat this as a startup failure.
    pub async fn serve(&self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ExporterError::BindFailed(addr, e))?;

        info!(addr = %addr, "metrics endpoint listening");

        axum::serve(listener, create_router(self.registry.clone()))
            .await
            .map_err(|e| ExporterError::Serve(e.to_string()))?;

        Ok(())
    }
}

/// Creates the scrape router.
pub fn create_router(registry: MetricsRegistry) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .route("/health", get(health_check))
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
}

async fn serve_metrics(State(registry): State<MetricsRegistry>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, MetricsRegistry::content_type())],
        registry.encode(),
    )
}

async fn health_check() -> &'static str {
    "ok"
}
