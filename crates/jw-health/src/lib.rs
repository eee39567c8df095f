//! Liveness endpoint for container orchestration.

use std::{future::Future, net::SocketAddr};

use axum::{routing::get, Json, Router};
use serde::Serialize;

use jw_core::{errors::Error, Result};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn build_router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Serve `/health` on `addr` until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "health server listening");

    axum::serve(listener, build_router())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::External(format!("health server failed: {e}")))
}
