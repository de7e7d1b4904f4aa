//! Prometheus scrape endpoint.
//!
//! `GET /metrics` returns the text exposition of the global registry,
//! `GET /health` a small JSON liveness document.

use std::net::SocketAddr;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio::sync::watch;
use tracing::{error, info};

/// Build the metrics router.
pub fn router(role: &'static str) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(move || health_check(role)))
}

async fn metrics_handler() -> impl IntoResponse {
    match ep_telemetry::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!("[runtime] Metrics encoding failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn health_check(role: &'static str) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "role": role,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve the router on `0.0.0.0:port` until shutdown flips to `true`.
pub async fn serve(
    port: u16,
    role: &'static str,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("[runtime] Metrics endpoint listening on {}", addr);

    axum::serve(listener, router(role))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
}
