//! Liveness endpoint for the hosting platform
//!
//! `GET /` answers with a plain-text banner and `GET /health` with
//! `{"status":"ok"}`. Nothing here touches the ledger or Telegram.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub const BANNER: &str = "Telegram bot ishlayapti!";

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
}

async fn root_handler() -> &'static str {
    BANNER
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus { status: "ok" }))
}

/// Routes of the health server
pub fn router() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Serves the health routes on `port` until `shutdown` resolves.
pub async fn serve(port: u16, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    log::info!("Health server listening on http://{}", addr);
    log::info!("  /        - Banner (text)");
    log::info!("  /health  - Health check (JSON)");

    axum::serve(listener, router()).with_graceful_shutdown(shutdown).await?;

    log::info!("Health server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
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
    log::info!("Shutdown signal received");
}
