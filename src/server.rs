//! HTTP Server
//!
//! This module implements the Prometheus exporter HTTP server.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format (path is configurable)
//! - `GET /health` - Health check (200 if every status file is readable, 503 otherwise)
//!
//! # Metrics Collection
//!
//! Metrics are collected when Prometheus scrapes: every request to the
//! telemetry path reads all status files from scratch on a blocking thread.
//! Scrapes are serialized, so two scrapes never overlap, even when a client
//! disconnects mid-scrape.

use crate::collector::{OpenVpnCollector, SerializedScraper};
use crate::config::Config;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    scraper: SerializedScraper,
    telemetry_path: String,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let collector = OpenVpnCollector::new(
        config.sources.clone(),
        config.openvpn.ignore_individuals,
    );

    let state = AppState {
        scraper: SerializedScraper::new(collector),
        telemetry_path: config.server.telemetry_path.clone(),
    };

    // Build the router
    let app = Router::new()
        .route("/", get(root_handler))
        .route(&config.server.telemetry_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!(
        "Metrics available at http://{}{}",
        addr, config.server.telemetry_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
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

    info!("Received shutdown signal, exiting gracefully...");
}

async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(format!(
        r#"<html>
<head><title>OpenVPN Exporter</title></head>
<body>
<h1>OpenVPN Exporter</h1>
<p><a href="{}">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
        state.telemetry_path
    ))
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.scraper.scrape().await {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let collector = state.scraper.collector().clone();
    let unreadable = tokio::task::spawn_blocking(move || {
        collector
            .unreadable_sources()
            .into_iter()
            .map(|source| source.name.clone())
            .collect::<Vec<_>>()
    })
    .await;

    match unreadable {
        Ok(names) if names.is_empty() => (StatusCode::OK, "OK".to_string()),
        Ok(names) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Status files unreadable: {}", names.join(", ")),
        ),
        Err(e) => {
            error!("Health check task failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Health check failed".to_string(),
            )
        }
    }
}
