use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use coach_telemetry_client::config::Config;
use coach_telemetry_client::http_client::ReqwestTrainingClient;
use workout_progress::middleware::LoggingMiddleware;
use workout_progress::{EngineConfig, ProgressHandler, http};

/// Default listen address when `ADDRESS` is unset or unparsable.
fn listen_addr_from(raw: Option<String>) -> SocketAddr {
    raw.and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)))
}

/// Per-request timeout from `WORKOUT_PROGRESS_REQUEST_TIMEOUT_SECS`, default 30 s.
fn request_timeout_from(raw: Option<String>) -> Duration {
    raw.and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}


#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Configure logging from env var `WORKOUT_PROGRESS_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("WORKOUT_PROGRESS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_env.clone())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!(%log_env, "workout_progress:http: log filter");

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;
    coach_telemetry_client::observability::describe_metrics();

    let client_config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "missing credentials; aborting startup");
            std::process::exit(1);
        }
    };
    let engine_config = EngineConfig::from_env()?;
    info!(
        trend_window = engine_config.trend_window,
        noise_band = engine_config.comparison.noise_band,
        "engine configured"
    );

    let client = LoggingMiddleware::new(ReqwestTrainingClient::from_config(&client_config));
    let handler = ProgressHandler::with_config(Arc::new(client), engine_config);

    let request_timeout =
        request_timeout_from(std::env::var("WORKOUT_PROGRESS_REQUEST_TIMEOUT_SECS").ok());
    let app = http::router(handler).route(
        "/metrics",
        get(move || {
            let handle = metrics_handle.clone();
            async move {
                (
                    [("content-type", "text/plain; version=0.0.4")],
                    handle.render(),
                )
            }
        }),
    );
    let app = http::with_limits(app, request_timeout);

    let addr = listen_addr_from(std::env::var("ADDRESS").ok());
    info!(%addr, timeout_secs = request_timeout.as_secs(), "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to install ctrl+c handler: {e}");
            }
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
