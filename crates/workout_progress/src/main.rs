use std::sync::Arc;

use coach_telemetry_client::config::Config;
use coach_telemetry_client::http_client::ReqwestTrainingClient;
use workout_progress::middleware::LoggingMiddleware;
use workout_progress::{EngineConfig, ProgressHandler};

/// One-shot report: selectable workout types and the default selection, as JSON on stdout.
/// Pass a workout-type key as the first argument to report that type instead.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `WORKOUT_PROGRESS_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("WORKOUT_PROGRESS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("workout_progress: log filter: {}", log_env);

    let client_config = Config::from_env()?;
    let engine_config = EngineConfig::from_env()?;
    let client = LoggingMiddleware::new(ReqwestTrainingClient::from_config(&client_config));
    let handler = ProgressHandler::with_config(Arc::new(client), engine_config);

    let output = match std::env::args().nth(1) {
        Some(key) => serde_json::to_string_pretty(&handler.progress(&key).await?)?,
        None => serde_json::to_string_pretty(&handler.report().await?)?,
    };
    println!("{output}");

    Ok(())
}
