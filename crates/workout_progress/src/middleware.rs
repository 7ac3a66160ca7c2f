//! Middleware layer for cross-cutting concerns around the data client.
//!
//! Wraps any [`TrainingDataClient`] to log timing and outcome of every call,
//! so the engine and the remote client stay free of logging noise.

use std::sync::Arc;
use std::time::Instant;

use coach_telemetry_client::{CompletedSession, Lap, TelemetryError, TrainingDataClient};
use tracing::debug;

/// Logging wrapper for a [`TrainingDataClient`].
#[derive(Clone)]
pub struct LoggingMiddleware<C: TrainingDataClient> {
    inner: Arc<C>,
}

impl<C: TrainingDataClient> LoggingMiddleware<C> {
    /// Create a new logging middleware wrapper.
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Execute a fallible operation with logging.
    async fn with_logging<F, Fut, T>(&self, operation: F, name: &str) -> Result<T, TelemetryError>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: std::future::Future<Output = Result<T, TelemetryError>>,
    {
        let start = Instant::now();
        debug!("Starting operation: {}", name);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        match &result {
            Ok(_) => {
                debug!(
                    "Operation completed successfully: {} in {:?}",
                    name, duration
                );
            }
            Err(e) => {
                debug!(
                    "Operation failed: {} in {:?} - error: {}",
                    name, duration, e
                );
            }
        }

        result
    }
}

#[async_trait::async_trait]
impl<C: TrainingDataClient + 'static> TrainingDataClient for LoggingMiddleware<C> {
    async fn get_completed_sessions(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<CompletedSession>, TelemetryError> {
        self.with_logging(
            |client| async move { client.get_completed_sessions(limit).await },
            "get_completed_sessions",
        )
        .await
    }

    async fn get_session_laps(&self, telemetry_ref: i64) -> Result<Vec<Lap>, TelemetryError> {
        self.with_logging(
            |client| async move { client.get_session_laps(telemetry_ref).await },
            "get_session_laps",
        )
        .await
    }
}
