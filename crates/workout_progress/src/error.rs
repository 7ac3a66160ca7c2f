//! Custom error types for the progress engine.

use thiserror::Error;

/// Progress engine errors.
///
/// Telemetry problems never show up here: they are absorbed by the accessor
/// and turned into empty lap sequences.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("session history unavailable: {0}")]
    History(#[from] coach_telemetry_client::TelemetryError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for engine operations.
pub type ProgressResult<T> = Result<T, ProgressError>;
