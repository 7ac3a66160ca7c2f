//! `TrainingDataClient` trait, the shared session/lap data types, and a
//! reqwest-based implementation for the coaching API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod retry;
pub mod utils;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
}

impl TelemetryError {
    /// Build an error for a non-success status that has no dedicated variant.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        TelemetryError::Api {
            status,
            body: body.into(),
        }
    }

    /// Transport failures, throttling and server-side errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TelemetryError::Api { status, .. } => *status == 429 || *status >= 500,
            TelemetryError::Config(_) | TelemetryError::NotFound(_) | TelemetryError::Auth(_) => {
                false
            }
        }
    }
}

/// A finished training session as reported by the session-history source.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_completed_at")]
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    /// Total distance in meters.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Total duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub telemetry_ref: Option<i64>,
}

/// One lap of a session's telemetry. Position in the sequence is the lap index.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lap {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub elapsed_time: f64,
    /// Seconds.
    pub moving_time: f64,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn deserialize_completed_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let raw = String::deserialize(deserializer)?;
    utils::parse_completed_at(&raw)
        .ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {raw}")))
}

#[async_trait]
pub trait TrainingDataClient: Send + Sync + 'static {
    /// Completed sessions for the configured athlete, in whatever order the source returns them.
    async fn get_completed_sessions(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<CompletedSession>, TelemetryError>;

    /// Ordered laps for a session's external telemetry reference.
    async fn get_session_laps(&self, telemetry_ref: i64) -> Result<Vec<Lap>, TelemetryError>;
}
