//! HTTP client implementation for the coaching API.
//!
//! This module provides a reqwest-based implementation of the [`TrainingDataClient`](crate::TrainingDataClient) trait.

use crate::observability::record_request;
use crate::retry::RetryPolicy;
use crate::{CompletedSession, Lap, TelemetryError, TrainingDataClient};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the coaching API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestTrainingClient {
    base_url: String,
    athlete_id: String,
    api_token: SecretString,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ReqwestTrainingClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the coaching API (e.g., "https://coach.example.com")
    /// * `athlete_id` - The athlete whose history is read
    /// * `api_token` - Bearer token for authentication
    pub fn new(base_url: &str, athlete_id: impl Into<String>, api_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            athlete_id: athlete_id.into(),
            api_token,
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Build a client from a loaded [`Config`](crate::config::Config).
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            &config.base_url,
            config.athlete_id.clone(),
            config.api_token.clone(),
        )
    }

    /// Replace the retry policy used for every GET.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.api_token.expose_secret())
    }

    /// GET a JSON document, retrying transient failures.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, TelemetryError> {
        let start = Instant::now();
        let result = self
            .retry
            .retry_async(
                move || async move {
                    let resp = self.get_request(url).query(query).send().await?;
                    self.handle_response(resp).await
                },
                TelemetryError::is_retryable,
            )
            .await;
        record_request(endpoint, result.is_ok(), start.elapsed());
        result
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, TelemetryError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> TelemetryError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => TelemetryError::NotFound(body_snippet),
            401 | 403 => TelemetryError::Auth(body_snippet),
            _ => TelemetryError::from_status(status, body_snippet),
        }
    }
}

#[async_trait]
impl TrainingDataClient for ReqwestTrainingClient {
    async fn get_completed_sessions(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<CompletedSession>, TelemetryError> {
        let url = format!(
            "{}/api/v1/athletes/{}/sessions",
            self.base_url, self.athlete_id
        );
        let mut query = Vec::new();
        if let Some(l) = limit {
            query.push(("limit", l.to_string()));
        }
        self.get_json("sessions", &url, &query).await
    }

    async fn get_session_laps(&self, telemetry_ref: i64) -> Result<Vec<Lap>, TelemetryError> {
        let url = format!(
            "{}/api/v1/telemetry/activities/{}/laps",
            self.base_url, telemetry_ref
        );
        self.get_json("laps", &url, &[]).await
    }
}
