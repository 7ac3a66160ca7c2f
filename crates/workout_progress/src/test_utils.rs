//! Shared test utilities and a mock `TrainingDataClient` used by unit tests.
#![cfg(test)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use coach_telemetry_client::{CompletedSession, Lap, TelemetryError, TrainingDataClient};

/// In-memory client: serves a fixed session list and per-reference laps.
#[derive(Default)]
pub struct MockClient {
    sessions: Vec<CompletedSession>,
    sessions_fail: bool,
    laps: HashMap<i64, Vec<Lap>>,
    failing: HashSet<i64>,
    delays: HashMap<i64, Duration>,
    lap_calls: AtomicUsize,
}

impl MockClient {
    pub fn with_sessions(mut self, sessions: Vec<CompletedSession>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_laps(mut self, telemetry_ref: i64, laps: Vec<Lap>) -> Self {
        self.laps.insert(telemetry_ref, laps);
        self
    }

    pub fn failing_ref(mut self, telemetry_ref: i64) -> Self {
        self.failing.insert(telemetry_ref);
        self
    }

    pub fn delayed_ref(mut self, telemetry_ref: i64, delay: Duration) -> Self {
        self.delays.insert(telemetry_ref, delay);
        self
    }

    pub fn failing_history(mut self) -> Self {
        self.sessions_fail = true;
        self
    }

    pub fn lap_calls(&self) -> usize {
        self.lap_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrainingDataClient for MockClient {
    async fn get_completed_sessions(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<CompletedSession>, TelemetryError> {
        if self.sessions_fail {
            return Err(TelemetryError::from_status(503, "history down"));
        }
        let take = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(self.sessions.iter().take(take).cloned().collect())
    }

    async fn get_session_laps(&self, telemetry_ref: i64) -> Result<Vec<Lap>, TelemetryError> {
        self.lap_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&telemetry_ref) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&telemetry_ref) {
            return Err(TelemetryError::from_status(502, "telemetry provider down"));
        }
        self.laps
            .get(&telemetry_ref)
            .cloned()
            .ok_or_else(|| TelemetryError::NotFound(format!("no laps for {telemetry_ref}")))
    }
}

pub fn lap(distance: f64, elapsed: f64) -> Lap {
    Lap {
        distance,
        elapsed_time: elapsed,
        moving_time: elapsed,
        average_heartrate: None,
        max_heartrate: None,
    }
}

/// 1 km laps at the given paces (s/km).
pub fn km_laps(paces: &[f64]) -> Vec<Lap> {
    paces.iter().map(|p| lap(1000.0, *p)).collect()
}

/// Session completed on the given day of March 2026.
pub fn session(id: &str, day: u32, title: Option<&str>, telemetry_ref: Option<i64>) -> CompletedSession {
    CompletedSession {
        id: id.to_string(),
        completed_at: Utc
            .with_ymd_and_hms(2026, 3, day, 7, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        title: title.map(str::to_string),
        distance: Some(10_000.0),
        duration: Some(3000.0),
        telemetry_ref,
    }
}
