//! Fail-soft access to lap telemetry.
//!
//! A session without telemetry must never block the rest of the pipeline:
//! every failure here ends up as an empty lap sequence for that session only.

use coach_telemetry_client::{CompletedSession, Lap, TrainingDataClient};
use tracing::{debug, warn};

pub const TELEMETRY_FAILURES_TOTAL: &str = "workout_progress_telemetry_failures_total";

/// What a lap fetch produced, kept only for logging; callers want [`LapFetch::into_laps`].
#[derive(Debug, Clone, PartialEq)]
pub enum LapFetch {
    Laps(Vec<Lap>),
    NoReference,
    Failed(String),
}

impl LapFetch {
    pub fn into_laps(self) -> Vec<Lap> {
        match self {
            LapFetch::Laps(laps) => laps,
            LapFetch::NoReference | LapFetch::Failed(_) => Vec::new(),
        }
    }
}

fn is_well_formed(lap: &Lap) -> bool {
    [lap.distance, lap.elapsed_time, lap.moving_time]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
}

/// Fetch the laps of one session.
pub async fn fetch_laps(client: &dyn TrainingDataClient, session: &CompletedSession) -> LapFetch {
    let Some(telemetry_ref) = session.telemetry_ref else {
        debug!(session_id = %session.id, "session has no telemetry reference");
        return LapFetch::NoReference;
    };

    match client.get_session_laps(telemetry_ref).await {
        Ok(laps) if laps.iter().all(is_well_formed) => LapFetch::Laps(laps),
        Ok(_) => {
            warn!(session_id = %session.id, telemetry_ref, "discarding malformed lap data");
            metrics::counter!(TELEMETRY_FAILURES_TOTAL, "reason" => "malformed").increment(1);
            LapFetch::Failed("malformed lap data".into())
        }
        Err(e) => {
            warn!(session_id = %session.id, telemetry_ref, error = %e, "lap telemetry unavailable");
            metrics::counter!(TELEMETRY_FAILURES_TOTAL, "reason" => "remote").increment(1);
            LapFetch::Failed(e.to_string())
        }
    }
}

/// Laps for the current session and, when present, the previous one.
///
/// Both fetches run concurrently and fail independently.
pub async fn fetch_pair(
    client: &dyn TrainingDataClient,
    current: &CompletedSession,
    previous: Option<&CompletedSession>,
) -> (Vec<Lap>, Option<Vec<Lap>>) {
    let previous_fut = async {
        match previous {
            Some(session) => Some(fetch_laps(client, session).await.into_laps()),
            None => None,
        }
    };
    let (current_laps, previous_laps) = tokio::join!(fetch_laps(client, current), previous_fut);
    (current_laps.into_laps(), previous_laps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockClient, lap, session};

    #[tokio::test]
    async fn missing_reference_yields_no_laps() {
        let client = MockClient::default();
        let s = session("a", 1, Some("10km"), None);
        assert_eq!(fetch_laps(&client, &s).await, LapFetch::NoReference);
        assert_eq!(client.lap_calls(), 0);
    }

    #[tokio::test]
    async fn remote_failure_is_swallowed() {
        let client = MockClient::default().failing_ref(7);
        let s = session("a", 1, Some("10km"), Some(7));
        let fetched = fetch_laps(&client, &s).await;
        assert!(matches!(fetched, LapFetch::Failed(_)));
        assert!(fetched.into_laps().is_empty());
    }

    #[tokio::test]
    async fn malformed_laps_are_rejected_whole() {
        let client = MockClient::default()
            .with_laps(3, vec![lap(1000.0, 240.0), lap(f64::NAN, 240.0)]);
        let s = session("a", 1, Some("10km"), Some(3));
        assert!(matches!(fetch_laps(&client, &s).await, LapFetch::Failed(_)));
    }

    #[tokio::test]
    async fn one_failure_does_not_block_the_other() {
        let client = MockClient::default()
            .with_laps(1, vec![lap(1000.0, 240.0)])
            .failing_ref(2);
        let cur = session("cur", 2, Some("10km"), Some(1));
        let prev = session("prev", 1, Some("10km"), Some(2));
        let (cur_laps, prev_laps) = fetch_pair(&client, &cur, Some(&prev)).await;
        assert_eq!(cur_laps.len(), 1);
        assert_eq!(prev_laps, Some(Vec::new()));
    }

    #[tokio::test]
    async fn absent_previous_is_not_fetched() {
        let client = MockClient::default().with_laps(1, vec![lap(1000.0, 240.0)]);
        let cur = session("cur", 2, Some("10km"), Some(1));
        let (cur_laps, prev_laps) = fetch_pair(&client, &cur, None).await;
        assert_eq!(cur_laps.len(), 1);
        assert!(prev_laps.is_none());
        assert_eq!(client.lap_calls(), 1);
    }
}
