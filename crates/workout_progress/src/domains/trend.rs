use coach_telemetry_client::CompletedSession;
use serde::Serialize;

use super::grouping::WorkoutTypeGroup;
use super::pace::{UNKNOWN_PACE, pace_from};

pub const DEFAULT_TREND_WINDOW: usize = 6;

/// One chart point: a session's date, average pace (s/km) and distance (km).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TrendPoint {
    pub session_id: String,
    pub date: String,
    pub avg_pace: f64,
    pub distance_km: f64,
}

impl TrendPoint {
    pub fn from_session(session: &CompletedSession) -> Self {
        let avg_pace = match (session.duration, session.distance) {
            (Some(duration), Some(distance)) => pace_from(duration, distance),
            _ => UNKNOWN_PACE,
        };
        Self {
            session_id: session.id.clone(),
            date: session.completed_at.format("%-d %b").to_string(),
            avg_pace,
            distance_km: session.distance.map(|m| m / 1000.0).unwrap_or(0.0),
        }
    }
}

/// Oldest-to-newest series over the `window` most recent sessions of a group.
///
/// Uses session totals only; no lap telemetry is involved.
pub fn build_trend(group: &WorkoutTypeGroup, window: usize) -> Vec<TrendPoint> {
    group
        .sessions
        .iter()
        .take(window)
        .rev()
        .map(TrendPoint::from_session)
        .collect()
}
