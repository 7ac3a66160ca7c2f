//! Lap pace normalization.
//!
//! Pace is seconds per kilometer; lower is faster. A pace of `0.0` is the
//! "unknown" sentinel and must never be read as an instant lap.

use coach_telemetry_client::Lap;
use serde::{Deserialize, Serialize};

/// Sentinel returned when a lap has no usable distance.
pub const UNKNOWN_PACE: f64 = 0.0;

/// How unknown-pace laps take part in a session average.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragePolicy {
    /// Every lap counts, unknown laps at 0 s/km.
    #[default]
    IncludeUnknown,
    /// Unknown laps are left out of the mean.
    ExcludeUnknown,
}

/// Seconds per kilometer for one lap, or [`UNKNOWN_PACE`].
pub fn lap_pace(lap: &Lap) -> f64 {
    pace_from(lap.elapsed_time, lap.distance)
}

/// Seconds per kilometer from a time (s) and a distance (m).
pub fn pace_from(seconds: f64, meters: f64) -> f64 {
    if !meters.is_finite() || !seconds.is_finite() || meters <= 0.0 {
        return UNKNOWN_PACE;
    }
    seconds / meters * 1000.0
}

pub fn is_known(pace: f64) -> bool {
    pace != UNKNOWN_PACE
}

/// Mean pace over a session's laps. Returns [`UNKNOWN_PACE`] when nothing is averaged.
pub fn average_pace(laps: &[Lap], policy: AveragePolicy) -> f64 {
    let paces = laps.iter().map(lap_pace).filter(|p| match policy {
        AveragePolicy::IncludeUnknown => true,
        AveragePolicy::ExcludeUnknown => is_known(*p),
    });

    let (sum, count) = paces.fold((0.0, 0usize), |(s, c), p| (s + p, c + 1));
    if count == 0 {
        UNKNOWN_PACE
    } else {
        sum / count as f64
    }
}
