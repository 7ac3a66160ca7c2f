//! Lap-by-lap comparison of two sessions of the same workout type.
//!
//! Lap `i` of the current session is matched with lap `i` of the previous
//! one; the compared length is the shorter of the two sequences.

use coach_telemetry_client::Lap;
use serde::{Deserialize, Serialize};

use super::pace::{AveragePolicy, average_pace, is_known, lap_pace};

/// Deltas within this band (s/km) count as unchanged.
pub const DEFAULT_NOISE_BAND: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOptions {
    pub noise_band: f64,
    pub average_policy: AveragePolicy,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            noise_band: DEFAULT_NOISE_BAND,
            average_policy: AveragePolicy::IncludeUnknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LapVerdict {
    Improved,
    Worsened,
    Unchanged,
}

pub fn classify_delta(delta: f64, noise_band: f64) -> LapVerdict {
    if delta < -noise_band {
        LapVerdict::Improved
    } else if delta > noise_band {
        LapVerdict::Worsened
    } else {
        LapVerdict::Unchanged
    }
}

/// Verdict for one lap pair. A lap with unknown pace on either side is never
/// counted as a change, whatever its raw delta.
fn lap_verdict(current_pace: f64, previous_pace: f64, noise_band: f64) -> LapVerdict {
    if !is_known(current_pace) || !is_known(previous_pace) {
        return LapVerdict::Unchanged;
    }
    classify_delta(current_pace - previous_pace, noise_band)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LapDiff {
    /// 1-based lap number.
    pub lap: usize,
    pub current_pace: f64,
    pub previous_pace: f64,
    /// Current minus previous, s/km. Negative is faster.
    pub delta: f64,
    pub verdict: LapVerdict,
    /// Current minus previous average heart rate, when both laps carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_delta: Option<f64>,
}

impl LapDiff {
    pub fn has_known_paces(&self) -> bool {
        is_known(self.current_pace) && is_known(self.previous_pace)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LapComparison {
    pub lap_diffs: Vec<LapDiff>,
    pub improved: usize,
    pub worsened: usize,
    pub unchanged: usize,
    pub total_delta: f64,
    pub current_avg_pace: f64,
    pub previous_avg_pace: f64,
}

impl LapComparison {
    /// Number of compared laps.
    pub fn total(&self) -> usize {
        self.lap_diffs.len()
    }

    pub fn deltas(&self) -> Vec<f64> {
        self.lap_diffs.iter().map(|d| d.delta).collect()
    }

    /// Deltas with unknown-pace laps read as no change (`0.0`).
    pub fn comparable_deltas(&self) -> Vec<f64> {
        self.lap_diffs
            .iter()
            .map(|d| if d.has_known_paces() { d.delta } else { 0.0 })
            .collect()
    }
}

/// Result of trying to compare the newest session of a type with the one before it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Compared(LapComparison),
    /// First time this workout type was done.
    NoPreviousSession,
    /// One of the two sessions has no lap telemetry.
    NoTelemetry,
}

impl ComparisonOutcome {
    pub fn comparison(&self) -> Option<&LapComparison> {
        match self {
            ComparisonOutcome::Compared(c) => Some(c),
            _ => None,
        }
    }
}

/// Compare the current session's laps with the previous session's laps.
///
/// `previous` is `None` when there is no earlier session of this type. An
/// absent previous session takes precedence over missing telemetry.
pub fn compare_laps(
    current: &[Lap],
    previous: Option<&[Lap]>,
    options: &ComparisonOptions,
) -> ComparisonOutcome {
    let Some(previous) = previous else {
        return ComparisonOutcome::NoPreviousSession;
    };
    if current.is_empty() || previous.is_empty() {
        return ComparisonOutcome::NoTelemetry;
    }

    let lap_diffs: Vec<LapDiff> = current
        .iter()
        .zip(previous.iter())
        .enumerate()
        .map(|(i, (cur, prev))| {
            let current_pace = lap_pace(cur);
            let previous_pace = lap_pace(prev);
            let delta = current_pace - previous_pace;
            LapDiff {
                lap: i + 1,
                current_pace,
                previous_pace,
                delta,
                verdict: lap_verdict(current_pace, previous_pace, options.noise_band),
                heart_rate_delta: cur
                    .average_heartrate
                    .zip(prev.average_heartrate)
                    .map(|(c, p)| c - p),
            }
        })
        .collect();

    let count = |v: LapVerdict| lap_diffs.iter().filter(|d| d.verdict == v).count();
    let improved = count(LapVerdict::Improved);
    let worsened = count(LapVerdict::Worsened);
    let unchanged = count(LapVerdict::Unchanged);
    let total_delta: f64 = lap_diffs.iter().map(|d| d.delta).sum();

    ComparisonOutcome::Compared(LapComparison {
        improved,
        worsened,
        unchanged,
        total_delta,
        current_avg_pace: average_pace(current, options.average_policy),
        previous_avg_pace: average_pace(previous, options.average_policy),
        lap_diffs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(distance: f64, elapsed: f64) -> Lap {
        Lap {
            distance,
            elapsed_time: elapsed,
            moving_time: elapsed,
            average_heartrate: None,
            max_heartrate: None,
        }
    }

    fn km_laps(paces: &[f64]) -> Vec<Lap> {
        paces.iter().map(|p| lap(1000.0, *p)).collect()
    }

    #[test]
    fn missing_previous_is_first_time() {
        let current = km_laps(&[240.0]);
        assert_eq!(
            compare_laps(&current, None, &ComparisonOptions::default()),
            ComparisonOutcome::NoPreviousSession
        );
        assert_eq!(
            compare_laps(&[], None, &ComparisonOptions::default()),
            ComparisonOutcome::NoPreviousSession
        );
    }

    #[test]
    fn empty_laps_on_either_side_is_no_telemetry() {
        let laps = km_laps(&[240.0]);
        let opts = ComparisonOptions::default();
        assert_eq!(compare_laps(&[], Some(laps.as_slice()), &opts), ComparisonOutcome::NoTelemetry);
        let empty: Vec<Lap> = Vec::new();
        assert_eq!(
            compare_laps(&laps, Some(empty.as_slice()), &opts),
            ComparisonOutcome::NoTelemetry
        );
    }

    #[test]
    fn deltas_are_exact_pace_differences() {
        let current = vec![lap(1000.0, 238.0), lap(400.0, 91.0), lap(1000.0, 250.0)];
        let previous = vec![lap(1000.0, 240.0), lap(400.0, 90.0), lap(1000.0, 250.2)];
        let outcome = compare_laps(&current, Some(previous.as_slice()), &ComparisonOptions::default());
        let cmp = outcome.comparison().expect("compared");
        for (i, d) in cmp.lap_diffs.iter().enumerate() {
            assert_eq!(d.lap, i + 1);
            assert_eq!(d.delta, lap_pace(&current[i]) - lap_pace(&previous[i]));
        }
        let sum: f64 = cmp.deltas().iter().sum();
        assert!((cmp.total_delta - sum).abs() < 1e-9);
        assert_eq!(cmp.improved, 1);
        assert_eq!(cmp.worsened, 1);
        assert_eq!(cmp.unchanged, 1);
    }

    #[test]
    fn compared_length_is_the_shorter_sequence() {
        let opts = ComparisonOptions::default();
        let long = km_laps(&[240.0, 241.0, 242.0, 243.0, 244.0]);
        let short = km_laps(&[239.0, 240.0]);
        let a = compare_laps(&long, Some(short.as_slice()), &opts);
        let b = compare_laps(&short, Some(long.as_slice()), &opts);
        assert_eq!(a.comparison().unwrap().total(), 2);
        assert_eq!(b.comparison().unwrap().total(), 2);
    }

    #[test]
    fn noise_band_is_exclusive() {
        assert_eq!(classify_delta(-0.5, 0.5), LapVerdict::Unchanged);
        assert_eq!(classify_delta(0.5, 0.5), LapVerdict::Unchanged);
        assert_eq!(classify_delta(-0.51, 0.5), LapVerdict::Improved);
        assert_eq!(classify_delta(0.51, 0.5), LapVerdict::Worsened);
        assert_eq!(classify_delta(0.3, 0.0), LapVerdict::Worsened);
    }

    #[test]
    fn heart_rate_delta_needs_both_laps() {
        let mut cur = km_laps(&[240.0, 240.0]);
        let mut prev = km_laps(&[242.0, 242.0]);
        cur[0].average_heartrate = Some(150.0);
        prev[0].average_heartrate = Some(155.0);
        cur[1].average_heartrate = Some(150.0);
        let outcome = compare_laps(&cur, Some(prev.as_slice()), &ComparisonOptions::default());
        let cmp = outcome.comparison().unwrap();
        assert_eq!(cmp.lap_diffs[0].heart_rate_delta, Some(-5.0));
        assert_eq!(cmp.lap_diffs[1].heart_rate_delta, None);
    }

    #[test]
    fn session_averages_follow_policy() {
        let current = vec![lap(1000.0, 240.0), lap(0.0, 60.0)];
        let previous = km_laps(&[250.0, 250.0]);

        let include = compare_laps(&current, Some(previous.as_slice()), &ComparisonOptions::default());
        assert_eq!(include.comparison().unwrap().current_avg_pace, 120.0);

        let opts = ComparisonOptions {
            average_policy: AveragePolicy::ExcludeUnknown,
            ..ComparisonOptions::default()
        };
        let exclude = compare_laps(&current, Some(previous.as_slice()), &opts);
        assert_eq!(exclude.comparison().unwrap().current_avg_pace, 240.0);
        assert_eq!(exclude.comparison().unwrap().previous_avg_pace, 250.0);
    }

    #[test]
    fn unknown_current_laps_are_not_improvements() {
        let current = vec![lap(0.0, 240.0), lap(0.0, 238.0), lap(0.0, 236.0)];
        let previous = km_laps(&[240.0, 240.0, 240.0]);
        let outcome = compare_laps(&current, Some(previous.as_slice()), &ComparisonOptions::default());
        let cmp = outcome.comparison().expect("compared");
        assert_eq!((cmp.improved, cmp.worsened, cmp.unchanged), (0, 0, 3));
        // raw deltas stay exact
        assert_eq!(cmp.deltas(), vec![-240.0, -240.0, -240.0]);
        assert_eq!(cmp.comparable_deltas(), vec![0.0, 0.0, 0.0]);
        assert!(cmp.lap_diffs.iter().all(|d| !d.has_known_paces()));
    }

    #[test]
    fn unknown_previous_lap_is_not_a_regression() {
        let current = km_laps(&[240.0, 239.0]);
        let previous = vec![lap(0.0, 250.0), lap(1000.0, 241.0)];
        let outcome = compare_laps(&current, Some(previous.as_slice()), &ComparisonOptions::default());
        let cmp = outcome.comparison().expect("compared");
        assert_eq!(cmp.lap_diffs[0].delta, 240.0);
        assert_eq!(cmp.lap_diffs[0].verdict, LapVerdict::Unchanged);
        assert_eq!(cmp.lap_diffs[1].verdict, LapVerdict::Improved);
        assert_eq!((cmp.improved, cmp.worsened, cmp.unchanged), (1, 0, 1));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let v = serde_json::to_value(ComparisonOutcome::NoTelemetry).unwrap();
        assert_eq!(v, serde_json::json!({"status": "no_telemetry"}));
    }
}
