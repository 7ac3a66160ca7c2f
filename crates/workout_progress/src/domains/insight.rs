//! Rule-based verdict for a lap comparison.

use serde::{Deserialize, Serialize};

use super::comparison::{ComparisonOutcome, LapComparison};

/// How many trailing laps the strong-finish rule looks at.
pub const FINISH_LAPS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Exceptional,
    SolidProgress,
    ModerateImprovement,
    Fatigue,
    StrongFinish,
    Stable,
}

impl InsightKind {
    pub fn message(self) -> &'static str {
        match self {
            InsightKind::Exceptional => "exceptional session, nearly every lap improved.",
            InsightKind::SolidProgress => "solid progress across most laps.",
            InsightKind::ModerateImprovement => {
                "moderate improvement; keep working on consistency."
            }
            InsightKind::Fatigue => "slower session; possible accumulated fatigue.",
            InsightKind::StrongFinish => "strong finish; laps improved at the end",
            InsightKind::Stable => "stable performance; maintain consistency.",
        }
    }
}

/// Pick the verdict for `total` compared laps. Rules are checked in order and
/// the first one that holds wins; `None` only when nothing was compared.
pub fn classify(improved: usize, worsened: usize, total: usize, deltas: &[f64]) -> Option<InsightKind> {
    if total == 0 {
        return None;
    }
    let share = |n: usize| n as f64 / total as f64;

    let kind = if share(improved) >= 0.8 {
        InsightKind::Exceptional
    } else if share(improved) >= 0.6 {
        InsightKind::SolidProgress
    } else if share(improved) >= 0.4 {
        InsightKind::ModerateImprovement
    } else if share(worsened) >= 0.6 {
        InsightKind::Fatigue
    } else if finished_strong(deltas) {
        InsightKind::StrongFinish
    } else {
        InsightKind::Stable
    };
    Some(kind)
}

fn finished_strong(deltas: &[f64]) -> bool {
    deltas.len() >= FINISH_LAPS && deltas[deltas.len() - FINISH_LAPS..].iter().all(|d| *d < 0.0)
}

pub fn insight_kind(comparison: &LapComparison) -> Option<InsightKind> {
    classify(
        comparison.improved,
        comparison.worsened,
        comparison.total(),
        &comparison.comparable_deltas(),
    )
}

/// Verdict text for a comparison, or an empty string when there is nothing to say.
pub fn generate_insight(comparison: &LapComparison) -> String {
    insight_kind(comparison)
        .map(|k| k.message().to_string())
        .unwrap_or_default()
}

pub fn insight_for(outcome: &ComparisonOutcome) -> String {
    outcome.comparison().map(generate_insight).unwrap_or_default()
}
