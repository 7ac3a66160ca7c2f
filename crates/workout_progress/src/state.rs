use serde::Serialize;

use crate::domains::comparison::ComparisonOutcome;
use crate::domains::grouping::{MIN_GROUP_SIZE, WorkoutTypeGroup};
use crate::domains::insight::insight_for;
use crate::domains::trend::TrendPoint;

/// Why a view has no comparison to show.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// Fewer than two sessions share the workout type.
    NeedMoreSessions,
    /// The newest session is the first of its type.
    FirstTime,
    /// One of the two sessions has no lap telemetry.
    NoLapData,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NeedMoreSessions => "need at least 2 similar sessions",
            EmptyState::FirstTime => "first time doing this workout",
            EmptyState::NoLapData => "no lap data found for this session",
        }
    }

    pub fn for_outcome(outcome: &ComparisonOutcome) -> Option<Self> {
        match outcome {
            ComparisonOutcome::Compared(_) => None,
            ComparisonOutcome::NoPreviousSession => Some(EmptyState::FirstTime),
            ComparisonOutcome::NoTelemetry => Some(EmptyState::NoLapData),
        }
    }
}

/// A selectable workout type.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WorkoutTypeSummary {
    pub key: String,
    pub count: usize,
}

impl From<&WorkoutTypeGroup> for WorkoutTypeSummary {
    fn from(group: &WorkoutTypeGroup) -> Self {
        Self {
            key: group.key.clone(),
            count: group.count,
        }
    }
}

/// Everything the UI shows for one selected workout type.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProgressView {
    pub workout_type: String,
    pub session_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_session_id: Option<String>,
    /// `None` only when there is no comparable history at all.
    pub comparison: Option<ComparisonOutcome>,
    pub insight: String,
    pub trend: Vec<TrendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressView {
    /// View for a key that does not have enough sessions to compare.
    pub fn no_history(key: impl Into<String>, session_count: usize) -> Self {
        debug_assert!(session_count < MIN_GROUP_SIZE);
        let empty = EmptyState::NeedMoreSessions;
        Self {
            workout_type: key.into(),
            session_count,
            current_session_id: None,
            previous_session_id: None,
            comparison: None,
            insight: String::new(),
            trend: Vec::new(),
            empty_state: Some(empty),
            message: Some(empty.message().to_string()),
        }
    }

    pub fn for_group(group: &WorkoutTypeGroup, outcome: ComparisonOutcome, trend: Vec<TrendPoint>) -> Self {
        let empty = EmptyState::for_outcome(&outcome);
        Self {
            workout_type: group.key.clone(),
            session_count: group.count,
            current_session_id: group.current().map(|s| s.id.clone()),
            previous_session_id: group.previous().map(|s| s.id.clone()),
            insight: insight_for(&outcome),
            comparison: Some(outcome),
            trend,
            empty_state: empty,
            message: empty.map(|e| e.message().to_string()),
        }
    }
}
