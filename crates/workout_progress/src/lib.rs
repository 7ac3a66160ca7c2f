//! Workout comparison and progress analytics for one athlete's history.
//!
//! [`ProgressHandler`] runs the whole pipeline: group the session history by
//! workout type, fetch laps for the two newest sessions of the selected type,
//! compare them lap by lap, derive an insight and build the trend series.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use coach_telemetry_client::{CompletedSession, TrainingDataClient};

pub mod config;
pub mod domains;
pub mod error;
pub mod http;
pub mod middleware;
pub mod services;
pub mod state;
pub mod telemetry;

mod test_utils;

pub use config::EngineConfig;
pub use error::{ProgressError, ProgressResult};
pub use services::{SelectionService, SelectionTicket};
pub use state::{EmptyState, ProgressView, WorkoutTypeSummary};

use domains::comparison::{ComparisonOutcome, compare_laps};
use domains::grouping::{WorkoutTypeGroup, group_sessions, sessions_with_key};
use domains::trend::build_trend;

pub const COMPARISONS_TOTAL: &str = "workout_progress_comparisons_total";

#[derive(Clone)]
pub struct ProgressHandler {
    client: Arc<dyn TrainingDataClient>,
    config: EngineConfig,
    selections: SelectionService,
}

/// Selectable types plus the view for the default (most frequent) one.
#[derive(Debug, Serialize, Clone)]
pub struct ProgressReport {
    pub workout_types: Vec<WorkoutTypeSummary>,
    pub default_selection: Option<ProgressView>,
}

impl ProgressHandler {
    pub fn new(client: Arc<dyn TrainingDataClient>) -> Self {
        Self::with_config(client, EngineConfig::default())
    }

    pub fn with_config(client: Arc<dyn TrainingDataClient>, config: EngineConfig) -> Self {
        Self {
            client,
            config,
            selections: SelectionService::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selections(&self) -> &SelectionService {
        &self.selections
    }

    /// Fetch the athlete's session history. The only fallible step of the pipeline.
    pub async fn load_history(&self) -> ProgressResult<Vec<CompletedSession>> {
        let sessions = self
            .client
            .get_completed_sessions(self.config.history_limit)
            .await?;
        debug!(sessions = sessions.len(), "loaded session history");
        Ok(sessions)
    }

    pub async fn workout_groups(&self) -> ProgressResult<Vec<WorkoutTypeGroup>> {
        Ok(group_sessions(&self.load_history().await?))
    }

    /// Selectable workout types, most frequent first.
    pub async fn workout_types(&self) -> ProgressResult<Vec<WorkoutTypeSummary>> {
        Ok(self
            .workout_groups()
            .await?
            .iter()
            .map(WorkoutTypeSummary::from)
            .collect())
    }

    /// Compare the two newest sessions of a group and build its trend.
    pub async fn progress_for_group(&self, group: &WorkoutTypeGroup) -> ProgressView {
        let trend = build_trend(group, self.config.trend_window);

        let Some(current) = group.current() else {
            return ProgressView::no_history(group.key.clone(), group.count);
        };
        let previous = group.previous();

        let (current_laps, previous_laps) =
            telemetry::fetch_pair(self.client.as_ref(), current, previous).await;
        let outcome = compare_laps(
            &current_laps,
            previous_laps.as_deref(),
            &self.config.comparison,
        );

        let label = match &outcome {
            ComparisonOutcome::Compared(_) => "compared",
            ComparisonOutcome::NoPreviousSession => "no_previous_session",
            ComparisonOutcome::NoTelemetry => "no_telemetry",
        };
        metrics::counter!(COMPARISONS_TOTAL, "outcome" => label).increment(1);
        debug!(key = %group.key, outcome = label, "comparison finished");

        ProgressView::for_group(group, outcome, trend)
    }

    /// Progress view for `key` computed against an already-loaded history.
    pub async fn progress_in_history(&self, sessions: &[CompletedSession], key: &str) -> ProgressView {
        let groups = group_sessions(sessions);
        match groups.iter().find(|g| g.key == key) {
            Some(group) => self.progress_for_group(group).await,
            None => ProgressView::no_history(key, sessions_with_key(sessions, key)),
        }
    }

    /// Progress view for a workout-type key, recomputed from fresh history.
    pub async fn progress(&self, key: &str) -> ProgressResult<ProgressView> {
        let sessions = self.load_history().await?;
        Ok(self.progress_in_history(&sessions, key).await)
    }

    /// Select a workout type for display.
    ///
    /// Returns `Ok(None)` when a newer selection started while this one was in
    /// flight; the stale result is dropped and the display keeps the newer view.
    pub async fn select(&self, key: &str) -> ProgressResult<Option<ProgressView>> {
        let ticket = self.selections.begin();
        let view = self.progress(key).await?;
        Ok(self.selections.publish(ticket, view).await)
    }

    /// Workout types plus the default selection, from a single history fetch.
    pub async fn report(&self) -> ProgressResult<ProgressReport> {
        let sessions = self.load_history().await?;
        let groups = group_sessions(&sessions);
        let default_selection = match groups.first() {
            Some(group) => Some(self.progress_for_group(group).await),
            None => None,
        };
        info!(
            sessions = sessions.len(),
            workout_types = groups.len(),
            "built progress report"
        );
        Ok(ProgressReport {
            workout_types: groups.iter().map(WorkoutTypeSummary::from).collect(),
            default_selection,
        })
    }
}
