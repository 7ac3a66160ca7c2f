//! Domain modules for the progress analytics.
//!
//! Everything here is a pure function of its inputs (session history and lap
//! sequences); nothing is cached between calls.
//!
//! # Modules
//!
//! - [`grouping`]: Title normalization and workout-type groups
//! - [`pace`]: Lap pace and session averages
//! - [`comparison`]: Lap-by-lap alignment and deltas
//! - [`insight`]: Rule-based verdict text
//! - [`trend`]: Chart series over recent sessions

pub mod comparison;
pub mod grouping;
pub mod insight;
pub mod pace;
pub mod trend;

pub use comparison::{ComparisonOptions, ComparisonOutcome, LapComparison, LapDiff, LapVerdict, compare_laps};
pub use grouping::{WorkoutTypeGroup, group_sessions, workout_type_key};
pub use insight::{InsightKind, generate_insight};
pub use pace::{AveragePolicy, lap_pace};
pub use trend::{TrendPoint, build_trend};
