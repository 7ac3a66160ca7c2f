use crate::domains::comparison::ComparisonOptions;
use crate::domains::pace::AveragePolicy;
use crate::domains::trend::DEFAULT_TREND_WINDOW;
use crate::error::{ProgressError, ProgressResult};

/// Tunables for grouping, comparison and trend building.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub trend_window: usize,
    pub comparison: ComparisonOptions,
    /// Passed to the session-history source; `None` takes whatever it returns.
    pub history_limit: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            comparison: ComparisonOptions::default(),
            history_limit: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> ProgressResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Read settings through `get` so tests never mutate the process environment.
    pub fn from_env_with<F>(mut get: F) -> ProgressResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = get("WORKOUT_PROGRESS_TREND_WINDOW") {
            let window: usize = raw.trim().parse().map_err(|_| {
                ProgressError::Config(format!("WORKOUT_PROGRESS_TREND_WINDOW: invalid value {raw:?}"))
            })?;
            if window == 0 {
                return Err(ProgressError::Config(
                    "WORKOUT_PROGRESS_TREND_WINDOW must be at least 1".into(),
                ));
            }
            cfg.trend_window = window;
        }

        if let Some(raw) = get("WORKOUT_PROGRESS_NOISE_BAND") {
            let band: f64 = raw.trim().parse().map_err(|_| {
                ProgressError::Config(format!("WORKOUT_PROGRESS_NOISE_BAND: invalid value {raw:?}"))
            })?;
            if !band.is_finite() || band < 0.0 {
                return Err(ProgressError::Config(
                    "WORKOUT_PROGRESS_NOISE_BAND must be a non-negative number".into(),
                ));
            }
            cfg.comparison.noise_band = band;
        }

        if let Some(raw) = get("WORKOUT_PROGRESS_EXCLUDE_UNKNOWN_PACE") {
            cfg.comparison.average_policy = if parse_bool(&raw).ok_or_else(|| {
                ProgressError::Config(format!(
                    "WORKOUT_PROGRESS_EXCLUDE_UNKNOWN_PACE: invalid value {raw:?}"
                ))
            })? {
                AveragePolicy::ExcludeUnknown
            } else {
                AveragePolicy::IncludeUnknown
            };
        }

        if let Some(raw) = get("WORKOUT_PROGRESS_HISTORY_LIMIT") {
            let limit: u32 = raw.trim().parse().map_err(|_| {
                ProgressError::Config(format!("WORKOUT_PROGRESS_HISTORY_LIMIT: invalid value {raw:?}"))
            })?;
            cfg.history_limit = Some(limit);
        }

        Ok(cfg)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = EngineConfig::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.trend_window, 6);
        assert_eq!(cfg.comparison.noise_band, 0.5);
        assert_eq!(cfg.comparison.average_policy, AveragePolicy::IncludeUnknown);
    }

    #[test]
    fn reads_all_values() {
        let get = |k: &str| match k {
            "WORKOUT_PROGRESS_TREND_WINDOW" => Some("4".into()),
            "WORKOUT_PROGRESS_NOISE_BAND" => Some("1.5".into()),
            "WORKOUT_PROGRESS_EXCLUDE_UNKNOWN_PACE" => Some("yes".into()),
            "WORKOUT_PROGRESS_HISTORY_LIMIT" => Some("200".into()),
            _ => None,
        };
        let cfg = EngineConfig::from_env_with(get).expect("cfg");
        assert_eq!(cfg.trend_window, 4);
        assert_eq!(cfg.comparison.noise_band, 1.5);
        assert_eq!(cfg.comparison.average_policy, AveragePolicy::ExcludeUnknown);
        assert_eq!(cfg.history_limit, Some(200));
    }

    #[test]
    fn rejects_zero_window() {
        let get = |k: &str| (k == "WORKOUT_PROGRESS_TREND_WINDOW").then(|| "0".to_string());
        assert!(matches!(
            EngineConfig::from_env_with(get),
            Err(ProgressError::Config(_))
        ));
    }

    #[test]
    fn rejects_negative_noise_band() {
        let get = |k: &str| (k == "WORKOUT_PROGRESS_NOISE_BAND").then(|| "-1".to_string());
        assert!(EngineConfig::from_env_with(get).is_err());
    }

    #[test]
    fn rejects_unknown_bool() {
        let get = |k: &str| (k == "WORKOUT_PROGRESS_EXCLUDE_UNKNOWN_PACE").then(|| "maybe".to_string());
        assert!(EngineConfig::from_env_with(get).is_err());
    }
}
