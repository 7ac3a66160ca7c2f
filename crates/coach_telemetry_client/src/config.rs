use crate::TelemetryError;
use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_token: SecretString,
    pub athlete_id: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, TelemetryError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, TelemetryError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let token = get("COACH_API_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TelemetryError::Config("COACH_API_TOKEN missing".into()))?;
        let athlete_id = get("COACH_ATHLETE_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TelemetryError::Config("COACH_ATHLETE_ID missing".into()))?;
        let base_url = get("COACH_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Ok(Self {
            api_token: SecretString::new(token.into()),
            athlete_id,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_missing_token() {
        let get = |k: &str| match k {
            "COACH_API_TOKEN" => None,
            "COACH_ATHLETE_ID" => Some("42".into()),
            _ => None,
        };
        let res = Config::from_env_with(get);
        assert!(matches!(res, Err(TelemetryError::Config(_))));
    }

    #[test]
    fn from_env_blank_athlete_is_missing() {
        let get = |k: &str| match k {
            "COACH_API_TOKEN" => Some("tok".into()),
            "COACH_ATHLETE_ID" => Some("   ".into()),
            _ => None,
        };
        assert!(Config::from_env_with(get).is_err());
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "COACH_API_TOKEN" => Some("sekrit".into()),
            "COACH_ATHLETE_ID" => Some("42".into()),
            "COACH_API_BASE_URL" => Some("http://coach.local".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.athlete_id, "42");
        assert_eq!(cfg.base_url, "http://coach.local");
    }

    #[test]
    fn from_env_defaults_base_url() {
        let get = |k: &str| match k {
            "COACH_API_TOKEN" => Some("sekrit".into()),
            "COACH_ATHLETE_ID" => Some("42".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }
}
