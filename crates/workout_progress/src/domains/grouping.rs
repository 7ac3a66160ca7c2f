//! Session grouping by normalized workout type.
//!
//! Free-text titles are reduced to a comparable key by an ordered table of
//! matchers; the first matcher that returns a key wins. Sessions sharing a
//! key form a [`WorkoutTypeGroup`], and only groups with at least
//! [`MIN_GROUP_SIZE`] sessions are surfaced.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::LazyLock;

use coach_telemetry_client::CompletedSession;
use regex::Regex;
use serde::Serialize;

/// A group needs a previous session to compare against.
pub const MIN_GROUP_SIZE: usize = 2;

/// Length of the fallback key, in characters.
pub const FALLBACK_KEY_CHARS: usize = 30;

/// Key used for any generic "carrera" title.
pub const GENERIC_RUN_KEY: &str = "rodaje";

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:de|por)\s+(?:la\s+)?(?:tarde|mañana|manana|noche)\b")
        .expect("time-of-day pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

// <reps>x<amount><unit> followed by any number of rest (r90s) or zone (lt2, z3) qualifiers.
static INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\d+x\d+(?:[.,]\d+)?(?:'|"|’|”|min|km|k|m|s)(?:\s+(?:r\d+(?:s|'|"|’|”|min)?|lt\d|z\d))*"#,
    )
    .expect("interval pattern is valid")
});

static DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:km|k)\b").expect("distance pattern is valid")
});

static GENERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcarrera\b").expect("generic run pattern is valid"));

/// Which matcher produced a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRule {
    Interval,
    Distance,
    GenericRun,
    Prefix,
}

type Matcher = fn(&str) -> Option<String>;

/// Tried in order against the normalized title.
const MATCHERS: &[(KeyRule, Matcher)] = &[
    (KeyRule::Interval, match_interval),
    (KeyRule::Distance, match_distance),
    (KeyRule::GenericRun, match_generic_run),
    (KeyRule::Prefix, match_prefix),
];

/// Sessions sharing one workout-type key, most recent first.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WorkoutTypeGroup {
    pub key: String,
    pub count: usize,
    pub sessions: Vec<CompletedSession>,
}

impl WorkoutTypeGroup {
    /// The session being evaluated.
    pub fn current(&self) -> Option<&CompletedSession> {
        self.sessions.first()
    }

    /// The session it is compared against.
    pub fn previous(&self) -> Option<&CompletedSession> {
        self.sessions.get(1)
    }
}

/// Lowercase, drop time-of-day qualifiers, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = TIME_OF_DAY.replace_all(&lowered, " ");
    collapse_whitespace(&stripped)
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

fn match_interval(text: &str) -> Option<String> {
    INTERVAL
        .find(text)
        .map(|m| collapse_whitespace(m.as_str()))
}

fn match_distance(text: &str) -> Option<String> {
    let caps = DISTANCE.captures(text)?;
    let amount = caps.get(1)?.as_str().replace(',', ".");
    Some(format!("{amount}km"))
}

fn match_generic_run(text: &str) -> Option<String> {
    GENERIC_RUN
        .is_match(text)
        .then(|| GENERIC_RUN_KEY.to_string())
}

fn match_prefix(text: &str) -> Option<String> {
    let prefix: String = text.chars().take(FALLBACK_KEY_CHARS).collect();
    let prefix = prefix.trim_end();
    (!prefix.is_empty()).then(|| prefix.to_string())
}

/// Workout-type key for a title along with the rule that produced it.
///
/// Returns `None` when nothing comparable is left after normalization.
pub fn classify_title(title: &str) -> Option<(KeyRule, String)> {
    let normalized = normalize_title(title);
    if normalized.is_empty() {
        return None;
    }
    MATCHERS
        .iter()
        .find_map(|(rule, matcher)| matcher(&normalized).map(|key| (*rule, key)))
}

pub fn workout_type_key(title: &str) -> Option<String> {
    classify_title(title).map(|(_, key)| key)
}

/// Bucket every titled session by key, including singleton buckets.
fn bucket_sessions(sessions: &[CompletedSession]) -> HashMap<String, Vec<CompletedSession>> {
    let mut buckets: HashMap<String, Vec<CompletedSession>> = HashMap::new();
    for session in sessions {
        let Some(key) = session.title.as_deref().and_then(workout_type_key) else {
            continue;
        };
        buckets.entry(key).or_default().push(session.clone());
    }
    buckets
}

/// Group a session history into comparable workout types.
///
/// Untitled sessions are skipped. Each group's sessions are ordered most
/// recent first; groups are ordered by descending size, so the first group is
/// the default selection.
pub fn group_sessions(sessions: &[CompletedSession]) -> Vec<WorkoutTypeGroup> {
    let mut groups: Vec<WorkoutTypeGroup> = bucket_sessions(sessions)
        .into_iter()
        .filter(|(_, members)| members.len() >= MIN_GROUP_SIZE)
        .map(|(key, mut members)| {
            members.sort_by(|a, b| {
                b.completed_at
                    .cmp(&a.completed_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
            WorkoutTypeGroup {
                key,
                count: members.len(),
                sessions: members,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| {
                let newest = |g: &WorkoutTypeGroup| g.current().map(|s| Reverse(s.completed_at));
                newest(a).cmp(&newest(b))
            })
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}

/// Number of titled sessions sharing the key, including groups too small to surface.
pub fn sessions_with_key(sessions: &[CompletedSession], key: &str) -> usize {
    sessions
        .iter()
        .filter_map(|s| s.title.as_deref().and_then(workout_type_key))
        .filter(|k| k == key)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session(id: &str, day: u32, title: Option<&str>) -> CompletedSession {
        CompletedSession {
            id: id.to_string(),
            completed_at: Utc.with_ymd_and_hms(2026, 3, day, 7, 0, 0).unwrap(),
            title: title.map(str::to_string),
            distance: None,
            duration: None,
            telemetry_ref: None,
        }
    }

    #[test]
    fn time_of_day_suffix_does_not_split_interval_groups() {
        assert_eq!(workout_type_key("3x10' de tarde LT2"), Some("3x10' lt2".into()));
        assert_eq!(workout_type_key("3x10' LT2"), Some("3x10' lt2".into()));
        assert_eq!(
            workout_type_key("Series 3x10' R90s de tarde"),
            workout_type_key("Series 3x10' R90s")
        );
    }

    #[test]
    fn interval_key_keeps_rest_and_zone_qualifiers() {
        assert_eq!(
            classify_title("2x400m R90s"),
            Some((KeyRule::Interval, "2x400m r90s".into()))
        );
        assert_eq!(
            workout_type_key("Pista 6x1000m   r2' z4 por la mañana"),
            Some("6x1000m r2' z4".into())
        );
        assert_eq!(workout_type_key("4x5\" cuestas"), Some("4x5\"".into()));
    }

    #[test]
    fn distance_expression_is_normalized() {
        assert_eq!(
            classify_title("Rodaje 10km"),
            Some((KeyRule::Distance, "10km".into()))
        );
        assert_eq!(workout_type_key("Tirada 21,1 k de la noche"), Some("21.1km".into()));
        assert_eq!(workout_type_key("rodaje suave 8K"), Some("8km".into()));
    }

    #[test]
    fn generic_run_collapses_to_rodaje() {
        assert_eq!(
            classify_title("Carrera de la mañana"),
            Some((KeyRule::GenericRun, GENERIC_RUN_KEY.into()))
        );
        assert_eq!(workout_type_key("Carrera por la noche"), Some("rodaje".into()));
    }

    #[test]
    fn fallback_uses_first_thirty_characters() {
        let key = workout_type_key("Fuerza en gimnasio con trabajo de core y movilidad").unwrap();
        assert_eq!(key.chars().count(), FALLBACK_KEY_CHARS);
        assert_eq!(key, "fuerza en gimnasio con trabajo");
    }

    #[test]
    fn fallback_counts_characters_not_bytes() {
        let key = workout_type_key("ñññññññññññññññññññññññññññññññññññ").unwrap();
        assert_eq!(key.chars().count(), FALLBACK_KEY_CHARS);
    }

    #[test]
    fn blank_titles_have_no_key() {
        assert_eq!(workout_type_key("   "), None);
        assert_eq!(workout_type_key("de la tarde"), None);
    }

    #[test]
    fn groups_need_two_sessions_and_sort_by_recency() {
        let sessions = vec![
            session("a", 1, Some("Rodaje 10km")),
            session("b", 5, Some("3x10' LT2")),
            session("c", 9, Some("3x10' de tarde LT2")),
            session("d", 3, None),
        ];
        let groups = group_sessions(&sessions);
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.key, "3x10' lt2");
        assert_eq!(g.count, 2);
        assert_eq!(g.sessions.len(), g.count);
        assert_eq!(g.current().map(|s| s.id.as_str()), Some("c"));
        assert_eq!(g.previous().map(|s| s.id.as_str()), Some("b"));
    }

    #[test]
    fn groups_sort_by_descending_count() {
        let sessions = vec![
            session("a", 1, Some("Rodaje 10km")),
            session("b", 2, Some("10k tranquilo")),
            session("c", 3, Some("Carrera")),
            session("d", 4, Some("carrera suave")),
            session("e", 5, Some("Carrera larga")),
        ];
        let groups = group_sessions(&sessions);
        let keys: Vec<_> = groups.iter().map(|g| (g.key.as_str(), g.count)).collect();
        assert_eq!(keys, vec![("rodaje", 3), ("10km", 2)]);
    }

    #[test]
    fn equal_counts_prefer_most_recent_group() {
        let sessions = vec![
            session("a", 1, Some("10km")),
            session("b", 2, Some("10km")),
            session("c", 3, Some("carrera")),
            session("d", 8, Some("carrera")),
        ];
        let groups = group_sessions(&sessions);
        assert_eq!(groups[0].key, "rodaje");
        assert_eq!(groups[1].key, "10km");
    }

    #[test]
    fn grouping_is_idempotent() {
        let sessions = vec![
            session("a", 1, Some("Rodaje 10km")),
            session("b", 2, Some("10k")),
            session("c", 3, Some("3x10' LT2")),
            session("d", 4, Some("3x10' de tarde LT2")),
            session("e", 5, Some("carrera")),
            session("f", 6, Some("Carrera por la noche")),
        ];
        let first = group_sessions(&sessions);
        let second = group_sessions(&sessions);
        assert_eq!(first, second);
    }

    #[test]
    fn sessions_with_key_counts_singletons() {
        let sessions = vec![
            session("a", 1, Some("Rodaje 10km")),
            session("b", 2, Some("carrera")),
        ];
        assert_eq!(sessions_with_key(&sessions, "10km"), 1);
        assert_eq!(sessions_with_key(&sessions, "5km"), 0);
        assert!(group_sessions(&sessions).is_empty());
    }
}
