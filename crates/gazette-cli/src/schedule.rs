use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Parse a wall-clock time given as `HH:MM`.
pub fn parse_at(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| format!("expected HH:MM, got {:?}: {}", s, e))
}

/// How long to wait from `now` until the next occurrence of `at`.
///
/// If `at` is exactly now, the next run is a day away.
pub fn until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let mut next = now.date().and_time(at);
    if next <= now {
        next += TimeDelta::days(1);
    }
    (next - now).to_std().unwrap_or_default()
}
