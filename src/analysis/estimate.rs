//! Estimate parsing and work-time formatting.
//!
//! Jira hands out estimates in two shapes: raw seconds from the
//! `originalEstimateSeconds` field, and author-typed shorthand such as
//! `"1d 2h 30m"`. Both end up as whole minutes.

use crate::models::WorkTime;
use regex::Regex;
use std::sync::LazyLock;

/// Hours in one work day.
pub const WORK_DAY_HOURS: u64 = 8;

/// Minutes in one work day.
pub const MINUTES_PER_WORK_DAY: u64 = WORK_DAY_HOURS * 60;

static DAYS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)d").unwrap());
static HOURS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)h").unwrap());
static MINUTES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)m").unwrap());

/// Parse a raw estimate into whole minutes.
///
/// A value that parses as a number is taken as **seconds**. Anything else is
/// scanned for `<n>d`, `<n>h` and `<n>m` components, where a day is
/// [`WORK_DAY_HOURS`] long.
///
/// NOTE: the two branches disagree on units on purpose. `"28800"` is 480
/// minutes (8 clock hours of seconds) while `"1d"` is also 480 minutes but
/// only because a day counts as 8 hours here. Existing totals depend on
/// both conventions, so they are not unified.
///
/// Never fails: unparseable input yields 0.
pub fn parse_estimate(raw: &str) -> u64 {
    let trimmed = raw.trim();

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_finite() {
            return minutes_from_seconds(seconds);
        }
    }

    let days = capture_number(&DAYS_REGEX, trimmed);
    let hours = capture_number(&HOURS_REGEX, trimmed);
    let minutes = capture_number(&MINUTES_REGEX, trimmed);

    days.saturating_mul(WORK_DAY_HOURS)
        .saturating_add(hours)
        .saturating_mul(60)
        .saturating_add(minutes)
}

/// Truncate seconds to whole minutes. Negative or non-finite input is 0.
pub fn minutes_from_seconds(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds / 60.0) as u64
}

/// Format minutes as `"{d}d {h}h {m}m"` using the 8-hour work day.
pub fn format_dhm(minutes: u64) -> String {
    WorkTime::from_minutes(minutes).to_string()
}

/// Format minutes as clock hours, `"{h}h {m}m"`.
pub fn format_hm(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

fn capture_number(regex: &Regex, text: &str) -> u64 {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}
