//! "Last updated" text to instant resolution.
//!
//! Scrape runs capture GitHub's human-facing relative text ("3 hours ago",
//! "yesterday", "on Jan 5") rather than an absolute timestamp. Resolution is
//! relative to an explicit `now` so that a run is reproducible.
//!
//! Recognizers are tried in a fixed priority order; the first one whose
//! pattern matches decides the outcome, even if it then fails to produce a
//! date. Only when no recognizer matches does the generic date parser run.

use std::sync::LazyLock;

use chrono::{Datelike, DateTime, Duration, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

type Resolver = fn(&str, DateTime<Utc>) -> Option<DateTime<Utc>>;

/// A (predicate, resolver) pair in the recognizer table.
struct Recognizer {
    name: &'static str,
    pattern: &'static LazyLock<Regex>,
    resolve: Resolver,
}

static JUST_NOW: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(?:second|minute)s? ago"));
static HOURS_AGO: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bhours? ago"));
static YESTERDAY: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)yesterday"));
static DAYS_AGO: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bdays? ago"));
static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| compile(r"on ([A-Za-z]+) (\d{1,2})$"));
static MONTH_DAY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| compile(r"on ([A-Za-z]+) (\d{1,2}), (\d{4})"));
static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| compile(r"\d+"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("recognizer patterns are valid")
}

static RECOGNIZERS: [Recognizer; 6] = [
    Recognizer {
        name: "just_now",
        pattern: &JUST_NOW,
        resolve: resolve_now,
    },
    Recognizer {
        name: "hours_ago",
        pattern: &HOURS_AGO,
        resolve: resolve_hours_ago,
    },
    Recognizer {
        name: "yesterday",
        pattern: &YESTERDAY,
        resolve: resolve_yesterday,
    },
    Recognizer {
        name: "days_ago",
        pattern: &DAYS_AGO,
        resolve: resolve_days_ago,
    },
    Recognizer {
        name: "month_day",
        pattern: &MONTH_DAY,
        resolve: resolve_month_day,
    },
    Recognizer {
        name: "month_day_year",
        pattern: &MONTH_DAY_YEAR,
        resolve: resolve_month_day_year,
    },
];

/// Formats tried, in order, once no recognizer matched.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%d %B %Y"];

/// Resolve a free-form "last updated" string against `now`.
///
/// Returns `None` (Unknown) for absent input, for text no recognizer or
/// date format accepts, and for recognized text naming an impossible date.
///
/// A yearless `"on <Month> <Day>"` always takes `now`'s calendar year, even
/// when that puts the date in the future.
#[must_use]
pub fn normalize_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(recognizer) = RECOGNIZERS.iter().find(|r| r.pattern.is_match(raw)) {
        let resolved = (recognizer.resolve)(raw, now);
        if resolved.is_none() {
            tracing::debug!(
                recognizer = recognizer.name,
                raw,
                "Recognized timestamp did not resolve"
            );
        }
        return resolved;
    }

    let resolved = parse_generic(raw);
    if resolved.is_none() {
        tracing::debug!(raw, "Unrecognized timestamp degraded to unknown");
    }
    resolved
}

/// Milliseconds since the Unix epoch, 0 for an unresolved timestamp.
#[must_use]
pub fn epoch_millis(resolved: Option<DateTime<Utc>>) -> i64 {
    resolved.map_or(0, |at| at.timestamp_millis())
}

/// First run of digits in `raw`, 0 when there is none. `None` when the
/// digits overflow `i64`.
fn first_integer(raw: &str) -> Option<i64> {
    match FIRST_INTEGER.find(raw) {
        Some(digits) => digits.as_str().parse().ok(),
        None => Some(0),
    }
}

fn resolve_now(_raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(now)
}

fn resolve_hours_ago(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(Duration::try_hours(first_integer(raw)?)?)
}

fn resolve_yesterday(_raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(Duration::try_days(1)?)
}

fn resolve_days_ago(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(Duration::try_days(first_integer(raw)?)?)
}

fn resolve_month_day(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = MONTH_DAY.captures(raw)?;
    calendar_date(&caps[1], &caps[2], now.year())
}

fn resolve_month_day_year(raw: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = MONTH_DAY_YEAR.captures(raw)?;
    calendar_date(&caps[1], &caps[2], caps[3].parse().ok()?)
}

fn calendar_date(month: &str, day: &str, year: i32) -> Option<DateTime<Utc>> {
    let month = month.parse::<Month>().ok()?;
    let day = day.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month.number_from_month(), day)?;
    Some(midnight_utc(date))
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn parse_generic(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = DateTime::parse_from_rfc2822(raw) {
        return Some(at.with_timezone(&Utc));
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(midnight_utc)
        })
}
