//! Star-count normalization.
//!
//! Scraped star counts arrive as JSON numbers or as display text such as
//! `"1.5k"` or `"2,345"`. Every input resolves to a non-negative integer;
//! anything unparseable is 0.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use repomerge_types::PLACEHOLDER;

/// Leading decimal number, the way a lenient float parser reads it.
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("float pattern is valid")
});

/// Normalize a raw star value to a count.
///
/// ```
/// use repomerge_core::normalize_star;
/// use serde_json::json;
///
/// assert_eq!(normalize_star(Some(&json!("1.5k"))), 1500);
/// assert_eq!(normalize_star(Some(&json!("2,345"))), 2345);
/// assert_eq!(normalize_star(Some(&json!(42))), 42);
/// assert_eq!(normalize_star(None), 0);
/// ```
#[must_use]
pub fn normalize_star(raw: Option<&Value>) -> u64 {
    match raw {
        Some(Value::Number(number)) => number.as_f64().map_or(0, round_count),
        Some(Value::String(text)) => normalize_star_text(text),
        _ => 0,
    }
}

/// Normalize star display text (`"1.5k"`, `"2,345"`, `"null"`).
#[must_use]
pub fn normalize_star_text(text: &str) -> u64 {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        return 0;
    }

    if let Some(kilo) = trimmed
        .strip_suffix('k')
        .or_else(|| trimmed.strip_suffix('K'))
    {
        return leading_float(kilo).map_or(0, |n| round_count(n * 1000.0));
    }

    leading_float(&trimmed.replace(',', "")).map_or(0, round_count)
}

fn leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    LEADING_FLOAT.find(text)?.as_str().parse().ok()
}

fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
