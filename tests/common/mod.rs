//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

/// Reference instant used throughout: 2024-01-10T00:00:00Z.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Two scrape runs with an overlapping repository and assorted dirt.
pub fn scrape_runs() -> (Value, Value) {
    let first = json!([
        {"repo": "a/b", "desc": "first pass", "tags": "cli\nparser", "star": "1.5k", "lang": "Rust", "update": "2 days ago"},
        {"repo": "c/d", "desc": "null", "tags": null, "star": "2,345", "lang": "Go", "update": "on Jan 3, 2024"},
        {"repo": "spam/bot", "desc": "buy now", "tags": "null", "star": "9", "lang": "null", "update": "3 hours ago"},
        {"desc": "no repo key", "star": "1"}
    ]);
    let second = json!([
        {"repo": "a/b", "desc": "second pass", "tags": "cli", "star": "10", "lang": "Rust", "update": "yesterday"},
        {"repo": "c/d", "desc": "older copy", "star": 5, "update": "on Dec 30, 2023"},
        {"repo": "e/f", "star": "", "update": "whenever"}
    ]);
    (first, second)
}

pub fn repos(records: &Value) -> Vec<String> {
    records
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("repo").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
