//! Normalization and reconciliation through the public API

use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use repomerge_core::{canonicalize, normalize_star_text, normalize_timestamp, reconcile};
use repomerge_types::{CanonicalRecord, Field, RawRecord};

use crate::common::now;

fn canonical(values: Value) -> Vec<CanonicalRecord> {
    let raw: Vec<RawRecord> = serde_json::from_value(values).unwrap();
    raw.iter().filter_map(|r| canonicalize(r, now()).ok()).collect()
}

#[test]
fn relative_timestamps_resolve_against_now() {
    assert_eq!(
        normalize_timestamp(Some("3 hours ago"), now()),
        Some(now() - Duration::hours(3))
    );
    assert_eq!(
        normalize_timestamp(Some("yesterday"), now()),
        Some(now() - Duration::hours(24))
    );
    assert_eq!(normalize_timestamp(Some("sometime"), now()), None);
    assert_eq!(normalize_timestamp(None, now()), None);
}

#[test]
fn star_counts_normalize() {
    assert_eq!(normalize_star_text("1.5k"), 1500);
    assert_eq!(normalize_star_text("2,345"), 2345);
    assert_eq!(normalize_star_text("null"), 0);
    assert_eq!(normalize_star_text(""), 0);
}

#[test]
fn latest_update_wins_over_larger_star_count() {
    let records = canonical(json!([
        {"repo": "a/b", "star": "1.5k", "update": "2 days ago"},
        {"repo": "a/b", "star": "10", "update": "yesterday"}
    ]));

    let reconciled = reconcile(records);

    assert_eq!(reconciled.len(), 1);
    assert_eq!(reconciled[0].star, 10);
    assert_eq!(reconciled[0].update, Field::from("2024-01-09"));
    assert_eq!(
        serde_json::to_value(&reconciled[0]).unwrap(),
        json!({
            "repo": "a/b",
            "desc": "null",
            "tags": "null",
            "star": 10,
            "lang": "null",
            "update": "2024-01-09"
        })
    );
}

#[test]
fn ties_keep_the_first_seen_record() {
    let records = canonical(json!([
        {"repo": "a/b", "desc": "first", "update": "whenever"},
        {"repo": "x/y", "desc": "other", "update": "yesterday"},
        {"repo": "a/b", "desc": "second", "update": "never"},
        {"repo": "x/y", "desc": "same day", "update": "yesterday"}
    ]));

    let reconciled = reconcile(records);

    let descs: Vec<String> = reconciled.iter().map(|r| r.desc.to_string()).collect();
    assert_eq!(descs, vec!["first", "other"]);
}

#[test]
fn reconciling_twice_changes_nothing() {
    let records = canonical(json!([
        {"repo": "a/b", "update": "2 days ago"},
        {"repo": "c/d", "update": "on Jan 3, 2024"},
        {"repo": "a/b", "update": "5 hours ago"},
        {"repo": "c/d", "update": "on Dec 30, 2023"}
    ]));

    let once = reconcile(records);
    let twice = reconcile(once.clone());

    assert_eq!(twice, once);
}

#[test]
fn placeholder_never_survives_as_a_value() {
    let records = canonical(json!([
        {"repo": "a/b", "desc": "null", "tags": null, "lang": "null", "update": "null"}
    ]));

    let record = &records[0];
    for field in [&record.desc, &record.tags, &record.lang, &record.update] {
        assert!(field.is_unknown());
    }
}
