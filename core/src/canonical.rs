//! Raw record to canonical record.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use repomerge_types::{CanonicalRecord, Field, PLACEHOLDER, RawRecord};

use crate::star::normalize_star;
use crate::timestamp::normalize_timestamp;

/// A raw record with no usable dedup key.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("record has no repo key")]
pub struct MissingRepoKey;

/// Normalize one raw record.
///
/// Pure: the only ambient input, the current instant, is passed in.
/// Fails only when `repo` is absent, null, empty, or the placeholder; every
/// other field degrades to Unknown (or a zero star count) instead.
pub fn canonicalize(
    raw: &RawRecord,
    now: DateTime<Utc>,
) -> Result<CanonicalRecord, MissingRepoKey> {
    let repo = match text_field(raw.repo.as_ref()) {
        Field::Value(repo) if !repo.is_empty() => repo,
        _ => return Err(MissingRepoKey),
    };

    let tags = tags_field(raw.tags.as_ref()).map(|tags| tags.replace('\n', ","));
    let update = text_field(raw.update.as_ref());
    let updated_at = normalize_timestamp(update.as_deref(), now);

    Ok(CanonicalRecord::new(
        repo,
        text_field(raw.desc.as_ref()),
        tags,
        normalize_star(raw.star.as_ref()),
        text_field(raw.lang.as_ref()),
        updated_at,
    ))
}

/// Scalar JSON value as a field. Numbers and booleans keep their JSON text.
fn text_field(raw: Option<&Value>) -> Field {
    match raw {
        None | Some(Value::Null) => Field::Unknown,
        Some(Value::String(text)) => Field::from_text(text.as_str()),
        Some(Value::Number(number)) => Field::Value(number.to_string()),
        Some(Value::Bool(flag)) => Field::Value(flag.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => Field::Unknown,
    }
}

/// Tags arrive comma-joined, but a list of strings is joined the same way.
fn tags_field(raw: Option<&Value>) -> Field {
    match raw {
        Some(Value::Array(items)) => {
            let tags: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|tag| *tag != PLACEHOLDER)
                .collect();
            if tags.is_empty() {
                Field::Unknown
            } else {
                Field::Value(tags.join(","))
            }
        }
        other => text_field(other),
    }
}
