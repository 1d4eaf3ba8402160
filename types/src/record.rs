//! Raw and canonical repository metadata records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::field::Field;

/// Date format of the canonical `update` field.
pub const UPDATE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One record as produced by a scrape run.
///
/// Every value may be absent, JSON `null`, or the placeholder string.
/// `star` in particular arrives as either a number or display text (`"1.5k"`).
/// Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub repo: Option<Value>,
    #[serde(default)]
    pub desc: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub star: Option<Value>,
    #[serde(default)]
    pub lang: Option<Value>,
    #[serde(default)]
    pub update: Option<Value>,
}

/// A normalized repository entry.
///
/// `repo` is the verbatim dedup key. Every other string field is either a
/// value or [`Field::Unknown`]; the placeholder string never appears inside.
///
/// The full-precision instant behind `update` is carried alongside for
/// reconciliation but never serialized. Records read back from a reconciled
/// file recover it as midnight UTC of their `update` date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CanonicalRecordWire")]
pub struct CanonicalRecord {
    pub repo: String,
    pub desc: Field,
    pub tags: Field,
    pub star: u64,
    pub lang: Field,
    pub update: Field,
    #[serde(skip_serializing)]
    updated_at: Option<DateTime<Utc>>,
}

impl CanonicalRecord {
    /// Assemble a record. `update` is derived from `updated_at`.
    #[must_use]
    pub fn new(
        repo: impl Into<String>,
        desc: Field,
        tags: Field,
        star: u64,
        lang: Field,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let update = updated_at.map_or(Field::Unknown, |at| {
            Field::Value(at.format(UPDATE_DATE_FORMAT).to_string())
        });
        Self {
            repo: repo.into(),
            desc,
            tags,
            star,
            lang,
            update,
            updated_at,
        }
    }

    /// The resolved update instant, `None` when the timestamp was unknown.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[derive(Deserialize)]
struct CanonicalRecordWire {
    repo: String,
    #[serde(default)]
    desc: Field,
    #[serde(default)]
    tags: Field,
    #[serde(default)]
    star: u64,
    #[serde(default)]
    lang: Field,
    #[serde(default)]
    update: Field,
}

impl From<CanonicalRecordWire> for CanonicalRecord {
    fn from(wire: CanonicalRecordWire) -> Self {
        let updated_at = wire
            .update
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date, UPDATE_DATE_FORMAT).ok())
            .map(|date| date.and_time(NaiveTime::MIN).and_utc());
        // An unparseable date on disk degrades to Unknown, same as at canonicalization.
        let update = if updated_at.is_some() {
            wire.update
        } else {
            Field::Unknown
        };
        Self {
            repo: wire.repo,
            desc: wire.desc,
            tags: wire.tags,
            star: wire.star,
            lang: wire.lang,
            update,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoKeyError {
    #[error("\"{0}\" is not a valid repo format (expected \"owner/repo\")")]
    MissingSlash(String),
}

/// An `owner/name` repository key.
///
/// Only the presence of a slash is checked; the key is otherwise kept verbatim
/// so it compares equal to the `repo` field of canonical records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoKey(String);

impl RepoKey {
    pub fn parse(raw: impl Into<String>) -> Result<Self, RepoKeyError> {
        let raw = raw.into();
        if raw.contains('/') {
            Ok(Self(raw))
        } else {
            Err(RepoKeyError::MissingSlash(raw))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for RepoKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
