//! Canonicalize and deduplicate a merged scrape file.

use std::path::Path;

use chrono::{DateTime, Utc};

use repomerge_core::{ReconcileStats, Reconciler, canonicalize};
use repomerge_types::{CanonicalRecord, RawRecord};

use crate::error::PipelineError;
use crate::io::{JsonStyle, read_json, write_json};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub stats: ReconcileStats,
    /// Raw records dropped for lacking a `repo` key.
    pub skipped: usize,
}

/// Canonicalize every raw record against `now`, then reconcile.
pub fn reconcile_raw(
    raw: impl IntoIterator<Item = RawRecord>,
    now: DateTime<Utc>,
) -> (Vec<CanonicalRecord>, ReconcileSummary) {
    let mut reconciler = Reconciler::new();
    let mut skipped = 0;

    for (position, record) in raw.into_iter().enumerate() {
        match canonicalize(&record, now) {
            Ok(canonical) => reconciler.push(canonical),
            Err(err) => {
                skipped += 1;
                tracing::warn!(position, "Skipping record: {err}");
            }
        }
    }

    let (records, stats) = reconciler.finish();
    (records, ReconcileSummary { stats, skipped })
}

/// Reconcile the JSON array at `input` into a pretty-printed array at `output`.
pub fn reconcile_file(
    input: &Path,
    output: &Path,
    now: DateTime<Utc>,
) -> Result<(Vec<CanonicalRecord>, ReconcileSummary), PipelineError> {
    let raw: Vec<RawRecord> = read_json(input)?;
    let (records, summary) = reconcile_raw(raw, now);
    write_json(output, &records, JsonStyle::Pretty)?;

    tracing::info!(
        input = summary.stats.input + summary.skipped,
        unique = summary.stats.unique,
        duplicates_removed = summary.stats.duplicates_removed(),
        replaced = summary.stats.replaced,
        skipped = summary.skipped,
        output = %output.display(),
        "Reconciled records"
    );
    Ok((records, summary))
}
