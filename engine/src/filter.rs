//! Drop dirty-listed repositories from a corpus file.

use std::path::Path;

use serde_json::Value;

use repomerge_core::{DirtyList, filter_records};

use crate::error::PipelineError;
use crate::io::{JsonStyle, kind, read_json, write_json};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub input: usize,
    pub kept: usize,
    /// Dirty-list entries ignored for not being `owner/name` strings.
    pub rejected_entries: usize,
}

impl FilterSummary {
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.input - self.kept
    }
}

/// Load a dirty list: a JSON array of `owner/name` strings.
///
/// Malformed entries are logged and skipped.
pub fn load_dirty_list(path: &Path) -> Result<DirtyList, PipelineError> {
    let entries: Vec<Value> = read_json(path)?;

    let mut names = Vec::with_capacity(entries.len());
    let mut non_strings = 0;
    for entry in entries {
        match entry {
            Value::String(name) => names.push(name),
            other => {
                non_strings += 1;
                tracing::warn!(path = %path.display(), "Skipping dirty-list entry: {}", kind(&other));
            }
        }
    }

    let dirty = DirtyList::from_entries(names);
    for rejected in dirty.rejected() {
        tracing::warn!(path = %path.display(), "Skipping dirty-list entry: {rejected}");
    }
    if non_strings > 0 || !dirty.rejected().is_empty() {
        tracing::warn!(
            skipped = non_strings + dirty.rejected().len(),
            "Dirty list contains malformed entries"
        );
    }
    Ok(dirty)
}

/// Filter the JSON array at `input` against `dirty`, writing the survivors
/// to `output` unchanged.
///
/// Entries are matched on their `repo` string, so reconciled, merged, and
/// raw scrape files all filter the same way.
pub fn filter_file(
    input: &Path,
    dirty: &DirtyList,
    output: &Path,
) -> Result<(Vec<Value>, FilterSummary), PipelineError> {
    let records: Vec<Value> = read_json(input)?;
    let input_count = records.len();
    let kept = filter_records(records, dirty);
    write_json(output, &kept, JsonStyle::Pretty)?;

    let summary = FilterSummary {
        input: input_count,
        kept: kept.len(),
        rejected_entries: dirty.rejected().len(),
    };
    tracing::info!(
        input = summary.input,
        kept = summary.kept,
        dropped = summary.dropped(),
        output = %output.display(),
        "Filtered dirty repositories"
    );
    Ok((kept, summary))
}
