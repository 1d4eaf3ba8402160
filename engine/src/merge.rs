//! Concatenate every scrape-run file in a directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::PipelineError;
use crate::io::{JsonStyle, read_json, write_json};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub records: usize,
}

/// Read all `*.json` files in `dir` in file-name order and flatten them.
///
/// A file holding an array contributes its elements; any other value is
/// contributed as a single entry.
pub fn merge_dir(dir: &Path) -> Result<(Vec<Value>, MergeSummary), PipelineError> {
    let list_err = |source| PipelineError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    let mut merged = Vec::new();
    for path in &files {
        match read_json::<Value>(path)? {
            Value::Array(items) => {
                tracing::debug!(path = %path.display(), count = items.len(), "Merging file");
                merged.extend(items);
            }
            other => merged.push(other),
        }
    }

    let summary = MergeSummary {
        files: files.len(),
        records: merged.len(),
    };
    Ok((merged, summary))
}

/// Merge `dir` into a single pretty-printed array at `output`.
pub fn merge_files(dir: &Path, output: &Path) -> Result<MergeSummary, PipelineError> {
    let (merged, summary) = merge_dir(dir)?;
    if summary.files == 0 {
        tracing::warn!(dir = %dir.display(), "No JSON files to merge");
    }
    write_json(output, &merged, JsonStyle::Pretty)?;

    tracing::info!(
        files = summary.files,
        records = summary.records,
        output = %output.display(),
        "Merged scrape runs"
    );
    Ok(summary)
}
