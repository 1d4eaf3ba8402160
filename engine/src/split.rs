//! Split a corpus into token-bounded chunk files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use repomerge_config::DEFAULT_SPLIT_PREFIX;
use repomerge_context::{TokenCounter, pack};
use repomerge_types::{TokenBudget, chunk_file_name};

use crate::error::PipelineError;
use crate::io::{JsonStyle, encode, kind, read_json, write_bytes};

/// One written chunk file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub path: PathBuf,
    pub items: usize,
    /// Sum of the per-item estimates.
    pub tokens: u64,
}

/// Path of the `index`-th chunk (1-based) for `prefix`.
///
/// `chunks/output` yields `chunks/output-01.json`, `chunks/output-02.json`, ...
#[must_use]
pub fn chunk_path(prefix: &Path, index: usize) -> PathBuf {
    match prefix.file_name() {
        Some(stem) => prefix.with_file_name(chunk_file_name(&stem.to_string_lossy(), index)),
        None => prefix.join(chunk_file_name(DEFAULT_SPLIT_PREFIX, index)),
    }
}

/// A packed slice of an array or object, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitChunk {
    /// An array of elements or an object of entries, matching the input shape.
    pub body: Value,
    pub items: usize,
    pub tokens: u64,
}

/// Pack a JSON array or object into chunk bodies of the same shape.
///
/// Array elements are estimated as-is. Object entries are estimated as
/// `[key, value]` pairs and re-assembled into objects. Any other value is
/// rejected with its kind.
pub fn split_value(
    value: Value,
    budget: TokenBudget,
    counter: &TokenCounter,
) -> Result<Vec<SplitChunk>, &'static str> {
    match value {
        Value::Array(items) => Ok(pack(items, budget, counter)
            .into_iter()
            .map(|chunk| SplitChunk {
                items: chunk.len(),
                tokens: chunk.token_count(),
                body: Value::Array(chunk.into_items()),
            })
            .collect()),
        Value::Object(entries) => Ok(pack(entries, budget, counter)
            .into_iter()
            .map(|chunk| SplitChunk {
                items: chunk.len(),
                tokens: chunk.token_count(),
                body: Value::Object(chunk.into_items().into_iter().collect::<Map<_, _>>()),
            })
            .collect()),
        other => Err(kind(&other)),
    }
}

/// Split the JSON array or object at `input` into compact chunk files.
pub fn split_file(
    input: &Path,
    prefix: &Path,
    budget: TokenBudget,
    counter: &TokenCounter,
) -> Result<Vec<ChunkSummary>, PipelineError> {
    let value: Value = read_json(input)?;
    let chunks = split_value(value, budget, counter).map_err(|found| PipelineError::Shape {
        path: input.to_path_buf(),
        expected: "a JSON array or object",
        found,
    })?;

    let rendered = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| render(chunk_path(prefix, i + 1), &chunk.body, chunk.items, chunk.tokens))
        .collect::<Result<Vec<_>, _>>()?;

    write_all(input, rendered, budget)
}

/// Split in-memory records into compact chunk files.
pub fn split_records<T: Serialize>(
    records: &[T],
    prefix: &Path,
    budget: TokenBudget,
    counter: &TokenCounter,
) -> Result<Vec<ChunkSummary>, PipelineError> {
    let chunks = pack(records.iter(), budget, counter);
    let rendered = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            render(
                chunk_path(prefix, i + 1),
                chunk.items(),
                chunk.len(),
                chunk.token_count(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    write_all(prefix, rendered, budget)
}

struct Rendered {
    path: PathBuf,
    bytes: Vec<u8>,
    items: usize,
    tokens: u64,
}

fn render<T: Serialize + ?Sized>(
    path: PathBuf,
    body: &T,
    items: usize,
    tokens: u64,
) -> Result<Rendered, PipelineError> {
    let bytes = encode(&path, body, JsonStyle::Compact)?;
    Ok(Rendered {
        path,
        bytes,
        items,
        tokens,
    })
}

// Everything is encoded before the first file is touched.
fn write_all(
    source: &Path,
    rendered: Vec<Rendered>,
    budget: TokenBudget,
) -> Result<Vec<ChunkSummary>, PipelineError> {
    if rendered.is_empty() {
        tracing::info!(source = %source.display(), "Nothing to split");
        return Ok(Vec::new());
    }

    let mut written = Vec::with_capacity(rendered.len());
    for chunk in rendered {
        write_bytes(&chunk.path, &chunk.bytes)?;
        tracing::info!(
            path = %chunk.path.display(),
            items = chunk.items,
            tokens = chunk.tokens,
            "Wrote chunk"
        );
        written.push(ChunkSummary {
            path: chunk.path,
            items: chunk.items,
            tokens: chunk.tokens,
        });
    }

    tracing::info!(
        chunks = written.len(),
        budget = budget.as_u32(),
        "Split into chunks"
    );
    Ok(written)
}
