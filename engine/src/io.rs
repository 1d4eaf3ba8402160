//! JSON file boundary.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use repomerge_utils::atomic_write;

use crate::error::PipelineError;

/// Output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    /// Two-space indentation, for intermediate files meant to be inspected.
    Pretty,
    /// No whitespace, so the bytes on disk are the bytes that were estimated.
    Compact,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    style: JsonStyle,
) -> Result<(), PipelineError> {
    let bytes = encode(path, value, style)?;
    write_bytes(path, &bytes)
}

pub(crate) fn encode<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    style: JsonStyle,
) -> Result<Vec<u8>, PipelineError> {
    let encoded = match style {
        JsonStyle::Pretty => serde_json::to_vec_pretty(value),
        JsonStyle::Compact => serde_json::to_vec(value),
    };
    encoded.map_err(|err| PipelineError::Write {
        path: path.to_path_buf(),
        source: err.into(),
    })
}

pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    atomic_write(path, bytes).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Short name of a JSON value's type, for shape errors.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
