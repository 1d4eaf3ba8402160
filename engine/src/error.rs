use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A fatal stage failure. Every variant names the file it concerns.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unexpected JSON in {}: expected {expected}, found {found}", path.display())]
    Shape {
        path: PathBuf,
        expected: &'static str,
        found: &'static str,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to list {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

impl PipelineError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            PipelineError::Read { path, .. }
            | PipelineError::Parse { path, .. }
            | PipelineError::Shape { path, .. }
            | PipelineError::Write { path, .. }
            | PipelineError::ReadDir { path, .. } => path,
        }
    }
}
