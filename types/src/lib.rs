//! Core domain types for repomerge.
//!
//! This crate contains pure domain types with no IO and minimal dependencies.
//! Everything here can be used from any layer of the pipeline.

#![allow(clippy::missing_errors_doc)]

mod budget;
mod chunk;
mod field;
mod record;

pub use budget::{TokenBudget, TokenBudgetError};
pub use chunk::{Chunk, chunk_file_name};
pub use field::{Field, PLACEHOLDER};
pub use record::{CanonicalRecord, RawRecord, RepoKey, RepoKeyError, UPDATE_DATE_FORMAT};
