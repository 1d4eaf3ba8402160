//! Pipeline stages for repomerge.
//!
//! Each stage reads its input file(s) fully, runs the pure core over the
//! parsed data, and writes its output atomically. A stage that fails leaves
//! no partial output behind.
//!
//! ```text
//! merge_dir ──▶ reconcile_file ──▶ filter_file ──▶ split_file
//!   *.json        canonicalize        dirty list      <prefix>-NN.json
//!                 + Reconciler
//! ```
//!
//! [`run`] chains the stages according to a [`RunPlan`].

mod error;
mod filter;
mod io;
mod merge;
mod pipeline;
mod reconcile;
mod split;

pub use error::PipelineError;
pub use filter::{FilterSummary, filter_file, load_dirty_list};
pub use io::{JsonStyle, read_json, write_json};
pub use merge::{MergeSummary, merge_dir, merge_files};
pub use pipeline::{FilterStep, MergeStep, RunPlan, RunSummary, run};
pub use reconcile::{ReconcileSummary, reconcile_file, reconcile_raw};
pub use split::{ChunkSummary, SplitChunk, chunk_path, split_file, split_records, split_value};

pub use repomerge_context::{TokenCounter, TokenEncoding};
pub use repomerge_types::TokenBudget;
