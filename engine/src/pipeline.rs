//! The full pipeline: merge, reconcile, filter, split.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use repomerge_config::{ConfigError, PipelineConfig};
use repomerge_context::{TokenCounter, TokenEncoding};
use repomerge_types::TokenBudget;

use crate::error::PipelineError;
use crate::filter::{FilterSummary, filter_file, load_dirty_list};
use crate::merge::{MergeSummary, merge_files};
use crate::reconcile::{ReconcileSummary, reconcile_file};
use crate::split::{ChunkSummary, split_records};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStep {
    pub input_dir: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStep {
    pub dirty_list: PathBuf,
    pub output: PathBuf,
}

/// Every path and parameter a full run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub merge: Option<MergeStep>,
    pub reconcile_input: PathBuf,
    pub reconcile_output: PathBuf,
    pub filter: Option<FilterStep>,
    pub split_prefix: PathBuf,
    pub budget: TokenBudget,
    pub encoding: TokenEncoding,
}

impl RunPlan {
    /// Derive a plan from resolved configuration.
    ///
    /// Merging runs only when a merge input directory is configured, and
    /// filtering only when a dirty list is.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let merge = match config.merge_input.as_deref() {
            Some(input_dir) => Some(MergeStep {
                input_dir: input_dir.to_path_buf(),
                output: config.merge_output()?.to_path_buf(),
            }),
            None => None,
        };
        let filter = match config.dirty_list.as_deref() {
            Some(dirty_list) => Some(FilterStep {
                dirty_list: dirty_list.to_path_buf(),
                output: config.filtered_output()?.to_path_buf(),
            }),
            None => None,
        };

        Ok(Self {
            merge,
            reconcile_input: config.reconcile_input()?.to_path_buf(),
            reconcile_output: config.reconcile_output()?.to_path_buf(),
            filter,
            split_prefix: config.split_prefix().to_path_buf(),
            budget: config.token_budget,
            encoding: config.token_encoding,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub merge: Option<MergeSummary>,
    pub reconcile: ReconcileSummary,
    pub filter: Option<FilterSummary>,
    pub chunks: Vec<ChunkSummary>,
}

/// Execute `plan` with `now` as the reference instant for relative dates.
pub fn run(plan: &RunPlan, now: DateTime<Utc>) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::default();

    if let Some(step) = &plan.merge {
        summary.merge = Some(merge_files(&step.input_dir, &step.output)?);
    }

    let (records, reconciled) =
        reconcile_file(&plan.reconcile_input, &plan.reconcile_output, now)?;
    summary.reconcile = reconciled;

    let counter = TokenCounter::with_encoding(plan.encoding);
    let (count, chunks) = match &plan.filter {
        Some(step) => {
            let dirty = load_dirty_list(&step.dirty_list)?;
            let (kept, filtered) = filter_file(&plan.reconcile_output, &dirty, &step.output)?;
            summary.filter = Some(filtered);
            let chunks = split_records(&kept, &plan.split_prefix, plan.budget, &counter)?;
            (kept.len(), chunks)
        }
        None => {
            let chunks = split_records(&records, &plan.split_prefix, plan.budget, &counter)?;
            (records.len(), chunks)
        }
    };
    summary.chunks = chunks;

    tracing::info!(
        records = count,
        chunks = summary.chunks.len(),
        encoding = %plan.encoding,
        "Pipeline complete"
    );
    Ok(summary)
}
