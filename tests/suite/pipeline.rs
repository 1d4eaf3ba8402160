//! End-to-end runs through the engine

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;

use repomerge_config::{FileConfig, PipelineConfig};
use repomerge_engine::{PipelineError, RunPlan, TokenBudget, run};

use crate::common::{now, read_json, repos, scrape_runs, write_json};

fn plan_for(dir: &Path, budget: u32) -> RunPlan {
    let config = PipelineConfig {
        merge_input: Some(dir.join("runs")),
        merge_output: Some(dir.join("merged.json")),
        reconcile_output: Some(dir.join("reconciled.json")),
        dirty_list: Some(dir.join("dirty.json")),
        filtered_output: Some(dir.join("filtered.json")),
        split_prefix: Some(dir.join("chunks").join("output")),
        token_budget: TokenBudget::new(budget).unwrap(),
        ..PipelineConfig::default()
    };
    RunPlan::from_config(&config).unwrap()
}

#[test]
fn scrape_runs_become_deduplicated_filtered_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = scrape_runs();
    write_json(dir.path(), "runs/page-1.json", &first);
    write_json(dir.path(), "runs/page-2.json", &second);
    write_json(dir.path(), "dirty.json", &json!(["spam/bot", "not-a-repo"]));

    let summary = run(&plan_for(dir.path(), 15_000), now()).unwrap();

    assert_eq!(summary.merge.unwrap().records, 7);
    assert_eq!(summary.reconcile.skipped, 1);
    assert_eq!(summary.reconcile.stats.unique, 4);
    assert_eq!(summary.reconcile.stats.duplicates_removed(), 2);
    let filter = summary.filter.unwrap();
    assert_eq!((filter.kept, filter.dropped(), filter.rejected_entries), (3, 1, 1));

    let reconciled = read_json(&dir.path().join("reconciled.json"));
    assert_eq!(repos(&reconciled), vec!["a/b", "c/d", "spam/bot", "e/f"]);

    let filtered = read_json(&dir.path().join("filtered.json"));
    assert_eq!(
        filtered,
        json!([
            {"repo": "a/b", "desc": "second pass", "tags": "cli", "star": 10, "lang": "Rust", "update": "2024-01-09"},
            {"repo": "c/d", "desc": "null", "tags": "null", "star": 2345, "lang": "Go", "update": "2024-01-03"},
            {"repo": "e/f", "desc": "null", "tags": "null", "star": 0, "lang": "null", "update": "null"}
        ])
    );

    assert_eq!(summary.chunks.len(), 1);
    assert_eq!(read_json(&summary.chunks[0].path), filtered);
}

#[test]
fn tight_budget_spreads_records_across_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = scrape_runs();
    write_json(dir.path(), "runs/page-1.json", &first);
    write_json(dir.path(), "runs/page-2.json", &second);
    write_json(dir.path(), "dirty.json", &json!([]));

    let summary = run(&plan_for(dir.path(), 1), now()).unwrap();

    let names: Vec<String> = summary
        .chunks
        .iter()
        .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["output-01.json", "output-02.json", "output-03.json", "output-04.json"]
    );
    for chunk in &summary.chunks {
        assert_eq!(chunk.items, 1);
        let text = fs::read_to_string(&chunk.path).unwrap();
        assert_eq!(text, serde_json::to_string(&read_json(&chunk.path)).unwrap());
    }
}

#[test]
fn malformed_merged_input_aborts_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("runs")).unwrap();
    fs::write(dir.path().join("runs").join("page-1.json"), "[{\"repo\": \"a/b\",").unwrap();
    write_json(dir.path(), "dirty.json", &json!([]));

    let err = run(&plan_for(dir.path(), 15_000), now()).unwrap_err();

    assert!(matches!(err, PipelineError::Parse { .. }));
    assert!(err.to_string().contains("page-1.json"));
    assert!(!dir.path().join("merged.json").exists());
    assert!(!dir.path().join("reconciled.json").exists());
    assert!(!dir.path().join("chunks").exists());
}

#[test]
fn config_file_drives_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let (first, _) = scrape_runs();
    write_json(dir.path(), "merged.json", &first);
    let config_path = dir.path().join("repomerge.toml");
    fs::write(
        &config_path,
        r#"
now = "2024-01-10T00:00:00Z"

[paths]
merge_output = "merged.json"
reconcile_output = "reconciled.json"
split_prefix = "out/part"

[split]
encoding = "o200k_base"
"#,
    )
    .unwrap();

    let file = FileConfig::load_from(&config_path).unwrap();
    let config = PipelineConfig::from_sources(Some((config_path, file)), |_| None).unwrap();
    let plan = RunPlan::from_config(&config).unwrap();
    let summary = run(&plan, config.now.unwrap()).unwrap();

    assert!(plan.merge.is_none());
    assert_eq!(summary.reconcile.stats.unique, 3);
    assert_eq!(summary.chunks[0].path, dir.path().join("out").join("part-01.json"));
}
