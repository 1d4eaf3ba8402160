//! The `repomerge` binary

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{read_json, repos, scrape_runs, write_json};

fn repomerge(dir: &Path, env: &[(&str, &str)], args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_repomerge"))
        .current_dir(dir)
        .env_clear()
        .env("RUST_LOG", "info")
        .envs(env.iter().copied())
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn reconcile_then_split_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = scrape_runs();
    write_json(dir.path(), "runs/1.json", &first);
    write_json(dir.path(), "runs/2.json", &second);
    let env = [
        ("MERGE_INPUT", "runs"),
        ("MERGE_OUTPUT", "merged.json"),
        ("RECONCILE_OUTPUT", "reconciled.json"),
        ("SPLIT_PREFIX", "output"),
        ("REPOMERGE_NOW", "2024-01-10T00:00:00Z"),
    ];

    for step in ["merge", "reconcile"] {
        let out = repomerge(dir.path(), &env, &[step]);
        assert!(out.status.success(), "{step}: {}", String::from_utf8_lossy(&out.stderr));
    }
    let split = repomerge(dir.path(), &env, &["split", "--budget", "1"]);
    assert!(split.status.success());

    let reconciled = read_json(&dir.path().join("reconciled.json"));
    assert_eq!(repos(&reconciled), vec!["a/b", "c/d", "spam/bot", "e/f"]);

    let stdout = String::from_utf8_lossy(&split.stdout);
    let written: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        written,
        vec!["output-01.json", "output-02.json", "output-03.json", "output-04.json"]
    );
    assert_eq!(
        read_json(&dir.path().join("output-01.json")),
        json!([{"repo": "a/b", "desc": "second pass", "tags": "cli", "star": 10, "lang": "Rust", "update": "2024-01-09"}])
    );
}

#[test]
fn logs_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    write_json(dir.path(), "in.json", &json!([{"repo": "a/b"}]));

    let out = repomerge(dir.path(), &[], &["split", "--input", "in.json", "--prefix", "part"]);

    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "part-01.json");
    assert!(String::from_utf8_lossy(&out.stderr).contains("Wrote chunk"));
}

#[test]
fn missing_input_fails_with_its_path() {
    let dir = tempfile::tempdir().unwrap();

    let out = repomerge(
        dir.path(),
        &[("RECONCILE_OUTPUT", "reconciled.json")],
        &["reconcile", "--input", "absent.json"],
    );

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("absent.json"));
    assert!(!dir.path().join("reconciled.json").exists());
}

#[test]
fn unset_output_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();

    let out = repomerge(dir.path(), &[], &["reconcile", "--input", "merged.json"]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("RECONCILE_OUTPUT"));
}

#[test]
fn zero_budget_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let out = repomerge(dir.path(), &[("TOKEN_BUDGET", "0")], &["split", "--input", "x.json"]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("TOKEN_BUDGET"));
}
