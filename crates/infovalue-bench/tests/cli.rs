use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, guesser_states: usize) -> std::path::PathBuf {
    let yaml = format!(
        r#"
run_id: "cli_check"
seed: 7
scenarios:
  - name: "baseline"
    model: 1
    states: 10
    guessing: 10
    experiments: 5
    guesser_states: {guesser_states}
    observer_states: 3
outputs:
  jsonl: "{out}/{{run_id}}/results.jsonl"
  summary_md: "{out}/{{run_id}}/summary.md"
  plots_dir: "{out}/{{run_id}}/plots"
"#,
        out = dir.display()
    );
    let path = dir.join("sweep.yaml");
    fs::write(&path, yaml).expect("write config");
    path
}

#[test]
fn validate_only_skips_execution() {
    let dir = tempdir().expect("temp dir");
    let config = write_config(dir.path(), 4);

    Command::cargo_bin("infovalue-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config)
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded configuration 'cli_check' with 1 scenario"))
        .stdout(predicate::str::contains("Validation-only mode"));

    assert!(!dir.path().join("cli_check/results.jsonl").exists());
}

#[test]
fn run_writes_outputs_under_overridden_run_id() {
    let dir = tempdir().expect("temp dir");
    let config = write_config(dir.path(), 4);

    Command::cargo_bin("infovalue-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config)
        .args(["--run-id", "override", "--experiments", "3", "--guessing", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sweep complete for 'override'"));

    let jsonl = fs::read_to_string(dir.path().join("override/results.jsonl")).expect("rows");
    let row: serde_json::Value =
        serde_json::from_str(jsonl.lines().next().expect("one row")).expect("json row");
    assert_eq!(row["experiments_amount"], 3);
    assert_eq!(row["guessing_amount"], 6);
}

#[test]
fn contradictory_message_size_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let config = write_config(dir.path(), 11);

    Command::cargo_bin("infovalue-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("scenarios[baseline].guesser_message"));
}
