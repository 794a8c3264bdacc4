use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

// Two-channel device, short test window, fast simulator.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[device]
channels = 2
read_timeout_ms = 5

[session]
duration_ms = 200

[plot]
refresh_ms = 50

[simulator]
rate_hz = 200
amplitude = 30.0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn mobility(cfg: &Path, store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mobility").unwrap();
    cmd.arg("--config")
        .arg(cfg)
        .arg("--store")
        .arg(store)
        .arg("--log-level")
        .arg("error");
    cmd
}

// Baseline then a constant deviation of (3, -4): score 7.0 whichever line
// happens to cross the window.
fn write_capture(dir: &tempfile::TempDir, lines: usize) -> PathBuf {
    let path = dir.path().join("capture.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "0.0,0.0").unwrap();
    for _ in 0..lines {
        writeln!(f, "3.0,-4.0").unwrap();
    }
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["joints"], 0, "Left Ankle", "stdout")]
#[case(&["joints"], 0, "right-elbow", "stdout")]
#[case(&["history"], 0, "No results recorded yet.", "stdout")]
#[case(&["best", "--joint", "left-elbow"], 0, "No results recorded for Left Elbow.", "stdout")]
#[case(&["best"], 2, "required", "stderr")]
#[case(&["history", "--joint", "left-knee"], 2, "unknown joint", "stderr")]
#[case(&["self-check"], 0, "OK", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("results.json");

    let mut cmd = mobility(&cfg, &store);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn missing_config_file_means_defaults() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("results.json");
    mobility(&dir.path().join("absent.toml"), &store)
        .arg("joints")
        .assert()
        .success();
}

#[rstest]
fn simulated_test_runs_to_completion_and_is_saved() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("data").join("results.json");

    mobility(&cfg, &store)
        .args(["run", "--test", "left-ankle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Left Ankle test complete"))
        .stdout(predicate::str::contains("best score:"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&store).unwrap()).unwrap();
    let records = saved.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["test_identifier"], "Left Ankle");
    assert_eq!(records[0]["max_difference"].as_array().unwrap().len(), 2);

    mobility(&cfg, &store)
        .args(["history", "--joint", "Left Ankle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Left Ankle"));
}

#[rstest]
fn replayed_test_scores_the_recorded_deviation() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("results.json");
    let capture = write_capture(&dir, 400);

    mobility(&cfg, &store)
        .arg("run")
        .arg("--test")
        .arg("right-elbow")
        .arg("--replay")
        .arg(&capture)
        .assert()
        .success()
        .stdout(predicate::str::contains("score:          7.0"))
        .stdout(predicate::str::contains("[3.0, 4.0]"));

    mobility(&cfg, &store)
        .args(["best", "--joint", "right-elbow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best Right Elbow score: 7.0"));
}

#[rstest]
fn replay_shorter_than_the_window_fails() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("results.json");
    let capture = write_capture(&dir, 3);

    mobility(&cfg, &store)
        .arg("run")
        .arg("--test")
        .arg("left-ankle")
        .arg("--replay")
        .arg(&capture)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("ended before the test completed"));
    assert!(!store.exists());
}

#[rstest]
fn monitor_without_test_stops_at_line_limit() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("results.json");

    mobility(&cfg, &store)
        .args(["run", "--max-lines", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stream stopped after 20 lines"));
}

#[rstest]
fn line_limit_during_test_is_an_error() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("results.json");

    mobility(&cfg, &store)
        .args(["run", "--test", "left-elbow", "--max-lines", "3"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("--max-lines"));
}

#[rstest]
fn invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[device]\nchannels = 0\n").unwrap();

    mobility(&cfg, &dir.path().join("results.json"))
        .arg("joints")
        .assert()
        .failure()
        .stderr(predicate::str::contains("device.channels"));
}

#[rstest]
fn corrupt_results_file_has_its_own_exit_code() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("results.json");
    fs::write(&store, "{ not json").unwrap();

    mobility(&cfg, &store)
        .arg("history")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("could not be read"));
    // Never replaced with an empty history.
    assert_eq!(fs::read_to_string(&store).unwrap(), "{ not json");
}

#[rstest]
fn export_writes_csv_per_joint() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let store = dir.path().join("results.json");
    fs::write(
        &store,
        r#"[
  {"test_identifier":"Left Ankle","timestamp":"2024-06-01T10:00:00Z","score":7.0,"max_difference":[3.0,4.0]},
  ["Right Elbow","2024-06-02T10:00:00Z",1.5,[1.0,0.5]]
]
"#,
    )
    .unwrap();
    let out = dir.path().join("export");

    mobility(&cfg, &store)
        .arg("export")
        .arg("--dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("previous_results_left-ankle.csv"));

    let ankle = fs::read_to_string(out.join("previous_results_left-ankle.csv")).unwrap();
    assert_eq!(ankle, "timestamp,score,ch1,ch2\n2024-06-01T10:00:00Z,7.0,3.0,4.0\n");
    let elbow = fs::read_to_string(out.join("previous_results_right-elbow.csv")).unwrap();
    assert!(elbow.contains("2024-06-02T10:00:00Z,1.5,1.0,0.5"));
    assert!(!out.join("previous_results_left-elbow.csv").exists());
}
