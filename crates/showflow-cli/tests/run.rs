use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_run_shows_splash_and_quits() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("showflow")
        .env("SHOWFLOW_HOME", dir.path())
        .arg("run")
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("splash"));
}

#[test]
fn test_run_reports_unknown_actions() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("showflow")
        .env("SHOWFLOW_HOME", dir.path())
        .arg("run")
        .write_stdin("explode\nquit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown action 'explode'"));
}

#[test]
fn test_run_json_output() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("showflow")
        .env("SHOWFLOW_HOME", dir.path())
        .args(["run", "--format", "json"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"surface\":\"splash\""));
}
