use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("cinevaultctl");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("decide"))
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn simulate_help_mentions_options() {
    let mut cmd = cargo_bin_cmd!("cinevaultctl");
    let output = cmd
        .arg("simulate")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("--scenario"), "simulate help missing --scenario");
    assert!(text.contains("--prompts"), "simulate help missing --prompts");
    assert!(text.contains("--web"), "simulate help missing --web");
}

#[test]
fn decide_prints_every_combination() {
    let mut cmd = cargo_bin_cmd!("cinevaultctl");
    let output = cmd
        .arg("decide")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    assert_eq!(rows.len(), 32);
    let challenges = rows
        .iter()
        .filter(|row| row["decision"] == "biometric-challenge")
        .count();
    assert_eq!(challenges, 1);
}

#[test]
fn config_check_rejects_zero_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cinevault.toml");
    std::fs::write(&path, "[biometric]\nmax_attempts = 0\n").unwrap();

    let mut cmd = cargo_bin_cmd!("cinevaultctl");
    cmd.arg("--config")
        .arg(&path)
        .arg("config")
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration is invalid"));
}

#[test]
fn simulate_biometric_walkthrough_unlocks() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("cinevaultctl");
    cmd.current_dir(dir.path())
        .env_remove("CINEVAULT_CONFIG_PATH")
        .args(["simulate", "--scenario", "biometric", "--prompts", "denied,success"])
        .assert()
        .success()
        .stdout(predicate::str::contains("biometric-challenge"))
        .stdout(predicate::str::contains("challenge passed"))
        .stdout(predicate::str::contains("capture blocked by platform"));
}

#[test]
fn catalog_search_filters_by_kind() {
    let mut cmd = cargo_bin_cmd!("cinevaultctl");
    cmd.args(["catalog", "--kind", "series", "--genre", "comedy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kitchen Brigade"))
        .stdout(predicate::str::contains("Harbor Lights").not());
}
