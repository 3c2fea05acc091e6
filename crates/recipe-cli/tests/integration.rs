use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MASTER: &str = "{\n    \"切\": 60,\n    \"煮\": 600\n}";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn init_project(dir: &TempDir) {
    write(dir.path(), "action_time/orangepage/action_time.json", r#"{"cut": 30}"#);
    write(dir.path(), "action_time/orangepage/action_time_master.json", MASTER);
}

fn recipe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("recipe").unwrap();
    cmd.arg("--root").arg(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("recipe")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("tag"))
        .stdout(predicate::str::contains("params"));
}

#[test]
fn params_show_prints_table() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recipe(&dir)
        .args(["params", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ACTION"))
        .stdout(predicate::str::contains("cut"))
        .stdout(predicate::str::contains("30"));
}

#[test]
fn params_show_json() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let out = recipe(&dir)
        .args(["-j", "params", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let records: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(records, serde_json::json!([{ "action": "cut", "time": 30 }]));
}

#[test]
fn params_reset_restores_master_bytes() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    recipe(&dir).args(["params", "reset"]).assert().success();
    let current =
        std::fs::read_to_string(dir.path().join("action_time/orangepage/action_time.json")).unwrap();
    assert_eq!(current, MASTER);
}

#[test]
fn params_show_without_table_fails() {
    let dir = TempDir::new().unwrap();
    recipe(&dir)
        .args(["params", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn params_honor_configured_paths() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "recipe.yaml",
        "data:\n  action_time: params/current.json\n  action_time_master: params/master.json\n",
    );
    write(dir.path(), "params/current.json", r#"{"混ぜ": 15}"#);
    recipe(&dir)
        .args(["params", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("混ぜ"));
}

#[test]
fn tag_without_kytea_reports_missing_binary() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "recipe.yaml",
        "tagger:\n  binary: kytea-binary-that-does-not-exist\n",
    );
    recipe(&dir)
        .args(["tag", "玉ねぎを切る"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tagger binary not found"));
}
