//! Command-line behaviour of both binaries.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn injector() -> Command {
    Command::cargo_bin("create-h0-template").unwrap()
}

#[test]
fn help_lists_templates() {
    injector()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("listPage"))
        .stdout(predicate::str::contains("headLineList"))
        .stdout(predicate::str::contains("issues"));
}

#[test]
fn missing_template_name_fails() {
    let tmp = TempDir::new().unwrap();
    injector()
        .current_dir(tmp.path())
        .arg("orderList")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please specify the"));
}

#[test]
fn unsupported_template_fails() {
    let tmp = TempDir::new().unwrap();
    injector()
        .current_dir(tmp.path())
        .args(["orderList", "gridPage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("listPage, filterList, headLineList"));
}

#[test]
fn unknown_options_are_ignored() {
    let tmp = TempDir::new().unwrap();
    // still fails, but on the project layout rather than on `--frobnicate`
    injector()
        .current_dir(tmp.path())
        .args(["orderList", "listPage", "--frobnicate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("directory structure is not right"));
}

#[test]
fn template_root_can_be_overridden() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("src/pages")).unwrap();
    injector()
        .current_dir(tmp.path())
        .env("H0_TEMPLATE_ROOT", tmp.path().join("nowhere"))
        .args(["orderList", "listPage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not locate supplied template"));
    assert!(!tmp.path().join("src/pages/OrderList").exists());
}

#[test]
fn create_app_needs_a_directory() {
    Command::cargo_bin("create-app")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please specify the project directory"));
}

#[test]
fn create_app_rejects_reserved_names() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("create-app")
        .unwrap()
        .current_dir(tmp.path())
        .arg("react")
        .assert()
        .failure()
        .stderr(predicate::str::contains("react"));
    assert!(!tmp.path().join("react").exists());
}
