//! Integration tests for the Tankobon CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;

/// Create a chapter archive with the given page names
fn create_test_cbz(dir: &Path, name: &str, pages: &[&str]) {
    let mut output = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(Cursor::new(&mut output));
        let options = zip::write::FileOptions::default();
        for page in pages {
            writer.start_file(*page, options).unwrap();
            writer.write_all(page.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    fs::write(dir.join(name), output).expect("Failed to write test archive");
}

/// Library with one series of `chapters` two-page chapters and a config file
fn create_test_library(series: &str, chapters: usize, config: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let series_dir = temp_dir.path().join(series);
    fs::create_dir_all(&series_dir).unwrap();
    for i in 1..=chapters {
        create_test_cbz(&series_dir, &format!("chap{:02}.cbz", i), &["1.jpg", "2.jpg"]);
    }
    fs::write(temp_dir.path().join("to_refactor.csv"), config).unwrap();
    temp_dir
}

fn cbz_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.ends_with(".cbz"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tankobon"));
}

#[test]
fn test_run_help() {
    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge chapters into volumes"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--no-log-file"));
}

#[test]
fn test_run_missing_directory_argument() {
    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_run_nonexistent_directory() {
    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["run", "/nonexistent/library"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid directory"));
}

#[test]
fn test_run_missing_config() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["run", "--no-log-file", temp_dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("to_refactor.csv"));
}

#[test]
fn test_run_merges_volumes() {
    let library = create_test_library("Berserk", 5, "Berserk,2,false\n");
    let series_dir = library.path().join("Berserk");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["run", library.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Volumes created: 2"));

    // 5 chapters by 2 with leftovers merged: 3 + 2
    assert_eq!(cbz_names(&series_dir), vec!["Berserk V001.cbz", "Berserk V002.cbz"]);

    let file = fs::File::open(series_dir.join("Berserk V001.cbz")).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 6);

    // A timestamped log file is written next to the series
    let has_log = fs::read_dir(library.path())
        .unwrap()
        .any(|e| e.unwrap().file_name().to_string_lossy().starts_with("tankobon_"));
    assert!(has_log, "Log file should exist");
}

#[test]
fn test_run_json_summary() {
    let library = create_test_library("Monster", 3, "Monster,2,true,true,false\n");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    let output = cmd
        .args(["run", "--json", "--no-log-file", library.path().to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json["processed"][0]["series"], "Monster");
    assert_eq!(json["processed"][0]["leftovers"][0], "chap03.cbz");
    assert_eq!(json["processed"][0]["volumes"][0]["pages"], 4);

    // Originals kept, leftover untouched
    assert_eq!(
        cbz_names(&library.path().join("Monster")),
        vec!["Monster V001.cbz", "chap01.cbz", "chap02.cbz", "chap03.cbz"]
    );
}

#[test]
fn test_run_failed_series_exits_nonzero() {
    let library = create_test_library("Pluto", 2, "Missing,2\nPluto,2\n");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["run", "--no-log-file", library.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed series:   1"));

    // The failing series did not stop the next one
    assert_eq!(cbz_names(&library.path().join("Pluto")), vec!["Pluto V001.cbz"]);
}

#[test]
fn test_plan_does_not_touch_files() {
    let library = create_test_library("Akira", 4, "Akira,\"1,2\"\n");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["plan", library.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("V001 <- chap01.cbz"))
        .stdout(predicate::str::contains("V002 <- chap02.cbz .. chap03.cbz"))
        .stdout(predicate::str::contains("Leftovers:        chap04.cbz"));

    assert_eq!(cbz_names(&library.path().join("Akira")).len(), 4);
}

#[test]
fn test_plan_json_output() {
    let library = create_test_library("Akira", 4, "Akira,2\n");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    let output = cmd
        .args(["plan", "--json", library.path().to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(json[0]["series"], "Akira");
    assert_eq!(json[0]["preview"]["volumes"][1]["volume"], 2);
    assert_eq!(json[0]["preview"]["config"]["batch"]["mode"], "repeating");
}

#[test]
fn test_validate_valid_config() {
    let library = create_test_library("Akira", 1, "Akira,2\nDororo,\"3,4\",yes,no\n");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["validate", library.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid configuration"));
}

#[test]
fn test_validate_invalid_rows() {
    let library = create_test_library("Akira", 1, "Akira,two\nDororo,3,perhaps\n");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["validate", library.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Rejected: 1"))
        .stdout(predicate::str::contains("Defaulted: 1"));
}

#[test]
fn test_verbose_flag() {
    let library = create_test_library("Akira", 2, "Akira,2\n");

    let mut cmd = Command::cargo_bin("tankobon-cli").unwrap();
    cmd.args(["--verbose", "plan", library.path().to_str().unwrap()])
        .assert()
        .success();
}
