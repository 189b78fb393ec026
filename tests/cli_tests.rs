//! Binary integration tests for `sheetbridge` and `sheetbridge-server`

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_workbook(dir: &Path) -> PathBuf {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Data").unwrap();
    sheet.write_string(0, 0, "A1").unwrap();
    sheet.write_string(0, 1, "B1").unwrap();
    sheet.write_string(1, 0, "A2").unwrap();
    sheet.write_number(1, 1, 7.0).unwrap();
    workbook.add_worksheet().set_name("Other").unwrap();

    let path = dir.join("book.xlsx");
    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("from-csv"));
}

#[test]
fn test_server_help() {
    let mut cmd = Command::cargo_bin("sheetbridge-server").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SheetBridge API Server"));
}

#[test]
fn test_server_version() {
    let mut cmd = Command::cargo_bin("sheetbridge-server").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEETS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sheets_command() {
    let dir = TempDir::new().unwrap();
    let book = write_workbook(dir.path());

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("sheets")
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("Data"))
        .stdout(predicate::str::contains("Other"))
        .stdout(predicate::str::contains("Total: 2"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXTRACT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_extract_json_to_stdout() {
    let dir = TempDir::new().unwrap();
    let book = write_workbook(dir.path());

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    let output = cmd
        .args(["extract"])
        .arg(&book)
        .args(["--range", "A1:B1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"rows": 2, "cols": 2, "items": [["A1", "B1"], ["A2", "7.0"]]})
    );
}

#[test]
fn test_extract_csv_to_file() {
    let dir = TempDir::new().unwrap();
    let book = write_workbook(dir.path());
    let out = dir.path().join("out.csv");

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("extract")
        .arg(&book)
        .args(["--range", "A1:A2", "--orientation", "landscape", "--format", "csv"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(out).unwrap(),
        "\"A1\",\"B1\"\n\"A2\",\"7.0\"\n"
    );
}

#[test]
fn test_extract_invalid_range_fails() {
    let dir = TempDir::new().unwrap();
    let book = write_workbook(dir.path());

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("extract")
        .arg(&book)
        .args(["--range", "C1:A1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("The sheet range expression is not valid"));
}

#[test]
fn test_extract_unknown_orientation_fails() {
    let dir = TempDir::new().unwrap();
    let book = write_workbook(dir.path());

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("extract")
        .arg(&book)
        .args(["--range", "A1:B1", "--orientation", "diagonal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("diagonal"));
}

#[test]
fn test_extract_unknown_sheet_fails() {
    let dir = TempDir::new().unwrap();
    let book = write_workbook(dir.path());

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("extract")
        .arg(&book)
        .args(["--range", "A1:B1", "--sheet", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("The following sheet doesn't exist: Nope"));
}

// ═══════════════════════════════════════════════════════════════════════════
// FROM-CSV AND DOCX
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_from_csv_default_output() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("orders.csv");
    fs::write(&csv, "id,item\n1,pen\n").unwrap();

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("from-csv").arg(&csv).assert().success();

    assert!(dir.path().join("orders.xlsx").exists());
}

#[test]
fn test_from_csv_rejects_other_extensions() {
    let dir = TempDir::new().unwrap();
    let txt = dir.path().join("orders.txt");
    fs::write(&txt, "a\n").unwrap();

    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.arg("from-csv")
        .arg(&txt)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only *.csv files are supported."));
}

#[test]
fn test_docx_missing_file_fails() {
    let mut cmd = Command::cargo_bin("sheetbridge").unwrap();
    cmd.args(["docx", "does-not-exist.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}
