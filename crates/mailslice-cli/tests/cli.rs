use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const OCR_DUMP: &str = "\
To: hcp@example.org
Subject Line: Première annonce
Preheader: See what's new
Click to unsubscribe
Subject Line: Second email
Click to unsubscribe
Subject Line: Third email
MAT-US-ELA-00626 v2";

fn mailslice() -> Command {
    Command::cargo_bin("mailslice").unwrap()
}

#[test]
fn test_text_command_prints_page_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("page2.txt");
    fs::write(&input, OCR_DUMP).unwrap();

    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();

    let output = mailslice()
        .args(["--config", config.to_str().unwrap(), "text"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["page2"]["slice1"]["subject_line"], "Première annonce");
    assert_eq!(json["page2"]["slice1"]["preheader"], "See what's new");
    assert_eq!(json["page2"]["slice2"]["subject_line"], "Second email");
    assert_eq!(json["page2"]["slice3"]["mlr_code"], "MAT-US-ELA-00626");
}

#[test]
fn test_text_command_writes_csv_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dump.txt");
    let output = dir.path().join("out.csv");
    let config = dir.path().join("config.json");
    fs::write(&input, OCR_DUMP).unwrap();
    fs::write(&config, "{}").unwrap();

    mailslice()
        .args(["--config", config.to_str().unwrap(), "text", "--page", "5", "--format", "csv"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().nth(1).unwrap().starts_with("page5,slice1,hcp@example.org"));
}

#[test]
fn test_text_command_label_strategy() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sections.txt");
    let config = dir.path().join("config.json");
    fs::write(&input, "Section 2\nSubject Line: B\nSection 1\nSubject Line: A").unwrap();
    fs::write(&config, "{}").unwrap();

    let output = mailslice()
        .args(["--config", config.to_str().unwrap(), "text", "--strategy", "labels"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["page2"]["slice1"]["subject_line"], "B");
    assert_eq!(json["page2"]["slice2"]["subject_line"], "A");
    assert_eq!(json["page2"]["slice3"]["subject_line"], "");
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("page2.txt");
    fs::write(&input, OCR_DUMP).unwrap();

    mailslice()
        .args(["--config", dir.path().join("none.json").to_str().unwrap(), "text"])
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn test_missing_input_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();

    mailslice()
        .args(["--config", config.to_str().unwrap(), "text", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_config_init_and_get() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");

    mailslice()
        .args(["--config", config.to_str().unwrap(), "config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    mailslice()
        .args(["--config", config.to_str().unwrap(), "config", "set", "pdf.page_number", "3"])
        .assert()
        .success();

    mailslice()
        .args(["--config", config.to_str().unwrap(), "config", "get", "pdf.page_number"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));
}
