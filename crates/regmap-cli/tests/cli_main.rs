//! CLI integration tests for the `regmap` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write as _;

const VALID: &str = r#"
device:
  name: Boiler
entities:
  - platform: sensor
    key: water_temp
    read:
      address: 10
      data_type: int16
      scale: 0.1
  - platform: switch
    key: pump
    read: {address: 20, bit: 0}
    write: {address: 20, bit: 0}
"#;

const INVALID: &str = r#"
device:
  name: Boiler
entities:
  - platform: number
    key: setpoint
    read: {address: 10}
  - platform: sensor
    key: setpoint
    read: {address: 11}
"#;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_validate_ok() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "boiler.yaml", VALID);

    Command::cargo_bin("regmap")
        .unwrap()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK (Boiler, 2 entities)"));
}

#[test]
fn test_validate_reports_all_issues() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.yaml", INVALID);

    Command::cargo_bin("regmap")
        .unwrap()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a 'write' section"))
        .stderr(predicate::str::contains("duplicate key 'setpoint'"));
}

#[test]
fn test_list_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir, "b.yaml", VALID);
    write_file(&dir, "a.yml", VALID);
    write_file(&dir, "readme.txt", "not yaml");

    Command::cargo_bin("regmap")
        .unwrap()
        .arg("list")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::eq("a.yml\nb.yaml\n"));
}

#[test]
fn test_show_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "boiler.yaml", VALID);

    Command::cargo_bin("regmap")
        .unwrap()
        .args(["show", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"water_temp\""));
}

#[test]
fn test_show_table_has_bit_notation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "boiler.yaml", VALID);

    Command::cargo_bin("regmap")
        .unwrap()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("20#0"));
}
