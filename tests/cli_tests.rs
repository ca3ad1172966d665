//! Smoke tests for the `trafficdb` binary.

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn configured_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("uk.csv"),
        "Year,Cars,All motor vehicles\n2019,278.2,356.5\n2020,216.8,280.3\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("london_cars.csv"),
        "Borough ID,Borough name,LA code,Year,Cars\n1,Camden,E09000007,2020,410.25\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("london_all.csv"),
        "Borough ID,Borough name,Year,All motor vehicles\n1,Camden,2020,560\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("config.toml"),
        r#"
[database]
path = "traffic.db"

[ingest]
uk = "uk.csv"
london_cars = "london_cars.csv"
london_all = "london_all.csv"
"#,
    )
    .unwrap();
    dir
}

fn trafficdb(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("trafficdb").unwrap();
    cmd.arg("--config").arg(dir.path().join("config.toml"));
    cmd
}

#[test]
fn test_ingest_then_read() {
    let dir = configured_dir();

    let output = trafficdb(&dir).arg("ingest").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "uk: 2 rows\nlondon_cars: 1 rows\nlondon_all: 1 rows\n");

    let output = trafficdb(&dir).args(["rows", "uk"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "year\tcars\tall_motor_vehicles\n2019\t278.2\t356.5\n2020\t216.8\t280.3\n"
    );

    let output = trafficdb(&dir).args(["columns", "london_cars"]).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("borough_id\tINTEGER\nborough_name\tTEXT\n"));
}

#[test]
fn test_invalid_insert_exits_with_failure() {
    let dir = configured_dir();
    trafficdb(&dir).arg("ingest").assert().success();

    let output = trafficdb(&dir)
        .args(["insert", "uk", "year=soon", "cars=1.0"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Invalid value kind for column year"));

    trafficdb(&dir)
        .args(["insert", "uk", "year=2021", "cars=230.5"])
        .assert()
        .success();

    let output = trafficdb(&dir).args(["delete", "uk", "year >= 2020"]).output().unwrap();
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "2 rows deleted\n");
}

#[test]
fn test_missing_store_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("trafficdb")
        .unwrap()
        .arg("--db")
        .arg(dir.path().join("absent.db"))
        .arg("tables")
        .assert()
        .failure();
}

#[test]
fn test_missing_table_is_soft() {
    let dir = configured_dir();
    trafficdb(&dir).arg("ingest").assert().success();

    let output = trafficdb(&dir).args(["rows", "wales"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "\n");
    assert!(String::from_utf8(output.stderr).unwrap().contains("wales"));
}
