use std::io::Write;

use assert_cmd::Command;
use tempfile::NamedTempFile;

const BIN: &str = "geowatch";

#[test]
fn test_empty_args() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.assert().failure();
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-h").assert().success();
}

#[test]
fn test_version_opt() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-V").assert().failure();
}

#[test]
fn test_version_keyword() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("version").assert().success();
}

#[test]
fn test_bad_keyword() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("bouh").assert().failure();
}

#[test]
fn test_list_empty() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("list").assert().failure();
}

fn config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "version = 1").unwrap();
    file
}

#[test]
fn test_list_zones() {
    let cfg = config();
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-c")
        .arg(cfg.path())
        .args(["list", "zones"])
        .assert()
        .success();
}

#[test]
fn test_list_config() {
    let cfg = config();
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-c")
        .arg(cfg.path())
        .args(["list", "config"])
        .assert()
        .success();
}

#[test]
fn test_missing_config() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args(["-c", "/nonexistent/geowatch.hcl", "list", "zones"])
        .assert()
        .failure();
}

#[test]
fn test_distance() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    let out = cmd
        .args(["distance", "0", "0", "0", "0"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!("0.0 m\n", String::from_utf8(out).unwrap());
}

#[test]
fn test_distance_invalid() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.args(["distance", "100", "0", "0", "0"]).assert().failure();
}

#[test]
fn test_replay() {
    let cfg = config();
    let mut track = NamedTempFile::new().unwrap();
    writeln!(track, "time,lat,lon,accuracy").unwrap();
    writeln!(track, "2024-06-01T12:00:00Z,40.7769,-73.9851,5.0").unwrap();
    writeln!(track, "2024-06-01T12:00:06Z,40.7589,-73.9851,5.0").unwrap();

    let mut cmd = Command::cargo_bin(BIN).unwrap();
    let out = cmd
        .arg("-c")
        .arg(cfg.path())
        .arg("replay")
        .arg(track.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Geofence Entered: You entered Tech Hub!"));
    assert!(out.contains("Source: ActiveFix"));
}

#[test]
fn test_replay_missing_track() {
    let cfg = config();
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-c")
        .arg(cfg.path())
        .args(["replay", "/nonexistent/walk.csv"])
        .assert()
        .failure();
}
