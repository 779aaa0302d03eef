//! End-to-end tests for the `dsrun` binary
//!
//! The external tools are replaced with `true` / `false` through `--cmake` and
//! `--ctest`, so these run without CMake installed.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

fn dsrun(build_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dsrun"))
        .arg("--build")
        .arg(build_dir)
        .args(args)
        .output()
        .expect("failed to run dsrun")
}

fn touch_test_bin(build_dir: &Path, names: &[&str]) {
    let bin = build_dir.join("test_bin");
    fs::create_dir_all(&bin).unwrap();
    for name in names {
        fs::write(bin.join(name), "").unwrap();
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_list_before_build_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = dsrun(dir.path(), &["--list-tests"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("Nothing to list"), "stderr: {}", stderr(&output));
}

#[test]
fn test_list_prints_discovered_names() {
    let dir = tempfile::tempdir().unwrap();
    touch_test_bin(dir.path(), &["linked_list", "hash_map"]);

    let output = dsrun(dir.path(), &["-l", "--cmake", "false"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    let mut lines: Vec<&str> = stdout.lines().collect();
    lines.sort();
    assert_eq!(lines, vec!["hash_map", "linked_list"]);
}

#[test]
fn test_list_follows_directory_order() {
    let dir = tempfile::tempdir().unwrap();
    touch_test_bin(dir.path(), &["zeta", "alpha", "mid", "beta", "q"]);
    let expected: Vec<String> = fs::read_dir(dir.path().join("test_bin"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    let output = dsrun(dir.path(), &["-l"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_run_all_and_test_name_conflict() {
    let dir = tempfile::tempdir().unwrap();

    let output = dsrun(dir.path(), &["-r", "-t", "heap", "--cmake", "false"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("cannot be used with"), "stderr: {}", stderr(&output));
}

#[test]
fn test_build_only_ignores_compile_failure() {
    let dir = tempfile::tempdir().unwrap();

    let output = dsrun(dir.path(), &["--cmake", "false"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_strict_build_stops_on_failure() {
    let dir = tempfile::tempdir().unwrap();

    let output = dsrun(dir.path(), &["--cmake", "false", "--strict", "-r", "--ctest", "true"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed with exit code 1"));
}

#[test]
fn test_run_all_forwards_runner_exit_code() {
    let dir = tempfile::tempdir().unwrap();

    let passing = dsrun(dir.path(), &["-r", "--cmake", "true", "--ctest", "true"]);
    assert!(passing.status.success());

    let failing = dsrun(dir.path(), &["-r", "--cmake", "true", "--ctest", "false"]);
    assert_eq!(failing.status.code(), Some(1));
}

#[test]
fn test_run_one_forwards_binary_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    touch_test_bin(dir.path(), &["linked_list"]);
    let script = dir.path().join("test_bin").join("hash_map");
    fs::write(&script, "#!/bin/sh\nexit 7\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let output = dsrun(dir.path(), &["-t", "hash_map", "--cmake", "true", "--ctest", "false"]);

    assert_eq!(output.status.code(), Some(7), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), script.display().to_string());
}

#[test]
fn test_run_one_unknown_name() {
    let dir = tempfile::tempdir().unwrap();
    touch_test_bin(dir.path(), &["linked_list"]);

    let output = dsrun(dir.path(), &["-t", "graph", "--cmake", "true"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Could not find the test name you supplied"));
}
