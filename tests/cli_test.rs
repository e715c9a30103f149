//! Tests for the dump_modes binary: exit codes and files written.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn dump_modes(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dump_modes"))
        .arg("--out-dir")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to run dump_modes")
}

fn written_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

fn mode_file(dir: &Path) -> PathBuf {
    let files = written_files(dir);
    assert_eq!(files.len(), 1, "expected one output file, got {files:?}");
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(
        name == "static_modes_float.h" || name == "static_modes_fixed.h",
        "unexpected output {name}"
    );
    files[0].clone()
}

#[test]
fn test_writes_mode_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dump_modes(dir.path(), &["48000", "960", "48000", "480"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body = fs::read_to_string(mode_file(dir.path())).unwrap();
    assert!(body.starts_with("/* The contents of this file was automatically generated by dump_modes"));
    assert!(body.contains("   with arguments: 48000 960 48000 480\n"));
    assert!(body.contains("#define TOTAL_MODES 2\n"));
    assert!(body.contains("static const CELTMode mode48000_960_120 = {"));
    assert!(body.contains("static const CELTMode mode48000_480_120 = {"));
    assert!(body.ends_with("};\n"));
}

#[test]
fn test_odd_argument_count_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dump_modes(dir.path(), &["48000", "960", "48000"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("got 3 values"), "{stderr}");
    assert!(stderr.contains("Usage"), "{stderr}");
    assert!(written_files(dir.path()).is_empty());
}

#[test]
fn test_missing_or_bad_arguments_are_usage_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(dump_modes(dir.path(), &[]).status.code(), Some(1));
    assert_eq!(dump_modes(dir.path(), &["abc", "960"]).status.code(), Some(1));
    assert_eq!(
        dump_modes(dir.path(), &["--frobnicate", "48000", "960"]).status.code(),
        Some(1)
    );
    assert!(written_files(dir.path()).is_empty());
}

#[test]
fn test_construction_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dump_modes(dir.path(), &["48000", "960", "7999", "120"]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error creating mode with Fs=7999, frame_size=120"),
        "{stderr}"
    );
    assert!(written_files(dir.path()).is_empty());
}

#[test]
fn test_mismatched_shared_tables_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dump_modes(dir.path(), &["48000", "960", "8050", "160"]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cache_index50"), "{stderr}");
    assert!(written_files(dir.path()).is_empty());
}

#[test]
fn test_companion_header() {
    let dir = tempfile::tempdir().unwrap();
    let header_dir = tempfile::tempdir().unwrap();
    let header = header_dir.path().join("custom_modes.h");

    let output = dump_modes(
        dir.path(),
        &["--header", header.to_str().unwrap(), "48000", "960", "24000", "960"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    mode_file(dir.path());

    let text = fs::read_to_string(&header).unwrap();
    assert!(text.starts_with("/* This header file is generated automatically*/\n"));
    assert!(text.contains("#define FRAMESIZE(mode) 960\n"));
    assert!(!text.contains("CHANNELS"));
}

#[test]
fn test_missing_output_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does/not/exist");
    let output = dump_modes(&missing, &["48000", "960"]);
    assert_eq!(output.status.code(), Some(3));
}
