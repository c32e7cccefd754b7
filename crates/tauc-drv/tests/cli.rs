use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn compiles_a_minimal_module_to_header_and_body() {
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let input = src_dir.path().join("app.tau");
    let mut f = std::fs::File::create(&input).unwrap();
    writeln!(f, "mod app; pub fn main() void {{ return; }}").unwrap();

    Command::cargo_bin("tauc")
        .unwrap()
        .arg(&input)
        .arg("--out-dir")
        .arg(out_dir.path())
        .assert()
        .success();

    assert!(out_dir.path().join("app.h").exists());
    assert!(out_dir.path().join("app.c").exists());
}

#[test]
fn missing_input_file_exits_nonzero() {
    let out_dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("tauc")
        .unwrap()
        .arg("/no/such/file.tau")
        .arg("--out-dir")
        .arg(out_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
