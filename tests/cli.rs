// ABOUTME: Process-level tests for CLI exit codes and usage errors

use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;

fn write_script(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn normal_script_exits_zero() {
    let file = write_script("print(1 + 1);", ".nbl");
    Command::cargo_bin("nimble")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("2"));
}

#[test]
fn wrong_extension_is_a_usage_error() {
    let file = write_script("print(1);", ".txt");
    Command::cargo_bin("nimble")
        .unwrap()
        .arg(file.path())
        .assert()
        .code(1);
}

#[test]
fn too_many_arguments_is_a_usage_error() {
    Command::cargo_bin("nimble")
        .unwrap()
        .arg("a.nbl")
        .arg("b.nbl")
        .assert()
        .failure();
}

#[test]
fn parse_error_exits_with_compile_time_code() {
    let file = write_script("var x = ;", ".nbl");
    Command::cargo_bin("nimble")
        .unwrap()
        .arg(file.path())
        .assert()
        .code(2);
}

#[test]
fn runtime_error_exits_with_runtime_code() {
    let file = write_script("print(undefined_name);", ".nbl");
    Command::cargo_bin("nimble")
        .unwrap()
        .arg(file.path())
        .assert()
        .code(3);
}

#[test]
fn runtime_error_prints_message_then_on_line_suffix() {
    let file = write_script("print(undefined_name);\n", ".nbl");
    Command::cargo_bin("nimble")
        .unwrap()
        .arg(file.path())
        .assert()
        .code(3)
        .stderr(contains("Undefined variable 'undefined_name'\nOn line 1"));
}
