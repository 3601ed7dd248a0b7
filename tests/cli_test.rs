//! Integration tests for the clip2md CLI.

#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_clip2md"))
}

#[test]
fn test_basic_stdin() {
    cli()
        .write_stdin("<h1>Title</h1><p>Content</p>")
        .assert()
        .success()
        .stdout("Title\n=====\n\nContent\n");
}

#[test]
fn test_dash_reads_stdin() {
    cli()
        .arg("-")
        .write_stdin("<p>Dash test</p>")
        .assert()
        .success()
        .stdout("Dash test\n");
}

#[test]
fn test_file_input() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("paste.html");
    fs::write(&input_path, "<p>Hello <b>world</b></p>").unwrap();

    cli()
        .arg(&input_path)
        .assert()
        .success()
        .stdout("Hello **world**\n");
}

#[test]
fn test_file_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("notes.md");

    cli()
        .arg("-o")
        .arg(&output_path)
        .write_stdin("<ol><li>a</li><li>b</li></ol>")
        .assert()
        .success()
        .stdout("");

    let output = fs::read_to_string(&output_path).unwrap();
    assert_eq!(output, "1.  a\n2.  b\n");
}

#[test]
fn test_plain_text_table() {
    cli()
        .write_stdin("Name\tAge\nBob\t42\n")
        .assert()
        .success()
        .stdout("| Name | Age |\n| ---- | --- |\n| Bob | 42 |\n");
}

#[test]
fn test_no_table_repair_flag() {
    cli()
        .arg("--no-table-repair")
        .write_stdin("a  b\nc  d")
        .assert()
        .success()
        .stdout("a  b\nc  d\n");
}

#[test]
fn test_no_escape_flag() {
    cli()
        .arg("--no-escape")
        .write_stdin("<p>snake_case</p>")
        .assert()
        .success()
        .stdout("snake_case\n");
}

#[test]
fn test_no_clean_flag_keeps_vendor_text() {
    cli()
        .arg("--no-clean")
        .write_stdin("<p>a<st1:city>Paris</st1:city></p>")
        .assert()
        .success()
        .stdout("aParis\n");
}

#[test]
fn test_no_tables_flag() {
    cli()
        .arg("--no-tables")
        .write_stdin("<table><tr><td>x</td><td>y</td></tr></table>")
        .assert()
        .success()
        .stdout("x\n\ny\n");
}

#[test]
fn test_cf_html_payload() {
    let payload = "Version:0.9\r\nStartHTML:-1\r\nEndHTML:-1\r\n\
                   StartFragment:0000000089\r\nEndFragment:0000000101\r\n<b>Hello</b>";
    cli().write_stdin(payload).assert().success().stdout("**Hello**\n");
}

#[test]
fn test_charset_override() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("legacy.htm");
    fs::write(&input_path, b"<p>Caf\xE9</p>").unwrap();

    cli()
        .arg("--charset")
        .arg("windows-1252")
        .arg(&input_path)
        .assert()
        .success()
        .stdout("Caf\u{e9}\n");
}

#[test]
fn test_unknown_charset_fails() {
    cli()
        .arg("--charset")
        .arg("klingon")
        .write_stdin("<p>x</p>")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unsupported charset: klingon"));
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.html");

    cli()
        .arg(&missing)
        .assert()
        .failure()
        .code(74)
        .stderr(predicate::str::contains("missing.html"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    cli()
        .arg("-v")
        .env_remove("RUST_LOG")
        .write_stdin("<p>x</p>")
        .assert()
        .success()
        .stdout("x\n")
        .stderr(predicate::str::contains("read clipboard payload"));
}

#[test]
fn test_empty_input() {
    cli().write_stdin("").assert().success().stdout("\n");
}

#[test]
fn test_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-table-repair"));
}
