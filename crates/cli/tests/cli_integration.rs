//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `cellex` binary and verify exit codes,
//! stdout content, and stderr content. Inputs are written to a fresh
//! temporary directory per test.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper: create a Command for the `cellex` binary, rooted at `dir`.
fn cellex(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("cellex");
    cmd.current_dir(dir.path());
    cmd
}

/// Write `contents` to `name` inside `dir`.
fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write input");
    path
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    let dir = TempDir::new().unwrap();
    cellex(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Parse, check and repair cellex expressions"));
}

#[test]
fn version_exits_0() {
    let dir = TempDir::new().unwrap();
    cellex(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cellex"));
}

#[test]
fn missing_file_exits_1() {
    let dir = TempDir::new().unwrap();
    cellex(&dir)
        .args(["check", "nope.cx"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read nope.cx"));
}

// ──────────────────────────────────────────────
// 2. parse
// ──────────────────────────────────────────────

#[test]
fn parse_prints_display_text() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "in.cx", "a * b <> c\n");
    cellex(&dir)
        .args(["parse", "in.cx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1: a × b ≠ c"))
        .stdout(predicate::str::contains("\"node\": \"not_equal\""));
}

#[test]
fn parse_json_has_tree_and_diagnostics() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "in.cx", "1 + 2 * 3\n\n(1 + 2\n");
    let out = cellex(&dir)
        .args(["--output", "json", "parse", "in.cx"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let reports: serde_json::Value = serde_json::from_slice(&out).expect("json output");
    let reports = reports.as_array().expect("array");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["line"], 1);
    assert_eq!(reports[0]["tree"]["node"], "add_subtract");
    assert_eq!(reports[0]["diagnostics"].as_array().unwrap().len(), 0);
    assert_eq!(reports[1]["line"], 3);
    assert_eq!(reports[1]["diagnostics"][0]["message"], "Missing `)` before end");
    assert_eq!(reports[1]["diagnostics"][0]["quickfixes"][0]["replacement"], ")");
}

#[test]
fn parse_units_and_types() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "units.txt", "kg * m / s ^ 2\n");
    cellex(&dir)
        .args(["parse", "--kind", "unit", "units.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"node\": \"divide\""));

    write_input(&dir, "types.txt", "(name: Text, size: Number{m})\n");
    cellex(&dir)
        .args(["parse", "--kind", "type", "types.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"node\": \"record\""));
}

#[test]
fn parse_reads_stdin() {
    let dir = TempDir::new().unwrap();
    cellex(&dir)
        .args(["parse", "-"])
        .write_stdin("if a then b else c endif\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("if_then_else"));
}

// ──────────────────────────────────────────────
// 3. check
// ──────────────────────────────────────────────

#[test]
fn check_clean_file_exits_0() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "ok.cx", "1 + 2 = 3 + 4\nf(x, [1, 2])\n");
    cellex(&dir)
        .args(["check", "ok.cx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 2 input(s), no errors"));
}

#[test]
fn check_reports_location_and_fixes() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "bad.cx", "1 + 1\na & b + c & d\n");
    cellex(&dir)
        .args(["check", "bad.cx"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "bad.cx:2:1: Mixed operators: brackets required",
        ))
        .stdout(predicate::str::contains("fix: Add brackets: a & (b + c) & d"))
        .stdout(predicate::str::contains("1 error(s) in 2 input(s)"));
}

#[test]
fn check_json_lists_failures() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "bad.cx", "if a then b\n");
    let out = cellex(&dir)
        .args(["--output", "json", "check", "bad.cx"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).expect("json output");
    assert_eq!(report["inputs"], 1);
    assert_eq!(report["errors"], 1);
    assert_eq!(
        report["failures"][0]["diagnostics"][0]["message"],
        "Missing `else` before end"
    );
}

#[test]
fn check_quiet_prints_only_diagnostics() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "ok.cx", "a\n");
    cellex(&dir)
        .args(["--quiet", "check", "ok.cx"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn config_caps_diagnostics() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "bad.cx", "# # # #\n");
    write_input(&dir, "cellex.toml", "max_diagnostics = 1\n");
    cellex(&dir)
        .args(["--config", "cellex.toml", "check", "bad.cx"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("more diagnostic(s) not shown"));
}

#[test]
fn invalid_config_exits_1() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "ok.cx", "a\n");
    write_input(&dir, "cellex.toml", "max_diagnostics = \"lots\"\n");
    cellex(&dir)
        .args(["--config", "cellex.toml", "check", "ok.cx"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid config"));
}

// ──────────────────────────────────────────────
// 4. format
// ──────────────────────────────────────────────

#[test]
fn format_normalises_and_renames() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "in.cx", "qty*price\n  (a:1,b:\"x\")\n");
    write_input(&dir, "cellex.toml", "[renames]\nqty = \"quantity\"\n");
    cellex(&dir)
        .args(["--config", "cellex.toml", "format", "in.cx"])
        .assert()
        .success()
        .stdout("quantity * price\n(a: 1, b: \"x\")\n");
}

#[test]
fn format_refuses_inputs_with_errors() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "in.cx", "a +\n");
    cellex(&dir)
        .args(["format", "in.cx"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not formatting: 1 input(s) have errors"));
}

// ──────────────────────────────────────────────
// 5. fix
// ──────────────────────────────────────────────

#[test]
fn fix_prints_repaired_text() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "in.cx", "(1 + 2\n\nx\n");
    cellex(&dir)
        .args(["fix", "in.cx"])
        .assert()
        .success()
        .stdout("(1 + 2)\n\nx\n")
        .stderr(predicate::str::contains("applied 1 fix(es), 0 error(s) remain"));
}

#[test]
fn fix_write_rewrites_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "in.cx", "a & b + c & d\n");
    cellex(&dir)
        .args(["--quiet", "fix", "--write", "in.cx"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(fs::read_to_string(path).unwrap(), "a & (b + c) & d\n");
}

#[test]
fn fix_write_rejects_stdin() {
    let dir = TempDir::new().unwrap();
    cellex(&dir)
        .args(["fix", "--write", "-"])
        .write_stdin("(1\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--write needs a file"));
}
