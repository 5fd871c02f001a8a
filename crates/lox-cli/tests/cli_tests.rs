//! Integration tests for the `lox` binary
//!
//! Covers script execution on both engines, exit codes, the dump modes
//! and the REPL driven through stdin.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to write a script into a fresh temp directory
fn script(source: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("script.lox");
    fs::write(&path, source).unwrap();
    (dir, path)
}

/// Helper to create the lox command
fn lox() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lox").unwrap();
    cmd.env_remove("LOX_LOG").env_remove("LOX_MAX_CALL_DEPTH");
    cmd
}

// =============================================================================
// RUNNING SCRIPTS
// =============================================================================

#[test]
fn test_run_script() {
    let (_dir, path) = script("var a = 1;\nprint a + 2;\n");

    lox().arg(&path).assert().success().stdout("3\n");
}

#[test]
fn test_run_script_with_classes() {
    let (_dir, path) =
        script("class A { init(n) { this.n = n; } get() { return this.n; } }\nprint A(7).get();");

    lox().arg(&path).assert().success().stdout("7\n");
}

#[test]
fn test_run_script_on_bytecode_engine() {
    let (_dir, path) = script("for (var i = 0; i < 3; i = i + 1) print i;\n");

    lox()
        .args(["--engine", "bytecode"])
        .arg(&path)
        .assert()
        .success()
        .stdout("0\n1\n2\n");
}

// =============================================================================
// EXIT CODES
// =============================================================================

#[test]
fn test_syntax_error_exits_65() {
    let (_dir, path) = script("print ;\n");

    lox()
        .arg(&path)
        .assert()
        .code(65)
        .stdout("")
        .stderr(predicate::str::contains(
            "[line 1] Error at ';': Expect expression.",
        ));
}

#[test]
fn test_runtime_error_exits_70() {
    let (_dir, path) = script("print 1;\nprint -nil;\n");

    lox()
        .arg(&path)
        .assert()
        .code(70)
        .stdout("1\n")
        .stderr(predicate::str::contains(
            "Operand must be a number.\n[line 2]",
        ));
}

#[test]
fn test_unreadable_script_exits_74() {
    let dir = TempDir::new().unwrap();

    lox()
        .arg(dir.path().join("missing.lox"))
        .assert()
        .code(74)
        .stderr(predicate::str::contains("Could not read file"));
}

#[test]
fn test_usage_error_exits_64() {
    lox().arg("--no-such-flag").assert().code(64);
    lox().args(["--engine", "jit"]).assert().code(64);
}

#[test]
fn test_unsupported_feature_on_bytecode_engine() {
    let (_dir, path) = script("fun f() {}\n");

    lox()
        .args(["--engine", "bytecode"])
        .arg(&path)
        .assert()
        .code(65)
        .stderr(predicate::str::contains(
            "not supported by the bytecode engine",
        ));
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_max_call_depth_flag() {
    let (_dir, path) = script("fun f(n) { if (n > 0) f(n - 1); }\nf(20);\nprint \"done\";\n");

    lox().arg(&path).assert().success().stdout("done\n");
    lox()
        .args(["--max-call-depth", "10"])
        .arg(&path)
        .assert()
        .code(70)
        .stderr(predicate::str::contains("Stack overflow."));
}

#[test]
fn test_max_call_depth_from_env() {
    let (_dir, path) = script("fun f(n) { if (n > 0) f(n - 1); }\nf(20);\n");

    lox()
        .env("LOX_MAX_CALL_DEPTH", "5")
        .arg(&path)
        .assert()
        .code(70)
        .stderr(predicate::str::contains("Stack overflow."));
}

#[test]
fn test_deep_recursion_within_default_limit() {
    let (_dir, path) = script(
        "fun count(n) { if (n == 0) return 0; return 1 + count(n - 1); }\nprint count(250);\n",
    );

    lox().arg(&path).assert().success().stdout("250\n");
}

// =============================================================================
// DUMPS
// =============================================================================

#[test]
fn test_dump_tokens() {
    let (_dir, path) = script("print 1;");

    lox()
        .args(["--dump", "tokens"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"typ\": \"Print\""))
        .stdout(predicate::str::contains("\"typ\": \"Eof\""));
}

#[test]
fn test_dump_ast() {
    let (_dir, path) = script("print 1 + 2 * 3;");

    lox()
        .args(["--dump", "ast"])
        .arg(&path)
        .assert()
        .success()
        .stdout("(print (+ 1 (* 2 3)))\n");
}

#[test]
fn test_dump_bytecode() {
    let (_dir, path) = script("print 1;");

    lox()
        .args(["--dump", "bytecode"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("OP_CONSTANT         0 '1'"))
        .stdout(predicate::str::contains("OP_PRINT"));
}

#[test]
fn test_dump_without_script_is_usage_error() {
    lox().args(["--dump", "ast"]).assert().code(64);
}

// =============================================================================
// REPL
// =============================================================================

#[test]
fn test_repl_keeps_state_and_prints_values() {
    lox()
        .write_stdin("var a = 40;\na + 2\nprint a;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42\n"))
        .stdout(predicate::str::contains("40\n"));
}

#[test]
fn test_repl_continues_after_errors() {
    lox()
        .write_stdin("print undefined;\nprint \"still here\";\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("still here"))
        .stderr(predicate::str::contains("Undefined variable 'undefined'."));
}
