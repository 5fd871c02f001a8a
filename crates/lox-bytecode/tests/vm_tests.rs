use lox::{Engine, EvalContext, LoxError, Session, SharedOutput};
use lox_bytecode::*;
use pretty_assertions::assert_eq;

// Helper to run a program on the VM and capture what it prints
fn run(src: &str) -> Result<String, LoxError> {
    let out = SharedOutput::new();
    let mut vm = Vm::with_output(out.clone());
    vm.interpret(src)?;
    Ok(out.contents())
}

// Helper running the same program on the tree-walker
fn run_tree_walk(src: &str) -> Result<String, LoxError> {
    let out = SharedOutput::new();
    let mut session = Session::with_output(out.clone());
    session.run(src)?;
    Ok(out.contents())
}

// Both engines must agree on output and on errors
fn assert_same_as_tree_walker(src: &str) {
    let vm = run(src).map_err(|e| e.to_string());
    let tree_walk = run_tree_walk(src).map_err(|e| e.to_string());
    assert_eq!(vm, tree_walk, "engines disagree on {:?}", src);
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(run("print 1 + 2 * 3 - 4 / 2;").unwrap(), "5\n");
    assert_eq!(run("print (1 + 2) * 3;").unwrap(), "9\n");
    assert_eq!(run("print -(-3);").unwrap(), "3\n");
}

#[test]
fn test_string_concatenation() {
    assert_eq!(run("print \"foo\" + \"bar\";").unwrap(), "foobar\n");
}

#[test]
fn test_comparison_and_equality() {
    assert_eq!(
        run("print 1 < 2; print 2 <= 2; print 3 > 4; print 3 >= 4;").unwrap(),
        "true\ntrue\nfalse\nfalse\n"
    );
    assert_eq!(
        run("print nil == false; print \"a\" == \"a\"; print 1 != 2;").unwrap(),
        "false\ntrue\ntrue\n"
    );
}

#[test]
fn test_nan_comparisons_are_false() {
    let src = "var n = 0 / 0; print n >= n; print n <= n; print n >= 1; print n == n;";
    assert_eq!(run(src).unwrap(), "false\nfalse\nfalse\nfalse\n");
}

#[test]
fn test_logical_operators_short_circuit() {
    assert_eq!(
        run("print nil or \"d\"; print false and 1; print 1 and 2;").unwrap(),
        "d\nfalse\n2\n"
    );
    assert_eq!(run("var a = 1; true or (a = 2); print a;").unwrap(), "1\n");
}

// ═══════════════════════════════════════════════════════════════════════
// Variables and Scope
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_global_variables() {
    assert_eq!(
        run("var a; print a; a = 1; print a; var a = 2; print a;").unwrap(),
        "nil\n1\n2\n"
    );
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(
        run("var a; var b; a = b = 3; print a; print b;").unwrap(),
        "3\n3\n"
    );
}

#[test]
fn test_nested_scopes_shadow() {
    let src = r#"
var a = "global";
{
  var a = "outer";
  {
    var a = "inner";
    print a;
  }
  print a;
}
print a;
"#;
    assert_eq!(run(src).unwrap(), "inner\nouter\nglobal\n");
}

#[test]
fn test_local_assignment() {
    assert_eq!(
        run("{ var a = 1; var b = 2; a = a + b; print a; }").unwrap(),
        "3\n"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Control Flow
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_if_else() {
    assert_eq!(
        run("if (1 > 2) print \"no\"; else print \"yes\";").unwrap(),
        "yes\n"
    );
    assert_eq!(run("if (nil) print \"no\";").unwrap(), "");
}

#[test]
fn test_while_loop() {
    assert_eq!(
        run("var i = 0; while (i < 3) { print i; i = i + 1; }").unwrap(),
        "0\n1\n2\n"
    );
}

#[test]
fn test_for_loop_fibonacci() {
    let src = r#"
var a = 0;
var b = 1;
for (var i = 0; i < 8; i = i + 1) {
  print a;
  var t = a;
  a = b;
  b = t + b;
}
"#;
    assert_eq!(run(src).unwrap(), "0\n1\n1\n2\n3\n5\n8\n13\n");
}

#[test]
fn test_for_loop_without_clauses() {
    assert_eq!(
        run("var i = 0; for (; i < 2;) { print i; i = i + 1; }").unwrap(),
        "0\n1\n"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_runtime_error_reports_line() {
    let err = run("var a = 1;\nprint a + nil;").unwrap_err();
    assert_eq!(err.exit_code(), 70);
    assert_eq!(
        err.to_string(),
        "Operands must be two numbers or two strings.\n[line 2]"
    );
}

#[test]
fn test_output_before_runtime_error_is_kept() {
    let out = SharedOutput::new();
    let mut vm = Vm::with_output(out.clone());
    assert!(vm.interpret("print 1; print -nil; print 2;").is_err());
    assert_eq!(out.contents(), "1\n");
}

#[test]
fn test_unsupported_features_are_compile_errors() {
    for src in [
        "fun f() {}",
        "class A {}",
        "print clock();",
        "var a; print a.b;",
        "return 1;",
        "print this;",
    ] {
        let err = run(src).unwrap_err();
        assert_eq!(err.exit_code(), 65, "{}", src);
        let message = err.to_string();
        assert!(
            message.contains("is not supported by the bytecode engine."),
            "{}",
            message
        );
    }
}

#[test]
fn test_compile_errors_prevent_execution() {
    let out = SharedOutput::new();
    let mut vm = Vm::with_output(out.clone());
    assert!(vm.interpret("print 1;\nprint ;").is_err());
    assert_eq!(out.contents(), "");
}

// ═══════════════════════════════════════════════════════════════════════
// Agreement With the Tree-Walker
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_engines_agree_on_output() {
    for src in [
        "print 0.1 + 0.2; print 1 / 0; print -0; print 10 / 4;",
        "print !nil; print !0; print !\"\";",
        "var s = \"a\"; s = s + s; print s == \"aa\";",
        "var a = 1; { var b = a + 1; print b; } print a;",
        "for (var i = 3; i > 0; i = i - 1) print i;",
        "var x = 0; while (x < 100) x = x + 7; print x;",
        "var n = 0 / 0; print n >= n; print n <= n; print n >= 1; print 1 <= n;",
        "var n = 0 / 0; print n == n; print n != n; print n < 1; print n > 1;",
    ] {
        assert_same_as_tree_walker(src);
    }
}

#[test]
fn test_engines_agree_on_runtime_errors() {
    for src in [
        "print -\"s\";",
        "print 1 + nil;",
        "print \"a\" < 1;",
        "print undefined;",
        "undefined = 1;",
        "print 1;\nprint 2 * false;",
    ] {
        assert_same_as_tree_walker(src);
    }
}

#[test]
fn test_engines_agree_on_syntax_errors() {
    for src in [
        "print 1",
        "var 1 = 2;",
        "1 = 2;",
        "print (1;",
        "{ var a = 1; var a = 2; }",
        "@",
    ] {
        assert_same_as_tree_walker(src);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Engine Interface
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_vm_as_engine() {
    let out = SharedOutput::new();
    let mut engine: Box<dyn Engine> = Box::new(Vm::with_output(out.clone()));

    assert_eq!(engine.name(), "bytecode");
    engine.run("var a = 2;").unwrap();
    assert_eq!(engine.run_repl_line("print a * 21;").unwrap(), None);
    assert_eq!(out.contents(), "42\n");
}

#[test]
fn test_interrupted_vm_reports_error() {
    let ctx = EvalContext::new();
    let handle = ctx.interrupt.clone();
    let mut vm = Vm::with_output(SharedOutput::new()).with_context(ctx);

    handle.store(true, std::sync::atomic::Ordering::Relaxed);
    let source = "var i = 0;\nwhile (true) i = i + 1;";
    let err = vm.interpret(source).unwrap_err();
    assert_eq!(err.to_string(), "Interrupted.\n[line 2]");

    vm.context().reset_interrupt();
    assert_eq!(vm.global("i"), Some(&Value::Number(1.0)));
}
