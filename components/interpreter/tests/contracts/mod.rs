//! Contract tests for the VM's observable guarantees

use core_types::{InterpretResult, Value};
use interpreter::VM;

#[test]
fn contract_basic_expressions() {
    let mut vm = VM::new();
    vm.interpret("print 1 + 2 * 3;");
    vm.interpret("print \"a\" + \"b\";");
    vm.interpret("print 1 == 2;");
    assert_eq!(vm.output(), "7\nab\nfalse\n");
}

#[test]
fn contract_fib_returns_to_depth_zero() {
    let mut vm = VM::new();
    let source = "fun fib(n) { if (n < 2) return n; return fib(n - 2) + fib(n - 1); } print fib(10);";
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert_eq!(vm.output(), "55\n");
    assert_eq!(vm.frame_depth(), 0);
    assert_eq!(vm.stack_len(), 0);
}

#[test]
fn contract_shared_upvalue_cell() {
    let mut vm = VM::new();
    let source = r#"
var get;
var set;
fun make() {
  var shared = 1;
  fun g() { return shared; }
  fun s(v) { shared = v; }
  get = g;
  set = s;
}
make();
set(99);
print get();
"#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert_eq!(vm.output(), "99\n");
}

#[test]
fn contract_arity_mismatch_never_runs_body() {
    let mut vm = VM::new();
    let source = "var ran = false; fun f(a, b) { ran = true; } f(1);";
    assert_eq!(vm.interpret(source), InterpretResult::RuntimeError);
    assert_eq!(vm.global("ran"), Some(Value::Bool(false)));
    assert!(vm
        .diagnostics()
        .starts_with("Expected 2 arguments but got 1.\n[line 1] in script"));
}

#[test]
fn contract_compile_error_runs_nothing() {
    let mut vm = VM::new();
    let source = "print \"first\";\nprint 1 +;\nprint \"last\";";
    assert_eq!(vm.interpret(source), InterpretResult::CompileError);
    assert!(vm.output().is_empty());
    assert_eq!(vm.diagnostics(), "[line 2] Error at ';': Expect expression.\n");
}

#[test]
fn contract_interned_strings_compare_equal() {
    let mut vm = VM::new();
    vm.interpret("var a = \"ab\"; var b = \"a\" + \"b\";");
    assert_eq!(vm.global("a"), vm.global("b"));
}

#[test]
fn contract_runtime_error_is_not_fatal_for_the_host() {
    let mut vm = VM::new();
    assert_eq!(vm.interpret("nil();"), InterpretResult::RuntimeError);
    assert_eq!(vm.interpret("print \"still here\";"), InterpretResult::Ok);
    assert_eq!(vm.output(), "still here\n");
}
