//! Integration tests running whole programs through the VM

use core_types::InterpretResult;
use interpreter::{VmConfig, VM};
use memory_manager::GcConfig;

fn run(source: &str) -> String {
    let mut vm = VM::new();
    let result = vm.interpret(source);
    assert_eq!(result, InterpretResult::Ok, "{}", vm.diagnostics());
    vm.take_output()
}

fn run_stressed(source: &str) -> String {
    let config = VmConfig::default().with_gc(GcConfig::default().with_stress(true));
    let mut vm = VM::with_config(config);
    let result = vm.interpret(source);
    assert_eq!(result, InterpretResult::Ok, "{}", vm.diagnostics());
    vm.take_output()
}

const COUNTER: &str = r#"
fun makeCounter() {
  var count = 0;
  fun increment() {
    count = count + 1;
    return count;
  }
  return increment;
}
var a = makeCounter();
var b = makeCounter();
print a();
print a();
print b();
"#;

#[test]
fn test_counter_closures() {
    assert_eq!(run(COUNTER), "1\n2\n1\n");
}

#[test]
fn test_closure_sees_later_assignment() {
    let source = r#"
fun outer() {
  var x = "before";
  fun show() { print x; }
  x = "after";
  return show;
}
outer()();
"#;
    assert_eq!(run(source), "after\n");
}

#[test]
fn test_nested_upvalues() {
    let source = r#"
fun outer() {
  var x = "outer";
  fun middle() {
    fun inner() { print x; }
    return inner;
  }
  return middle();
}
outer()();
"#;
    assert_eq!(run(source), "outer\n");
}

#[test]
fn test_block_scoped_capture_is_closed() {
    let source = r#"
var f;
{
  var local = "captured";
  fun g() { print local; }
  f = g;
}
f();
"#;
    assert_eq!(run(source), "captured\n");
}

#[test]
fn test_loop_closures_capture_fresh_variables() {
    let source = r#"
var first;
var second;
for (var i = 1; i <= 2; i = i + 1) {
  var j = i;
  fun show() { print j; }
  if (first == nil) first = show; else second = show;
}
first();
second();
"#;
    assert_eq!(run(source), "1\n2\n");
}

#[test]
fn test_recursion() {
    let source = r#"
fun fact(n) { if (n <= 1) return 1; return n * fact(n - 1); }
print fact(10);
"#;
    assert_eq!(run(source), "3628800\n");
}

#[test]
fn test_string_building_under_gc_stress() {
    let source = r#"
var s = "";
for (var i = 0; i < 20; i = i + 1) {
  s = s + "x";
}
print s;
"#;
    assert_eq!(run_stressed(source), format!("{}\n", "x".repeat(20)));
}

#[test]
fn test_closures_under_gc_stress() {
    assert_eq!(run_stressed(COUNTER), "1\n2\n1\n");
}

#[test]
fn test_small_threshold_matches_default() {
    let source = r#"
fun make(n) { var s = "v"; fun get() { return s + "" ; } return get; }
var total = "";
for (var i = 0; i < 200; i = i + 1) { total = make(i)(); }
print total;
"#;
    let config = VmConfig::default().with_gc(GcConfig::default().with_initial_threshold(256));
    let mut vm = VM::with_config(config);
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    assert_eq!(vm.output(), run(source));
    assert!(vm.heap().stats().collections > 0);
}

#[test]
fn test_garbage_is_reclaimed() {
    let mut vm = VM::new();
    vm.interpret("for (var i = 0; i < 100; i = i + 1) { var s = \"a\" + \"b\"; }");
    vm.collect_garbage();
    let live = vm.heap().bytes_allocated();
    vm.interpret("for (var i = 0; i < 100; i = i + 1) { var s = \"a\" + \"b\"; }");
    vm.collect_garbage();
    assert_eq!(vm.heap().bytes_allocated(), live);
}

const ESCAPED_BEFORE_ERROR: &str = r#"
var g;
fun f() {
  var x = "captured";
  fun h() { return x; }
  g = h;
  return -nil;
}
f();
"#;

#[test]
fn test_escaped_closure_survives_runtime_error() {
    let mut vm = VM::new();
    assert_eq!(vm.interpret(ESCAPED_BEFORE_ERROR), InterpretResult::RuntimeError);
    assert_eq!(vm.interpret("print g();"), InterpretResult::Ok, "{}", vm.diagnostics());
    assert_eq!(vm.output(), "captured\n");
}

#[test]
fn test_escaped_closure_ignores_reused_stack_slots() {
    let mut vm = VM::new();
    assert_eq!(vm.interpret(ESCAPED_BEFORE_ERROR), InterpretResult::RuntimeError);
    let source = "fun k(a, b) { return g(); } print k(1, 2);";
    assert_eq!(vm.interpret(source), InterpretResult::Ok, "{}", vm.diagnostics());
    assert_eq!(vm.output(), "captured\n");
}

#[test]
fn test_escaped_closure_survives_error_under_gc_stress() {
    let config = VmConfig::default().with_gc(GcConfig::default().with_stress(true));
    let mut vm = VM::with_config(config);
    assert_eq!(vm.interpret(ESCAPED_BEFORE_ERROR), InterpretResult::RuntimeError);
    vm.collect_garbage();
    assert_eq!(vm.interpret("print g() + \"!\";"), InterpretResult::Ok, "{}", vm.diagnostics());
    assert_eq!(vm.output(), "captured!\n");
}
