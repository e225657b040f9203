//! Memory Manager <-> Interpreter Integration Tests
//!
//! Runs programs under collection pressure and checks reachable data
//! survives while garbage is reclaimed.

use core_types::InterpretResult;
use interpreter::{VmConfig, VM};
use memory_manager::GcConfig;

fn stressed_vm() -> VM {
    VM::with_config(VmConfig::default().with_gc(GcConfig::default().with_stress(true)))
}

#[test]
fn test_closures_survive_stress_collection() {
    let mut vm = stressed_vm();
    let source = r#"
fun adder(n) {
  fun add(x) { return x + n; }
  return add;
}
var add5 = adder(5);
var add10 = adder(10);
print add5(1) + add10(1);
"#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok, "{}", vm.diagnostics());
    assert_eq!(vm.output(), "17\n");
    assert!(vm.heap().stats().collections > 0);
}

#[test]
fn test_concatenation_operands_stay_rooted() {
    let mut vm = stressed_vm();
    let source = r#"
fun greet(name) { return "hello, " + name + "!"; }
print greet("a" + "b");
"#;
    assert_eq!(vm.interpret(source), InterpretResult::Ok, "{}", vm.diagnostics());
    assert_eq!(vm.output(), "hello, ab!\n");
}

#[test]
fn test_globals_survive_between_runs() {
    let mut vm = stressed_vm();
    vm.interpret("var keep = \"kept\" + \"!\";");
    vm.interpret("var garbage = 0; for (var i = 0; i < 10; i = i + 1) garbage = \"x\" + \"y\";");
    vm.collect_garbage();
    assert_eq!(vm.interpret("print keep;"), InterpretResult::Ok);
    assert_eq!(vm.output(), "kept!\n");
}

#[test]
fn test_live_bytes_stable_after_garbage_run() {
    let mut vm = VM::new();
    vm.interpret("var counter = 0;");
    vm.collect_garbage();
    let live = vm.heap().bytes_allocated();
    let objects = vm.heap().object_count();

    vm.interpret("{ var s = \"\"; for (var i = 0; i < 50; i = i + 1) s = s + \"z\"; }");
    vm.collect_garbage();

    assert_eq!(vm.heap().bytes_allocated(), live);
    assert_eq!(vm.heap().object_count(), objects);
}

#[test]
fn test_threshold_grows_with_live_data() {
    let config = VmConfig::default().with_gc(GcConfig::default().with_initial_threshold(512));
    let mut vm = VM::with_config(config);
    let source = "var s = \"\"; for (var i = 0; i < 300; i = i + 1) s = s + \"q\"; print s == s;";
    assert_eq!(vm.interpret(source), InterpretResult::Ok);
    let heap = vm.heap();
    assert!(heap.stats().collections > 0);
    assert!(heap.stats().bytes_freed > 0);
}

#[test]
fn test_runtime_error_under_stress_leaves_heap_consistent() {
    let mut vm = stressed_vm();
    assert_eq!(
        vm.interpret("fun f(a) { var s = a + \"!\"; return s - 1; } f(\"x\");"),
        InterpretResult::RuntimeError
    );
    vm.collect_garbage();
    assert_eq!(vm.interpret("print \"x\" + \"!\";"), InterpretResult::Ok);
    assert_eq!(vm.output(), "x!\n");
}
