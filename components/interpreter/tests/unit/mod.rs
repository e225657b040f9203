//! Unit tests for interpreter components

use core_types::{InterpretResult, ObjRef, Value};
use interpreter::{CallFrame, OpenUpvalues, OutputBuffer, VmConfig, FRAMES_MAX, STACK_MAX, VM};
use memory_manager::GcConfig;

// ============================================================================
// VM Tests
// ============================================================================

#[test]
fn test_vm_creation() {
    let vm = VM::new();
    assert_eq!(vm.frame_depth(), 0);
    assert_eq!(vm.stack_len(), 0);
    assert!(vm.output().is_empty());
    assert!(vm.global("undefined").is_none());
}

#[test]
fn test_vm_global_variables() {
    let mut vm = VM::new();
    vm.interpret("var x = 10; var flag = true; var name = \"lox\";");

    assert_eq!(vm.global("x"), Some(Value::Number(10.0)));
    assert_eq!(vm.global("flag"), Some(Value::Bool(true)));
    let name = vm.global("name").unwrap();
    assert_eq!(vm.display(name), "lox");
}

#[test]
fn test_default_config() {
    let config = VmConfig::default();
    assert_eq!(config.stack_max, STACK_MAX);
    assert_eq!(STACK_MAX, FRAMES_MAX * 256);
    assert!(!config.gc.stress);
}

#[test]
fn test_config_reaches_heap() {
    let config = VmConfig::default().with_gc(GcConfig::default().with_stress(true));
    let vm = VM::with_config(config);
    assert!(vm.heap().config().stress);
}

#[test]
fn test_define_native() {
    fn answer(_args: &[Value]) -> Value {
        Value::Number(42.0)
    }

    let mut vm = VM::new();
    vm.define_native("answer", answer);
    assert_eq!(vm.interpret("print answer(1, 2);"), InterpretResult::Ok);
    assert_eq!(vm.output(), "42\n");
}

#[test]
fn test_native_receives_arguments() {
    fn count(args: &[Value]) -> Value {
        Value::Number(args.len() as f64)
    }

    let mut vm = VM::new();
    vm.define_native("count", count);
    vm.interpret("print count(); print count(nil, nil, nil);");
    assert_eq!(vm.output(), "0\n3\n");
}

#[test]
fn test_take_output_and_diagnostics() {
    let mut vm = VM::new();
    vm.interpret("print 1; print nil + 1;");
    assert_eq!(vm.take_output(), "1\n");
    assert!(vm.take_diagnostics().starts_with("Operands must be two numbers or two strings."));
    assert!(vm.output().is_empty());
    assert!(vm.diagnostics().is_empty());
}

#[test]
fn test_output_capacity() {
    let mut vm = VM::with_config(VmConfig::default().with_output_capacity(6));
    vm.interpret("print 1; print 2; print 3; print 4;");
    assert_eq!(vm.output(), "1\n2\n3\n");
    assert!(vm.output_buffer().truncated());
}

// ============================================================================
// Value display
// ============================================================================

#[test]
fn test_print_forms() {
    let mut vm = VM::new();
    vm.interpret(
        "print true; print nil; print 0.1; print -0; print 100000000000000000000; \
         fun f() {} print f; print clock;",
    );
    assert_eq!(
        vm.output(),
        "true\nnil\n0.1\n-0\n1e20\n<fn f>\n<native fn>\n"
    );
}

// ============================================================================
// Call frames and upvalue bookkeeping
// ============================================================================

#[test]
fn test_call_frame_new() {
    let frame = CallFrame::new(ObjRef(3), ObjRef(2), 7);
    assert_eq!(frame.ip, 0);
    assert_eq!(frame.slots, 7);
}

#[test]
fn test_open_upvalues_split() {
    let mut open = OpenUpvalues::new();
    open.insert(3, ObjRef(0));
    open.insert(1, ObjRef(1));
    assert_eq!(open.split_from(2), vec![(3, ObjRef(0))]);
    assert_eq!(open.find(1), Some(ObjRef(1)));
}

#[test]
fn test_output_buffer_default_capacity() {
    assert_eq!(OutputBuffer::default().capacity(), 1024 * 1024);
}
