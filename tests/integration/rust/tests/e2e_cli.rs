//! End-to-end tests through the CLI runtime

use interpreter::VmConfig;
use lox_cli::{CliError, Runtime};
use memory_manager::GcConfig;

#[test]
fn test_e2e_repl_style_session() {
    let mut runtime = Runtime::default();
    runtime.execute_string("var count = 0;").unwrap();
    runtime
        .execute_string("fun bump() { count = count + 1; return count; }")
        .unwrap();
    runtime.execute_string("bump(); bump();").unwrap();
    runtime.execute_string("print count;").unwrap();
    assert_eq!(runtime.take_output(), "2\n");
}

#[test]
fn test_e2e_errors_do_not_poison_the_session() {
    let mut runtime = Runtime::default();
    assert!(matches!(runtime.execute_string("print ;"), Err(CliError::Compile(_))));
    assert!(matches!(runtime.execute_string("print x;"), Err(CliError::Runtime(_))));
    runtime.execute_string("print \"fine\";").unwrap();
    assert_eq!(runtime.take_output(), "fine\n");
    assert_eq!(runtime.vm().frame_depth(), 0);
}

#[test]
fn test_e2e_configured_runtime() {
    let config = VmConfig::default()
        .with_stack_max(1024)
        .with_gc(GcConfig::default().with_stress(true));
    let mut runtime = Runtime::new(config);
    runtime
        .execute_string("fun f(n) { if (n == 0) return \"done\"; return f(n - 1); } print f(50);")
        .unwrap();
    assert_eq!(runtime.take_output(), "done\n");
}

#[test]
fn test_e2e_clock_native() {
    let mut runtime = Runtime::default();
    runtime
        .execute_string("var start = clock(); var end = clock(); print end >= start;")
        .unwrap();
    assert_eq!(runtime.take_output(), "true\n");
}
