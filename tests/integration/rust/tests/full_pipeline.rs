//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Scanner -> Compiler -> Heap -> VM -> Output

use core_types::InterpretResult;
use interpreter::VM;

/// Helper function to run Lox source and return its output
fn execute(source: &str) -> Result<String, String> {
    let mut vm = VM::new();
    match vm.interpret(source) {
        InterpretResult::Ok => Ok(vm.take_output()),
        _ => Err(vm.take_diagnostics()),
    }
}

#[test]
fn test_full_pipeline_literals() {
    assert_eq!(execute("print 42; print 3.14; print true; print nil; print \"s\";").unwrap(), "42\n3.14\ntrue\nnil\ns\n");
}

#[test]
fn test_full_pipeline_precedence() {
    assert_eq!(execute("print 2 + 3 * 4 - 6 / 2;").unwrap(), "11\n");
    assert_eq!(execute("print -2 * -3;").unwrap(), "6\n");
    assert_eq!(execute("print !(1 < 2) == false;").unwrap(), "true\n");
}

#[test]
fn test_full_pipeline_assignment_is_right_associative() {
    assert_eq!(execute("var a; var b; a = b = 3; print a; print b;").unwrap(), "3\n3\n");
}

#[test]
fn test_full_pipeline_scopes() {
    let source = r#"
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
    assert_eq!(execute(source).unwrap(), "inner\nouter\nglobal\n");
}

#[test]
fn test_full_pipeline_fibonacci() {
    let source = r#"
fun fib(n) {
  if (n < 2) return n;
  return fib(n - 2) + fib(n - 1);
}
for (var i = 0; i < 10; i = i + 1) print fib(i);
"#;
    assert_eq!(execute(source).unwrap(), "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
}

#[test]
fn test_full_pipeline_functions_are_values() {
    let source = r#"
fun twice(f, x) { return f(f(x)); }
fun inc(n) { return n + 1; }
print twice(inc, 5);
print inc;
"#;
    assert_eq!(execute(source).unwrap(), "7\n<fn inc>\n");
}

#[test]
fn test_full_pipeline_implicit_nil_return() {
    assert_eq!(execute("fun f() {} print f();").unwrap(), "nil\n");
}

#[test]
fn test_full_pipeline_compile_errors() {
    let diagnostics = execute("var 1 = 2;\nprint \"ok\";\nfun f( {}\n").unwrap_err();
    assert_eq!(
        diagnostics,
        "[line 1] Error at '1': Expect variable name.\n\
         [line 3] Error at '{': Expect parameter name.\n"
    );
}

#[test]
fn test_full_pipeline_runtime_trace() {
    let source = "fun inner() { return 1 + nil; }\nfun outer() { return inner(); }\nouter();";
    let diagnostics = execute(source).unwrap_err();
    assert_eq!(
        diagnostics,
        "Operands must be two numbers or two strings.\n\
         [line 1] in inner()\n\
         [line 2] in outer()\n\
         [line 3] in script\n"
    );
}
