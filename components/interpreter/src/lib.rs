//! Bytecode virtual machine for Lox
//!
//! This crate provides the stack-based VM with:
//! - A fixed-capacity value stack and call-frame stack
//! - Closures with shared, closable upvalue cells
//! - Globals keyed by interned name
//! - Mark-and-sweep collection rooted in the VM's own state
//! - Bounded `print` output that hosts read back
//!
//! # Example
//!
//! ```
//! use core_types::InterpretResult;
//! use interpreter::VM;
//!
//! let mut vm = VM::new();
//! let source = "fun fib(n) { if (n < 2) return n; return fib(n - 2) + fib(n - 1); } print fib(10);";
//! assert_eq!(vm.interpret(source), InterpretResult::Ok);
//! assert_eq!(vm.output(), "55\n");
//! assert_eq!(vm.frame_depth(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call_frame;
pub mod dispatch;
pub mod gc_integration;
pub mod output;
pub mod upvalue;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::{CallFrame, FRAMES_MAX};
pub use output::{OutputBuffer, DEFAULT_OUTPUT_CAPACITY};
pub use upvalue::OpenUpvalues;
pub use vm::{VmConfig, STACK_MAX, VM};
