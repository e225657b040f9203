//! Core value types and error handling for the Lox virtual machine.
//!
//! This crate provides the foundational types shared by every other
//! component: the tagged [`Value`] representation, the [`ObjRef`] handle into
//! the object heap, and the compile/runtime error types.
//!
//! # Overview
//!
//! - [`Value`] - Tagged union of `nil`, booleans, numbers and heap handles
//! - [`ObjRef`] - Stable index of a heap object
//! - [`CompileError`] - A single diagnostic produced by the compiler
//! - [`RuntimeError`] - A runtime failure together with its stack trace
//! - [`StackFrame`] - One line of a runtime stack trace
//!
//! # Examples
//!
//! ```
//! use core_types::Value;
//!
//! let num = Value::Number(0.0);
//! assert!(!num.is_falsey());
//! assert!(Value::Nil.is_falsey());
//! assert_eq!(Value::Number(1.0), Value::Number(1.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;
mod value;

pub use error::{CompileError, ErrorKind, InterpretError, InterpretResult, RuntimeError};
pub use source::StackFrame;
pub use value::{format_number, NativeFn, ObjRef, Value};
