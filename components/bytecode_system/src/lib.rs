//! Bytecode system for the Lox virtual machine
//!
//! This crate provides the instruction set and the [`Chunk`] container the
//! compiler emits into and the interpreter executes.
//!
//! # Features
//!
//! - Stack-based, one-byte opcodes with inline operands
//! - Per-byte source line table for diagnostics
//! - Constant pool addressed by a one-byte index (at most 256 entries)
//!
//! # Example
//!
//! ```
//! use bytecode_system::{Chunk, OpCode};
//! use core_types::Value;
//!
//! let mut chunk = Chunk::new();
//!
//! let idx = chunk.add_constant(Value::Number(42.0)).unwrap();
//! chunk.write_op(OpCode::Constant, 1);
//! chunk.write(idx, 1);
//! chunk.write_op(OpCode::Return, 1);
//!
//! assert_eq!(chunk.len(), 3);
//! assert_eq!(chunk.line(1), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod opcode;

// Re-export main types at crate root
pub use chunk::{Chunk, ChunkError, MAX_CONSTANTS};
pub use opcode::{OpCode, UnknownOpCode};
