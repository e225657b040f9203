//! Lox front end
//!
//! Scans and compiles Lox source in a single pass straight to bytecode.
//!
//! # Overview
//!
//! - [`Scanner`] - Produces [`Token`]s on demand
//! - [`TokenSource`] - Any token supplier the compiler can pull from
//! - [`compile`] - Pratt compiler emitting into heap-allocated functions
//!
//! # Example
//!
//! ```
//! use memory_manager::{Heap, NoRoots};
//! use parser::{compile, Scanner};
//!
//! let mut heap = Heap::new();
//! let script = compile(Scanner::new("var x = 42;"), &mut heap, &NoRoots).unwrap();
//! assert!(!heap.as_function(script).chunk.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod compiler;
pub mod error;
pub mod scanner;

pub use compiler::compile;
pub use error::error_at;
pub use scanner::{Scanner, Token, TokenKind, TokenSource};
