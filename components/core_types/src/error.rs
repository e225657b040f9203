//! Compile and runtime error types.
//!
//! Both kinds are terminal for the current `interpret` call but never for the
//! host process.

use crate::StackFrame;
use thiserror::Error;

/// The kind of a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operand types do not fit the operator
    TypeError,
    /// Read or assignment of a global that was never defined
    UndefinedVariable,
    /// Call with the wrong number of arguments
    ArityMismatch,
    /// Call of a value that is not a function
    NotCallable,
    /// Value stack or call-frame stack exhausted
    StackOverflow,
    /// The chunk holds a byte or operand the VM cannot decode
    InvalidBytecode,
}

/// A single compiler diagnostic.
///
/// `location` is already rendered: `" at 'x'"`, `" at end"`, or empty for
/// errors reported by the scanner itself.
///
/// # Examples
///
/// ```
/// use core_types::CompileError;
///
/// let error = CompileError {
///     line: 3,
///     location: " at ';'".to_string(),
///     message: "Expect expression.".to_string(),
/// };
/// assert_eq!(error.to_string(), "[line 3] Error at ';': Expect expression.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct CompileError {
    /// Source line of the offending token
    pub line: u32,
    /// Rendered token location
    pub location: String,
    /// Human-readable message
    pub message: String,
}

/// A runtime error with the stack trace captured when it was raised.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    /// The category of the failure
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Active frames, innermost first
    pub stack: Vec<StackFrame>,
}

impl RuntimeError {
    /// Creates an error without trace; the VM fills `stack` when unwinding.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// Renders the message followed by one trace line per frame.
    pub fn report(&self) -> String {
        let mut out = self.message.clone();
        for frame in &self.stack {
            out.push('\n');
            out.push_str(&frame.to_string());
        }
        out
    }
}

/// Failure of a whole `interpret` run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    /// Compilation failed; nothing was executed
    #[error("compile error ({} diagnostic(s))", .0.len())]
    Compile(Vec<CompileError>),
    /// Execution started and raised a runtime error
    #[error("runtime error: {0}")]
    Runtime(RuntimeError),
}

/// Outcome of `VM::interpret`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    /// The script ran to completion
    Ok,
    /// The script did not compile
    CompileError,
    /// The script raised a runtime error
    RuntimeError,
}

impl From<&Result<(), InterpretError>> for InterpretResult {
    fn from(result: &Result<(), InterpretError>) -> Self {
        match result {
            Ok(()) => InterpretResult::Ok,
            Err(InterpretError::Compile(_)) => InterpretResult::CompileError,
            Err(InterpretError::Runtime(_)) => InterpretResult::RuntimeError,
        }
    }
}
