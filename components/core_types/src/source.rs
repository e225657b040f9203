//! Stack frame type for runtime error traces.

use std::fmt;

/// Represents a single frame in a Lox call stack.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame {
///     function_name: Some("fib".to_string()),
///     line: 25,
/// };
/// assert_eq!(frame.to_string(), "[line 25] in fib()");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Name of the function, or None for the top-level script
    pub function_name: Option<String>,
    /// Line of the instruction the frame was executing
    pub line: u32,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function_name {
            Some(name) => write!(f, "[line {}] in {}()", self.line, name),
            None => write!(f, "[line {}] in script", self.line),
        }
    }
}
