//! Error types for the CLI

use thiserror::Error;

/// Exit status for a script that failed to compile
pub const EXIT_COMPILE_ERROR: i32 = 65;

/// Exit status for a script that raised a runtime error
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// Exit status for an unreadable input or broken terminal
pub const EXIT_IO_ERROR: i32 = 74;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O error
    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),

    /// Compile diagnostics, one per line
    #[error("{0}")]
    Compile(String),

    /// Runtime error message and stack trace
    #[error("{0}")]
    Runtime(String),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Compile(_) => EXIT_COMPILE_ERROR,
            CliError::Runtime(_) => EXIT_RUNTIME_ERROR,
            CliError::Io(_) | CliError::Repl(_) => EXIT_IO_ERROR,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
