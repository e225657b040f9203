//! Compile error helpers

use crate::scanner::{Token, TokenKind};
use core_types::CompileError;

/// Build a diagnostic located at `token`
///
/// The location reads ` at end` for end of input, is empty for scan errors
/// (their lexeme is the message itself) and ` at 'lexeme'` otherwise.
pub fn error_at(token: &Token<'_>, message: impl Into<String>) -> CompileError {
    let location = match token.kind {
        TokenKind::Eof => " at end".to_string(),
        TokenKind::Error => String::new(),
        _ => format!(" at '{}'", token.lexeme),
    };
    CompileError {
        line: token.line,
        location,
        message: message.into(),
    }
}
