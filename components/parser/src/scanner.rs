//! Lox scanner - turns source text into tokens on demand
//!
//! The scanner never fails: malformed input produces a [`TokenKind::Error`]
//! token whose lexeme is the error message, and the compiler reports it.

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single-character tokens.
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `;`
    Semicolon,
    /// `/`
    Slash,
    /// `*`
    Star,

    // One or two character tokens.
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,

    // Literals.
    /// Identifier
    Identifier,
    /// String literal, lexeme includes the quotes
    String,
    /// Number literal
    Number,

    // Keywords.
    /// `and`
    And,
    /// `class`
    Class,
    /// `else`
    Else,
    /// `false`
    False,
    /// `for`
    For,
    /// `fun`
    Fun,
    /// `if`
    If,
    /// `nil`
    Nil,
    /// `or`
    Or,
    /// `print`
    Print,
    /// `return`
    Return,
    /// `super`
    Super,
    /// `this`
    This,
    /// `true`
    True,
    /// `var`
    Var,
    /// `while`
    While,

    /// Scan error, the lexeme holds the message
    Error,
    /// End of input
    Eof,
}

/// A token borrowing its lexeme from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// Token category
    pub kind: TokenKind,
    /// Source text, or the message for [`TokenKind::Error`]
    pub lexeme: &'src str,
    /// 1-based source line
    pub line: u32,
}

impl<'src> Token<'src> {
    /// Create a token
    pub fn new(kind: TokenKind, lexeme: &'src str, line: u32) -> Self {
        Self { kind, lexeme, line }
    }
}

/// Anything the compiler can pull tokens from.
///
/// After the input is exhausted every call must return [`TokenKind::Eof`].
pub trait TokenSource<'src> {
    /// Next token
    fn next_token(&mut self) -> Token<'src>;
}

/// On-demand scanner over a source string
///
/// # Examples
///
/// ```
/// use parser::{Scanner, TokenKind, TokenSource};
///
/// let mut scanner = Scanner::new("print 1;");
/// assert_eq!(scanner.next_token().kind, TokenKind::Print);
/// assert_eq!(scanner.next_token().kind, TokenKind::Number);
/// assert_eq!(scanner.next_token().kind, TokenKind::Semicolon);
/// assert_eq!(scanner.next_token().kind, TokenKind::Eof);
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'src> {
    source: &'src str,
    start: usize,
    current: usize,
    line: u32,
}

impl<'src> Scanner<'src> {
    /// Create a scanner positioned at the start of `source`
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scan the next token
    pub fn scan_token(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        if is_alpha(c) {
            return self.identifier();
        }
        if c.is_ascii_digit() {
            return self.number();
        }

        match c {
            b'(' => self.make_token(TokenKind::LeftParen),
            b')' => self.make_token(TokenKind::RightParen),
            b'{' => self.make_token(TokenKind::LeftBrace),
            b'}' => self.make_token(TokenKind::RightBrace),
            b';' => self.make_token(TokenKind::Semicolon),
            b',' => self.make_token(TokenKind::Comma),
            b'.' => self.make_token(TokenKind::Dot),
            b'-' => self.make_token(TokenKind::Minus),
            b'+' => self.make_token(TokenKind::Plus),
            b'/' => self.make_token(TokenKind::Slash),
            b'*' => self.make_token(TokenKind::Star),
            b'!' => self.one_or_two(TokenKind::BangEqual, TokenKind::Bang),
            b'=' => self.one_or_two(TokenKind::EqualEqual, TokenKind::Equal),
            b'<' => self.one_or_two(TokenKind::LessEqual, TokenKind::Less),
            b'>' => self.one_or_two(TokenKind::GreaterEqual, TokenKind::Greater),
            b'"' => self.string(),
            _ => self.error_token("Unexpected character."),
        }
    }

    fn one_or_two(&mut self, two: TokenKind, one: TokenKind) -> Token<'src> {
        let kind = if self.matches(b'=') { two } else { one };
        self.make_token(kind)
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.current += 1;
        Some(c)
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                b' ' | b'\r' | b'\t' => self.current += 1,
                b'\n' => {
                    self.line += 1;
                    self.current += 1;
                }
                b'/' if self.peek_next() == Some(b'/') => {
                    while self.peek().is_some_and(|c| c != b'\n') {
                        self.current += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token<'src> {
        while let Some(c) = self.peek() {
            if c == b'"' {
                break;
            }
            if c == b'\n' {
                self.line += 1;
            }
            self.current += 1;
        }

        if self.peek().is_none() {
            return self.error_token("Unterminated string.");
        }

        // The closing quote.
        self.current += 1;
        self.make_token(TokenKind::String)
    }

    fn number(&mut self) -> Token<'src> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.current += 1;
        }

        if self.peek() == Some(b'.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.current += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.current += 1;
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn identifier(&mut self) -> Token<'src> {
        while self.peek().is_some_and(|c| is_alpha(c) || c.is_ascii_digit()) {
            self.current += 1;
        }
        let kind = keyword(&self.source[self.start..self.current]);
        self.make_token(kind)
    }

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token::new(kind, &self.source[self.start..self.current], self.line)
    }

    fn error_token(&self, message: &'static str) -> Token<'src> {
        Token::new(TokenKind::Error, message, self.line)
    }
}

impl<'src> TokenSource<'src> for Scanner<'src> {
    fn next_token(&mut self) -> Token<'src> {
        self.scan_token()
    }
}

/// Pre-scanned tokens; yields `Eof` once drained
impl<'src> TokenSource<'src> for std::vec::IntoIter<Token<'src>> {
    fn next_token(&mut self) -> Token<'src> {
        self.next().unwrap_or(Token::new(TokenKind::Eof, "", 0))
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn keyword(text: &str) -> TokenKind {
    match text {
        "and" => TokenKind::And,
        "class" => TokenKind::Class,
        "else" => TokenKind::Else,
        "false" => TokenKind::False,
        "for" => TokenKind::For,
        "fun" => TokenKind::Fun,
        "if" => TokenKind::If,
        "nil" => TokenKind::Nil,
        "or" => TokenKind::Or,
        "print" => TokenKind::Print,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "this" => TokenKind::This,
        "true" => TokenKind::True,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        _ => TokenKind::Identifier,
    }
}
