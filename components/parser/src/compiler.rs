//! Single-pass Pratt compiler
//!
//! Pulls tokens from a [`TokenSource`] and emits bytecode straight into the
//! chunk of the function being compiled; there is no syntax tree. Nested
//! function declarations push a new per-function state and pop it when their
//! body ends.
//!
//! Everything the compiler allocates (interned names, string literals,
//! finished functions) goes through the shared [`Heap`]. While compiling, the
//! GC roots are the caller's roots plus the names and constants of every
//! function still being built.

use crate::error::error_at;
use crate::scanner::{Token, TokenKind, TokenSource};
use bytecode_system::{Chunk, OpCode};
use core_types::{CompileError, ObjRef, Value};
use memory_manager::{Function, Heap, RootSource};
use tracing::debug;

/// Locals addressable by a one-byte slot operand
const MAX_LOCALS: usize = 256;

/// Captured variables addressable by a one-byte operand
const MAX_UPVALUES: usize = 256;

/// Parameters and arguments per call
const MAX_ARITY: usize = 255;

/// Compile a whole program into its top-level script function.
///
/// `roots` are the caller's live values; they are kept alive along with the
/// compiler's own in-flight data if a collection runs during compilation.
/// Compilation always runs to the end of input and reports every diagnostic
/// it found, at most one per statement.
///
/// # Examples
///
/// ```
/// use memory_manager::{Heap, NoRoots};
/// use parser::{compile, Scanner};
///
/// let mut heap = Heap::new();
/// let script = compile(Scanner::new("print 1 + 2;"), &mut heap, &NoRoots).unwrap();
/// assert_eq!(heap.as_function(script).arity, 0);
///
/// let errors = compile(Scanner::new("print ;"), &mut heap, &NoRoots).unwrap_err();
/// assert_eq!(errors[0].to_string(), "[line 1] Error at ';': Expect expression.");
/// ```
pub fn compile<'src, T: TokenSource<'src>>(
    tokens: T,
    heap: &mut Heap,
    roots: &dyn RootSource,
) -> Result<ObjRef, Vec<CompileError>> {
    let mut compiler = Compiler::new(tokens, heap, roots);
    compiler.advance();
    while !compiler.matches(TokenKind::Eof) {
        compiler.declaration();
    }
    let (script, _) = compiler.end_function();

    if compiler.errors.is_empty() {
        Ok(script)
    } else {
        debug!(errors = compiler.errors.len(), "compile failed");
        Err(compiler.errors)
    }
}

/// Binding power, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

/// Parse handlers named by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseFn {
    Grouping,
    Call,
    Unary,
    Binary,
    Variable,
    String,
    Number,
    Literal,
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
struct ParseRule {
    prefix: Option<ParseFn>,
    infix: Option<ParseFn>,
    precedence: Precedence,
}

fn rule(kind: TokenKind) -> ParseRule {
    use TokenKind as K;
    let (prefix, infix, precedence) = match kind {
        K::LeftParen => (Some(ParseFn::Grouping), Some(ParseFn::Call), Precedence::Call),
        K::Minus => (Some(ParseFn::Unary), Some(ParseFn::Binary), Precedence::Term),
        K::Plus => (None, Some(ParseFn::Binary), Precedence::Term),
        K::Slash | K::Star => (None, Some(ParseFn::Binary), Precedence::Factor),
        K::Bang => (Some(ParseFn::Unary), None, Precedence::None),
        K::BangEqual | K::EqualEqual => (None, Some(ParseFn::Binary), Precedence::Equality),
        K::Greater | K::GreaterEqual | K::Less | K::LessEqual => {
            (None, Some(ParseFn::Binary), Precedence::Comparison)
        }
        K::Identifier => (Some(ParseFn::Variable), None, Precedence::None),
        K::String => (Some(ParseFn::String), None, Precedence::None),
        K::Number => (Some(ParseFn::Number), None, Precedence::None),
        K::And => (None, Some(ParseFn::And), Precedence::And),
        K::Or => (None, Some(ParseFn::Or), Precedence::Or),
        K::False | K::True | K::Nil => (Some(ParseFn::Literal), None, Precedence::None),
        K::RightParen
        | K::LeftBrace
        | K::RightBrace
        | K::Comma
        | K::Dot
        | K::Semicolon
        | K::Equal
        | K::Class
        | K::Else
        | K::For
        | K::Fun
        | K::If
        | K::Print
        | K::Return
        | K::Super
        | K::This
        | K::Var
        | K::While
        | K::Error
        | K::Eof => (None, None, Precedence::None),
    };
    ParseRule {
        prefix,
        infix,
        precedence,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    Script,
    Function,
}

#[derive(Debug, Clone, Copy)]
struct Local<'src> {
    name: &'src str,
    /// `None` while the initializer is being compiled
    depth: Option<u32>,
    is_captured: bool,
}

/// How a closure reaches a captured variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UpvalueRef {
    /// Slot in the enclosing frame, or index into the enclosing closure's upvalues
    index: u8,
    /// Whether `index` names a local of the immediately enclosing function
    is_local: bool,
}

/// Per-function compilation state
#[derive(Debug)]
struct FunctionState<'src> {
    function: Function,
    kind: FunctionKind,
    locals: Vec<Local<'src>>,
    upvalues: Vec<UpvalueRef>,
    scope_depth: u32,
}

impl<'src> FunctionState<'src> {
    fn new(kind: FunctionKind, name: Option<ObjRef>) -> Self {
        let mut locals = Vec::with_capacity(MAX_LOCALS);
        // Slot zero holds the callee.
        locals.push(Local {
            name: "",
            depth: Some(0),
            is_captured: false,
        });
        Self {
            function: Function {
                name,
                ..Function::default()
            },
            kind,
            locals,
            upvalues: Vec::new(),
            scope_depth: 0,
        }
    }
}

/// GC roots while compiling
struct CompilerRoots<'r, 'src> {
    outer: &'r dyn RootSource,
    states: &'r [FunctionState<'src>],
    finished: Option<&'r Function>,
}

impl RootSource for CompilerRoots<'_, '_> {
    fn mark_roots(&self, heap: &mut Heap) {
        self.outer.mark_roots(heap);
        let functions = self
            .states
            .iter()
            .map(|state| &state.function)
            .chain(self.finished);
        for function in functions {
            if let Some(name) = function.name {
                heap.mark_object(name);
            }
            for constant in &function.chunk.constants {
                heap.mark_value(*constant);
            }
        }
    }
}

struct Compiler<'src, 'a, T> {
    tokens: T,
    heap: &'a mut Heap,
    roots: &'a dyn RootSource,
    current: Token<'src>,
    previous: Token<'src>,
    panic_mode: bool,
    errors: Vec<CompileError>,
    states: Vec<FunctionState<'src>>,
}

impl<'src, 'a, T: TokenSource<'src>> Compiler<'src, 'a, T> {
    fn new(tokens: T, heap: &'a mut Heap, roots: &'a dyn RootSource) -> Self {
        let start = Token::new(TokenKind::Eof, "", 1);
        Self {
            tokens,
            heap,
            roots,
            current: start,
            previous: start,
            panic_mode: false,
            errors: Vec::new(),
            states: vec![FunctionState::new(FunctionKind::Script, None)],
        }
    }

    // Token handling.

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.tokens.next_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let token = self.current;
            self.error_at(token, token.lexeme);
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
        } else {
            self.error_at_current(message);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    // Diagnostics.

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        let error = error_at(&token, message);
        debug!(%error, "compile error");
        self.errors.push(error);
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => self.advance(),
            }
        }
    }

    // Heap access.

    fn intern(&mut self, text: &str) -> ObjRef {
        let roots = CompilerRoots {
            outer: self.roots,
            states: &self.states,
            finished: None,
        };
        self.heap.intern(text, &roots)
    }

    // Emission.

    fn state(&mut self) -> &mut FunctionState<'src> {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    fn chunk(&mut self) -> &mut Chunk {
        &mut self.state().function.chunk
    }

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk().write(byte, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op.into());
    }

    fn emit_op_operand(&mut self, op: OpCode, operand: u8) {
        self.emit_op(op);
        self.emit_byte(operand);
    }

    fn emit_return(&mut self) {
        self.emit_op(OpCode::Nil);
        self.emit_op(OpCode::Return);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        match self.chunk().add_constant(value) {
            Ok(index) => index,
            Err(err) => {
                self.error(&err.to_string());
                0
            }
        }
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_op_operand(OpCode::Constant, index);
    }

    /// Emit a forward jump with a placeholder offset; returns the operand position
    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit_op(op);
        self.emit_byte(0xff);
        self.emit_byte(0xff);
        self.chunk().len() - 2
    }

    fn patch_jump(&mut self, operand: usize) {
        let distance = self.chunk().len() - operand - 2;
        match u16::try_from(distance) {
            Ok(distance) => self.chunk().patch_u16(operand, distance),
            Err(_) => self.error("Too much code to jump over."),
        }
    }

    fn emit_loop(&mut self, loop_start: usize) {
        self.emit_op(OpCode::Loop);
        let distance = self.chunk().len() - loop_start + 2;
        let [hi, lo] = match u16::try_from(distance) {
            Ok(distance) => distance.to_be_bytes(),
            Err(_) => {
                self.error("Loop body too large.");
                [0, 0]
            }
        };
        self.emit_byte(hi);
        self.emit_byte(lo);
    }

    /// Finish the innermost function and allocate it.
    ///
    /// Returns the function handle and the upvalue descriptors the enclosing
    /// function must emit after its `Closure` instruction.
    fn end_function(&mut self) -> (ObjRef, Vec<UpvalueRef>) {
        self.emit_return();
        let Some(state) = self.states.pop() else {
            unreachable!("the script state is never popped before the end");
        };
        let mut function = state.function;
        function.upvalue_count = state.upvalues.len();

        let roots = CompilerRoots {
            outer: self.roots,
            states: &self.states,
            finished: Some(&function),
        };
        let handle = self.heap.alloc_function(function.clone(), &roots);
        let shown = self.heap.display(Value::Obj(handle)).to_string();
        debug!(
            function = %shown,
            bytes = self.heap.as_function(handle).chunk.len(),
            "compiled"
        );
        (handle, state.upvalues)
    }

    // Scopes and variables.

    fn begin_scope(&mut self) {
        self.state().scope_depth += 1;
    }

    fn end_scope(&mut self) {
        let state = self.state();
        state.scope_depth -= 1;
        let depth = state.scope_depth;

        while let Some(local) = self.state().locals.last().copied() {
            if local.depth.is_some_and(|d| d <= depth) {
                break;
            }
            if local.is_captured {
                self.emit_op(OpCode::CloseUpvalue);
            } else {
                self.emit_op(OpCode::Pop);
            }
            self.state().locals.pop();
        }
    }

    fn identifier_constant(&mut self, name: &str) -> u8 {
        let handle = self.intern(name);
        self.make_constant(Value::Obj(handle))
    }

    fn add_local(&mut self, name: &'src str) {
        if self.state().locals.len() == MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.state().locals.push(Local {
            name,
            depth: None,
            is_captured: false,
        });
    }

    fn declare_variable(&mut self) {
        let state = self.state();
        if state.scope_depth == 0 {
            return;
        }
        let depth = state.scope_depth;
        let name = self.previous.lexeme;

        let duplicate = self
            .state()
            .locals
            .iter()
            .rev()
            .take_while(|local| local.depth.map_or(true, |d| d >= depth))
            .any(|local| local.name == name);
        if duplicate {
            self.error("Already a variable with this name in this scope.");
        }
        self.add_local(name);
    }

    fn parse_variable(&mut self, message: &str) -> u8 {
        self.consume(TokenKind::Identifier, message);
        self.declare_variable();
        if self.state().scope_depth > 0 {
            return 0;
        }
        let name = self.previous.lexeme;
        self.identifier_constant(name)
    }

    fn mark_initialized(&mut self) {
        let state = self.state();
        if state.scope_depth == 0 {
            return;
        }
        let depth = state.scope_depth;
        if let Some(local) = state.locals.last_mut() {
            local.depth = Some(depth);
        }
    }

    fn define_variable(&mut self, global: u8) {
        if self.state().scope_depth > 0 {
            self.mark_initialized();
            return;
        }
        self.emit_op_operand(OpCode::DefineGlobal, global);
    }

    fn resolve_local(&mut self, level: usize, name: &str) -> Option<u8> {
        let found = self.states[level]
            .locals
            .iter()
            .enumerate()
            .rev()
            .find(|(_, local)| local.name == name)
            .map(|(slot, local)| (slot, local.depth));

        let (slot, depth) = found?;
        if depth.is_none() {
            self.error("Can't read local variable in its own initializer.");
        }
        Some(slot as u8)
    }

    fn resolve_upvalue(&mut self, level: usize, name: &str) -> Option<u8> {
        if level == 0 {
            return None;
        }
        if let Some(local) = self.resolve_local(level - 1, name) {
            self.states[level - 1].locals[local as usize].is_captured = true;
            return Some(self.add_upvalue(level, local, true));
        }
        let upvalue = self.resolve_upvalue(level - 1, name)?;
        Some(self.add_upvalue(level, upvalue, false))
    }

    fn add_upvalue(&mut self, level: usize, index: u8, is_local: bool) -> u8 {
        let wanted = UpvalueRef { index, is_local };
        let upvalues = &self.states[level].upvalues;
        if let Some(existing) = upvalues.iter().position(|u| *u == wanted) {
            return existing as u8;
        }
        if upvalues.len() == MAX_UPVALUES {
            self.error("Too many closure variables in function.");
            return 0;
        }
        self.states[level].upvalues.push(wanted);
        (self.states[level].upvalues.len() - 1) as u8
    }

    fn named_variable(&mut self, name: &'src str, can_assign: bool) {
        let level = self.states.len() - 1;
        let (get, set, operand) = if let Some(slot) = self.resolve_local(level, name) {
            (OpCode::GetLocal, OpCode::SetLocal, slot)
        } else if let Some(index) = self.resolve_upvalue(level, name) {
            (OpCode::GetUpvalue, OpCode::SetUpvalue, index)
        } else {
            let constant = self.identifier_constant(name);
            (OpCode::GetGlobal, OpCode::SetGlobal, constant)
        };

        if can_assign && self.matches(TokenKind::Equal) {
            self.expression();
            self.emit_op_operand(set, operand);
        } else {
            self.emit_op_operand(get, operand);
        }
    }

    // Declarations and statements.

    fn declaration(&mut self) {
        if self.matches(TokenKind::Fun) {
            self.fun_declaration();
        } else if self.matches(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }
        if self.panic_mode {
            self.synchronize();
        }
    }

    fn fun_declaration(&mut self) {
        let global = self.parse_variable("Expect function name.");
        // A function may refer to itself, so its name is usable in the body.
        self.mark_initialized();
        self.function(FunctionKind::Function);
        self.define_variable(global);
    }

    fn function(&mut self, kind: FunctionKind) {
        let name = self.previous.lexeme;
        let name = self.intern(name);
        self.states.push(FunctionState::new(kind, Some(name)));
        self.begin_scope();

        self.consume(TokenKind::LeftParen, "Expect '(' after function name.");
        if !self.check(TokenKind::RightParen) {
            loop {
                if self.state().function.arity as usize == MAX_ARITY {
                    self.error_at_current("Can't have more than 255 parameters.");
                } else {
                    self.state().function.arity += 1;
                }
                let constant = self.parse_variable("Expect parameter name.");
                self.define_variable(constant);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.");
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.");
        self.block();

        let (function, upvalues) = self.end_function();
        let constant = self.make_constant(Value::Obj(function));
        self.emit_op_operand(OpCode::Closure, constant);
        for upvalue in upvalues {
            self.emit_byte(u8::from(upvalue.is_local));
            self.emit_byte(upvalue.index);
        }
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");
        if self.matches(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        );
        self.define_variable(global);
    }

    fn statement(&mut self) {
        if self.matches(TokenKind::Print) {
            self.print_statement();
        } else if self.matches(TokenKind::If) {
            self.if_statement();
        } else if self.matches(TokenKind::Return) {
            self.return_statement();
        } else if self.matches(TokenKind::While) {
            self.while_statement();
        } else if self.matches(TokenKind::For) {
            self.for_statement();
        } else if self.matches(TokenKind::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn block(&mut self) {
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.declaration();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.");
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value.");
        self.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        self.emit_op(OpCode::Pop);
    }

    fn return_statement(&mut self) {
        if self.state().kind == FunctionKind::Script {
            self.error("Can't return from top-level code.");
        }
        if self.matches(TokenKind::Semicolon) {
            self.emit_return();
        } else {
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after return value.");
            self.emit_op(OpCode::Return);
        }
    }

    fn if_statement(&mut self) {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let then_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();
        let else_jump = self.emit_jump(OpCode::Jump);

        self.patch_jump(then_jump);
        self.emit_op(OpCode::Pop);
        if self.matches(TokenKind::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.chunk().len();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_op(OpCode::Pop);
    }

    fn for_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.");
        if self.matches(TokenKind::Semicolon) {
            // No initializer.
        } else if self.matches(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.chunk().len();
        let mut exit_jump = None;
        if !self.matches(TokenKind::Semicolon) {
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.");
            exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
            self.emit_op(OpCode::Pop);
        }

        if !self.matches(TokenKind::RightParen) {
            let body_jump = self.emit_jump(OpCode::Jump);
            let increment_start = self.chunk().len();
            self.expression();
            self.emit_op(OpCode::Pop);
            self.consume(TokenKind::RightParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit_op(OpCode::Pop);
        }
        self.end_scope();
    }

    // Expressions.

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix) = rule(self.previous.kind).prefix else {
            self.error("Expect expression.");
            return;
        };
        let can_assign = precedence <= Precedence::Assignment;
        self.apply(prefix, can_assign);

        while precedence <= rule(self.current.kind).precedence {
            self.advance();
            if let Some(infix) = rule(self.previous.kind).infix {
                self.apply(infix, can_assign);
            }
        }

        if can_assign && self.matches(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    fn apply(&mut self, parse_fn: ParseFn, can_assign: bool) {
        match parse_fn {
            ParseFn::Grouping => self.grouping(),
            ParseFn::Call => self.call(),
            ParseFn::Unary => self.unary(),
            ParseFn::Binary => self.binary(),
            ParseFn::Variable => self.named_variable(self.previous.lexeme, can_assign),
            ParseFn::String => self.string(),
            ParseFn::Number => self.number(),
            ParseFn::Literal => self.literal(),
            ParseFn::And => self.and(),
            ParseFn::Or => self.or(),
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn number(&mut self) {
        match self.previous.lexeme.parse::<f64>() {
            Ok(value) => self.emit_constant(Value::Number(value)),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn string(&mut self) {
        let lexeme = self.previous.lexeme;
        let text = &lexeme[1..lexeme.len() - 1];
        let handle = self.intern(text);
        self.emit_constant(Value::Obj(handle));
    }

    fn literal(&mut self) {
        match self.previous.kind {
            TokenKind::False => self.emit_op(OpCode::False),
            TokenKind::True => self.emit_op(OpCode::True),
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            _ => {}
        }
    }

    fn unary(&mut self) {
        let operator = self.previous.kind;
        self.parse_precedence(Precedence::Unary);
        match operator {
            TokenKind::Bang => self.emit_op(OpCode::Not),
            TokenKind::Minus => self.emit_op(OpCode::Negate),
            _ => {}
        }
    }

    fn binary(&mut self) {
        let operator = self.previous.kind;
        self.parse_precedence(rule(operator).precedence.next());

        match operator {
            TokenKind::BangEqual => {
                self.emit_op(OpCode::Equal);
                self.emit_op(OpCode::Not);
            }
            TokenKind::EqualEqual => self.emit_op(OpCode::Equal),
            TokenKind::Greater => self.emit_op(OpCode::Greater),
            TokenKind::GreaterEqual => {
                self.emit_op(OpCode::Less);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Less => self.emit_op(OpCode::Less),
            TokenKind::LessEqual => {
                self.emit_op(OpCode::Greater);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Plus => self.emit_op(OpCode::Add),
            TokenKind::Minus => self.emit_op(OpCode::Subtract),
            TokenKind::Star => self.emit_op(OpCode::Multiply),
            TokenKind::Slash => self.emit_op(OpCode::Divide),
            _ => {}
        }
    }

    fn call(&mut self) {
        let count = self.argument_list();
        self.emit_op_operand(OpCode::Call, count);
    }

    fn argument_list(&mut self) -> u8 {
        let mut count: usize = 0;
        if !self.check(TokenKind::RightParen) {
            loop {
                self.expression();
                if count == MAX_ARITY {
                    self.error("Can't have more than 255 arguments.");
                }
                count += 1;
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after arguments.");
        count.min(MAX_ARITY) as u8
    }

    fn and(&mut self) {
        let end_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.parse_precedence(Precedence::And);
        self.patch_jump(end_jump);
    }

    fn or(&mut self) {
        let else_jump = self.emit_jump(OpCode::JumpIfFalse);
        let end_jump = self.emit_jump(OpCode::Jump);
        self.patch_jump(else_jump);
        self.emit_op(OpCode::Pop);
        self.parse_precedence(Precedence::Or);
        self.patch_jump(end_jump);
    }
}
