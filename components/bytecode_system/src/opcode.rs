//! Bytecode opcodes for the Lox virtual machine
//!
//! Every instruction is one opcode byte followed by its operands. Operand
//! widths are listed on each variant.

use thiserror::Error;

/// Bytecode opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // Literals
    /// Push constant; operand: 1-byte constant index
    Constant,
    /// Push `nil`
    Nil,
    /// Push `true`
    True,
    /// Push `false`
    False,
    /// Discard top of stack
    Pop,

    // Variables
    /// Push local; operand: 1-byte frame slot
    GetLocal,
    /// Store top into local without popping; operand: 1-byte frame slot
    SetLocal,
    /// Push global; operand: 1-byte constant index of the name
    GetGlobal,
    /// Pop into a new or existing global; operand: name constant index
    DefineGlobal,
    /// Store top into an existing global; operand: name constant index
    SetGlobal,
    /// Push captured variable; operand: 1-byte upvalue index
    GetUpvalue,
    /// Store top into captured variable; operand: 1-byte upvalue index
    SetUpvalue,

    // Comparison
    /// Pop two, push equality
    Equal,
    /// Pop two numbers, push `a > b`
    Greater,
    /// Pop two numbers, push `a < b`
    Less,

    // Arithmetic
    /// Numeric sum or string concatenation
    Add,
    /// Numeric difference
    Subtract,
    /// Numeric product
    Multiply,
    /// Numeric quotient
    Divide,
    /// Logical negation by falsiness
    Not,
    /// Numeric negation
    Negate,

    // Statements and control flow
    /// Pop and print
    Print,
    /// Unconditional forward jump; operand: 2-byte offset
    Jump,
    /// Forward jump when top is falsey, top stays; operand: 2-byte offset
    JumpIfFalse,
    /// Backward jump; operand: 2-byte offset
    Loop,

    // Functions
    /// Call callee below the arguments; operand: 1-byte argument count
    Call,
    /// Create closure; operands: function constant index, then
    /// `(is_local, index)` byte pairs, one per upvalue
    Closure,
    /// Close the upvalue for the top slot and pop it
    CloseUpvalue,
    /// Return from the current function
    Return,
}

/// Byte that does not name an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown opcode {0:#04x}")]
pub struct UnknownOpCode(pub u8);

impl OpCode {
    const ALL: [OpCode; 29] = [
        OpCode::Constant,
        OpCode::Nil,
        OpCode::True,
        OpCode::False,
        OpCode::Pop,
        OpCode::GetLocal,
        OpCode::SetLocal,
        OpCode::GetGlobal,
        OpCode::DefineGlobal,
        OpCode::SetGlobal,
        OpCode::GetUpvalue,
        OpCode::SetUpvalue,
        OpCode::Equal,
        OpCode::Greater,
        OpCode::Less,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Divide,
        OpCode::Not,
        OpCode::Negate,
        OpCode::Print,
        OpCode::Jump,
        OpCode::JumpIfFalse,
        OpCode::Loop,
        OpCode::Call,
        OpCode::Closure,
        OpCode::CloseUpvalue,
        OpCode::Return,
    ];

    /// Check if this opcode ends straight-line execution
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            OpCode::Return | OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop
        )
    }

    /// Check if this opcode is a binary arithmetic operation
    pub fn is_binary_arithmetic(&self) -> bool {
        matches!(
            self,
            OpCode::Add | OpCode::Subtract | OpCode::Multiply | OpCode::Divide
        )
    }

    /// Number of fixed operand bytes following the opcode.
    ///
    /// `Closure` additionally carries two bytes per captured variable.
    pub fn operand_width(&self) -> usize {
        match self {
            OpCode::Constant
            | OpCode::GetLocal
            | OpCode::SetLocal
            | OpCode::GetGlobal
            | OpCode::DefineGlobal
            | OpCode::SetGlobal
            | OpCode::GetUpvalue
            | OpCode::SetUpvalue
            | OpCode::Call
            | OpCode::Closure => 1,
            OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop => 2,
            _ => 0,
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

impl TryFrom<u8> for OpCode {
    type Error = UnknownOpCode;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL
            .get(byte as usize)
            .copied()
            .ok_or(UnknownOpCode(byte))
    }
}
