//! Bytecode chunk - compiled bytecode container
//!
//! Holds the instruction bytes of one function, a parallel table of source
//! lines and the constant pool.

use crate::opcode::OpCode;
use core_types::Value;
use thiserror::Error;

/// Largest number of constants addressable by a one-byte operand
pub const MAX_CONSTANTS: usize = 256;

/// Errors raised while building a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// The constant pool is full
    #[error("Too many constants in one chunk.")]
    TooManyConstants,
}

/// A compiled bytecode chunk containing instructions and constants
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    /// Instruction and operand bytes
    pub code: Vec<u8>,
    /// Source line for every byte in `code`
    pub lines: Vec<u32>,
    /// Constant pool for literal values
    pub constants: Vec<Value>,
}

impl Chunk {
    /// Create a new empty bytecode chunk
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one byte with its source line
    pub fn write(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Append an opcode byte with its source line
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.write(op.into(), line);
    }

    /// Add a constant to the constant pool and return its index
    ///
    /// Fails once the pool already holds [`MAX_CONSTANTS`] entries.
    pub fn add_constant(&mut self, value: Value) -> Result<u8, ChunkError> {
        if self.constants.len() >= MAX_CONSTANTS {
            return Err(ChunkError::TooManyConstants);
        }
        self.constants.push(value);
        Ok((self.constants.len() - 1) as u8)
    }

    /// Byte at `offset`
    pub fn read_byte(&self, offset: usize) -> u8 {
        self.code[offset]
    }

    /// Big-endian 16-bit operand starting at `offset`
    pub fn read_u16(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.code[offset], self.code[offset + 1]])
    }

    /// Overwrite a 16-bit operand in place (used for jump patching)
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.code[offset] = hi;
        self.code[offset + 1] = lo;
    }

    /// Constant at `index`
    pub fn constant(&self, index: u8) -> Value {
        self.constants[index as usize]
    }

    /// Source line of the byte at `offset`
    pub fn line(&self, offset: usize) -> u32 {
        self.lines[offset]
    }

    /// Number of code bytes
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether no code has been written
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Approximate heap footprint of the chunk's buffers, for GC accounting
    pub fn heap_size(&self) -> usize {
        self.code.capacity()
            + self.lines.capacity() * std::mem::size_of::<u32>()
            + self.constants.capacity() * std::mem::size_of::<Value>()
    }
}
