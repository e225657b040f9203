//! Contract tests verifying the bytecode_system API used by the compiler and
//! the interpreter.

use bytecode_system::{Chunk, ChunkError, OpCode, MAX_CONSTANTS};
use core_types::Value;

/// Compiler contract: jumps are emitted with a placeholder and patched later
#[test]
fn contract_jump_patching() {
    let mut chunk = Chunk::new();
    chunk.write_op(OpCode::JumpIfFalse, 1);
    chunk.write(0xff, 1);
    chunk.write(0xff, 1);
    let operand = chunk.len() - 2;
    chunk.write_op(OpCode::Pop, 1);
    let jump = chunk.len() - operand - 2;
    chunk.patch_u16(operand, jump as u16);
    assert_eq!(chunk.read_u16(operand), 1);
}

/// Compiler contract: the constant pool error carries the diagnostic text
#[test]
fn contract_too_many_constants_message() {
    assert_eq!(MAX_CONSTANTS, 256);
    assert_eq!(
        ChunkError::TooManyConstants.to_string(),
        "Too many constants in one chunk."
    );
}

/// Interpreter contract: every byte written has a line entry
#[test]
fn contract_line_table_parallel_to_code() {
    let mut chunk = Chunk::new();
    let idx = chunk.add_constant(Value::Bool(true)).unwrap();
    chunk.write_op(OpCode::Constant, 3);
    chunk.write(idx, 3);
    chunk.write_op(OpCode::Return, 4);
    assert_eq!(chunk.code.len(), chunk.lines.len());
}
