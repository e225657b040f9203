//! Tests for OpCode encoding

use bytecode_system::{OpCode, UnknownOpCode};

#[test]
fn test_opcode_byte_conversion() {
    let ops = [
        OpCode::Constant,
        OpCode::GetUpvalue,
        OpCode::JumpIfFalse,
        OpCode::Closure,
        OpCode::Return,
    ];
    for op in ops {
        assert_eq!(OpCode::try_from(u8::from(op)), Ok(op));
    }
}

#[test]
fn test_opcode_rejects_unknown_bytes() {
    assert_eq!(OpCode::try_from(0xff), Err(UnknownOpCode(0xff)));
    assert_eq!(UnknownOpCode(0xff).to_string(), "unknown opcode 0xff");
}

#[test]
fn test_opcode_operand_widths() {
    assert_eq!(OpCode::Constant.operand_width(), 1);
    assert_eq!(OpCode::Call.operand_width(), 1);
    assert_eq!(OpCode::Jump.operand_width(), 2);
    assert_eq!(OpCode::Loop.operand_width(), 2);
    assert_eq!(OpCode::Add.operand_width(), 0);
    assert_eq!(OpCode::Return.operand_width(), 0);
}

#[test]
fn test_opcode_is_binary_arithmetic() {
    assert!(OpCode::Add.is_binary_arithmetic());
    assert!(OpCode::Subtract.is_binary_arithmetic());
    assert!(OpCode::Multiply.is_binary_arithmetic());
    assert!(OpCode::Divide.is_binary_arithmetic());
    assert!(!OpCode::Negate.is_binary_arithmetic());
    assert!(!OpCode::Equal.is_binary_arithmetic());
}
