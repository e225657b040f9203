//! Parser -> Bytecode Integration Tests
//!
//! Compiles source with the parser and checks the chunks it leaves in the
//! heap decode cleanly with the bytecode system.

use bytecode_system::{Chunk, OpCode};
use core_types::Value;
use memory_manager::{Heap, NoRoots};
use parser::{compile, Scanner};

/// Decode a chunk into its opcodes, skipping operands
fn decode(heap: &Heap, chunk: &Chunk) -> Vec<OpCode> {
    let mut ops = Vec::new();
    let mut offset = 0;
    while offset < chunk.len() {
        let op = OpCode::try_from(chunk.read_byte(offset)).expect("valid opcode");
        offset += 1 + op.operand_width();
        if op == OpCode::Closure {
            let function = chunk.constant(chunk.read_byte(offset - 1)).as_obj().unwrap();
            offset += 2 * heap.as_function(function).upvalue_count;
        }
        ops.push(op);
    }
    ops
}

fn compile_source(source: &str) -> (Heap, Chunk) {
    let mut heap = Heap::new();
    let script = compile(Scanner::new(source), &mut heap, &NoRoots).expect("compiles");
    let chunk = heap.as_function(script).chunk.clone();
    (heap, chunk)
}

#[test]
fn test_every_emitted_byte_decodes() {
    let source = r#"
var total = 0;
fun add(a, b) { return a + b; }
for (var i = 0; i < 3; i = i + 1) {
  if (i == 1 or i >= 2) total = add(total, i); else total = total - 1;
}
while (total > 10 and !false) total = total / 2;
print total;
"#;
    let (heap, chunk) = compile_source(source);
    let ops = decode(&heap, &chunk);
    assert_eq!(ops.last(), Some(&OpCode::Return));
    for op in [OpCode::Loop, OpCode::JumpIfFalse, OpCode::Jump, OpCode::Call, OpCode::Closure] {
        assert!(ops.contains(&op), "missing {:?}", op);
    }
}

#[test]
fn test_jump_offsets_stay_in_bounds() {
    let (heap, chunk) = compile_source("var x = 1; if (x) { print 1; } else { print 2; } while (x) x = false;");
    let mut offset = 0;
    while offset < chunk.len() {
        let op = OpCode::try_from(chunk.read_byte(offset)).unwrap();
        let next = offset + 1 + op.operand_width();
        match op {
            OpCode::Jump | OpCode::JumpIfFalse => {
                assert!(next + chunk.read_u16(offset + 1) as usize <= chunk.len());
            }
            OpCode::Loop => {
                assert!(chunk.read_u16(offset + 1) as usize <= next);
            }
            _ => {}
        }
        offset = next;
    }
    assert!(!decode(&heap, &chunk).is_empty());
}

#[test]
fn test_global_names_are_string_constants() {
    let (heap, chunk) = compile_source("var answer = 42; print answer;");
    assert_eq!(heap.str(chunk.constants[0].as_obj().unwrap()), "answer");
    assert_eq!(chunk.constants[1], Value::Number(42.0));
    // The second reference reuses the interned name.
    assert_eq!(chunk.constants[0], chunk.constants[2]);
}

#[test]
fn test_upvalue_descriptors_chain_through_middle_function() {
    let source = "fun a() { var x; fun b() { fun c() { return x; } return c; } return b; }";
    let (heap, chunk) = compile_source(source);
    let a = heap.as_function(chunk.constants[1].as_obj().unwrap());
    let b_handle = a
        .chunk
        .constants
        .iter()
        .find_map(|v| v.as_obj().filter(|h| heap.kind(*h) == memory_manager::ObjKind::Function))
        .unwrap();
    let b = heap.as_function(b_handle);
    assert_eq!(b.upvalue_count, 1);
    let c_handle = b
        .chunk
        .constants
        .iter()
        .find_map(|v| v.as_obj().filter(|h| heap.kind(*h) == memory_manager::ObjKind::Function))
        .unwrap();
    assert_eq!(heap.as_function(c_handle).upvalue_count, 1);
}
