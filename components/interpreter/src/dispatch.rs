//! Instruction dispatch loop
//!
//! Reads one opcode per iteration from the innermost frame and executes it
//! until the outermost frame returns or a runtime error unwinds everything.

use bytecode_system::OpCode;
use core_types::{ErrorKind, ObjRef, RuntimeError, Value};

use crate::gc_integration::vm_roots;
use crate::vm::VM;

impl VM {
    /// Execute until the script frame returns
    pub(crate) fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            let byte = self.read_byte();
            let op = match OpCode::try_from(byte) {
                Ok(op) => op,
                Err(err) => return Err(self.runtime_error(ErrorKind::InvalidBytecode, err.to_string())),
            };

            match op {
                OpCode::Constant => {
                    let value = self.read_constant();
                    self.push(value)?;
                }
                OpCode::Nil => self.push(Value::Nil)?,
                OpCode::True => self.push(Value::Bool(true))?,
                OpCode::False => self.push(Value::Bool(false))?,
                OpCode::Pop => {
                    self.pop();
                }

                OpCode::GetLocal => {
                    let slot = self.frame_slots() + self.read_byte() as usize;
                    self.push(self.stack[slot])?;
                }
                OpCode::SetLocal => {
                    let slot = self.frame_slots() + self.read_byte() as usize;
                    self.stack[slot] = self.peek(0);
                }

                OpCode::GetGlobal => {
                    let name = self.read_string()?;
                    match self.globals.get(&name).copied() {
                        Some(value) => self.push(value)?,
                        None => return Err(self.undefined_variable(name)),
                    }
                }
                OpCode::DefineGlobal => {
                    let name = self.read_string()?;
                    let value = self.peek(0);
                    self.globals.insert(name, value);
                    self.pop();
                }
                OpCode::SetGlobal => {
                    let name = self.read_string()?;
                    if !self.globals.contains_key(&name) {
                        return Err(self.undefined_variable(name));
                    }
                    let value = self.peek(0);
                    self.globals.insert(name, value);
                }

                OpCode::GetUpvalue => {
                    let cell = self.frame_upvalue();
                    let value = self.read_upvalue(cell);
                    self.push(value)?;
                }
                OpCode::SetUpvalue => {
                    let cell = self.frame_upvalue();
                    let value = self.peek(0);
                    self.write_upvalue(cell, value);
                }

                OpCode::Equal => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(Value::Bool(a == b))?;
                }
                OpCode::Greater => self.binary_number(|a, b| Value::Bool(a > b))?,
                OpCode::Less => self.binary_number(|a, b| Value::Bool(a < b))?,
                OpCode::Add => self.add()?,
                OpCode::Subtract => self.binary_number(|a, b| Value::Number(a - b))?,
                OpCode::Multiply => self.binary_number(|a, b| Value::Number(a * b))?,
                OpCode::Divide => self.binary_number(|a, b| Value::Number(a / b))?,
                OpCode::Not => {
                    let value = self.pop();
                    self.push(Value::Bool(value.is_falsey()))?;
                }
                OpCode::Negate => {
                    let Some(n) = self.peek(0).as_number() else {
                        return Err(self.runtime_error(ErrorKind::TypeError, "Operand must be a number."));
                    };
                    self.pop();
                    self.push(Value::Number(-n))?;
                }

                OpCode::Print => {
                    let value = self.pop();
                    let text = self.heap.display(value).to_string();
                    self.output.write_line(&text);
                }

                OpCode::Jump => {
                    let offset = self.read_u16();
                    self.frame_mut().ip += offset as usize;
                }
                OpCode::JumpIfFalse => {
                    let offset = self.read_u16();
                    if self.peek(0).is_falsey() {
                        self.frame_mut().ip += offset as usize;
                    }
                }
                OpCode::Loop => {
                    let offset = self.read_u16();
                    self.frame_mut().ip -= offset as usize;
                }

                OpCode::Call => {
                    let arg_count = self.read_byte() as usize;
                    let callee = self.peek(arg_count);
                    self.call_value(callee, arg_count)?;
                }
                OpCode::Closure => self.make_closure()?,
                OpCode::CloseUpvalue => {
                    self.close_upvalues(self.stack.len() - 1);
                    self.pop();
                }
                OpCode::Return => {
                    let result = self.pop();
                    let Some(frame) = self.frames.pop() else {
                        return Ok(());
                    };
                    self.close_upvalues(frame.slots);
                    self.stack.truncate(frame.slots);
                    if self.frames.is_empty() {
                        return Ok(());
                    }
                    self.push(result)?;
                }
            }
        }
    }

    // Operand decoding.

    fn frame_mut(&mut self) -> &mut crate::CallFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn frame_slots(&self) -> usize {
        self.frames[self.frames.len() - 1].slots
    }

    fn read_byte(&mut self) -> u8 {
        let last = self.frames.len() - 1;
        let frame = &mut self.frames[last];
        let byte = self.heap.as_function(frame.function).chunk.read_byte(frame.ip);
        frame.ip += 1;
        byte
    }

    fn read_u16(&mut self) -> u16 {
        let hi = self.read_byte();
        let lo = self.read_byte();
        u16::from_be_bytes([hi, lo])
    }

    fn read_constant(&mut self) -> Value {
        let index = self.read_byte();
        let function = self.frames[self.frames.len() - 1].function;
        self.heap.as_function(function).chunk.constant(index)
    }

    fn read_string(&mut self) -> Result<ObjRef, RuntimeError> {
        match self.read_constant() {
            Value::Obj(handle) if self.heap.is_string(Value::Obj(handle)) => Ok(handle),
            other => Err(self.runtime_error(
                ErrorKind::InvalidBytecode,
                format!("Expected a name constant, found {}.", self.heap.display(other)),
            )),
        }
    }

    fn frame_upvalue(&mut self) -> ObjRef {
        let index = self.read_byte() as usize;
        let closure = self.frames[self.frames.len() - 1].closure;
        self.heap.as_closure(closure).upvalues[index]
    }

    // Instruction bodies.

    fn undefined_variable(&mut self, name: ObjRef) -> RuntimeError {
        let message = format!("Undefined variable '{}'.", self.heap.str(name));
        self.runtime_error(ErrorKind::UndefinedVariable, message)
    }

    fn binary_number(&mut self, op: impl Fn(f64, f64) -> Value) -> Result<(), RuntimeError> {
        let (Some(a), Some(b)) = (self.peek(1).as_number(), self.peek(0).as_number()) else {
            return Err(self.runtime_error(ErrorKind::TypeError, "Operands must be numbers."));
        };
        self.pop();
        self.pop();
        self.push(op(a, b))
    }

    fn add(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = (self.peek(1), self.peek(0));
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => {
                self.pop();
                self.pop();
                self.push(Value::Number(a + b))
            }
            (Value::Obj(left), Value::Obj(right))
                if self.heap.is_string(a) && self.heap.is_string(b) =>
            {
                // Both operands stay on the stack until the result exists.
                let result = self.heap.concat(left, right, &vm_roots!(self));
                self.pop();
                self.pop();
                self.push(Value::Obj(result))
            }
            _ => Err(self.runtime_error(
                ErrorKind::TypeError,
                "Operands must be two numbers or two strings.",
            )),
        }
    }

    fn make_closure(&mut self) -> Result<(), RuntimeError> {
        let Value::Obj(function) = self.read_constant() else {
            return Err(self.runtime_error(ErrorKind::InvalidBytecode, "Expected a function constant."));
        };
        let closure = self.heap.alloc_closure(function, &vm_roots!(self));
        // Rooted on the stack while its upvalues are captured.
        self.push(Value::Obj(closure))?;

        let upvalue_count = self.heap.as_function(function).upvalue_count;
        for _ in 0..upvalue_count {
            let is_local = self.read_byte() == 1;
            let index = self.read_byte() as usize;
            let cell = if is_local {
                self.capture_upvalue(self.frame_slots() + index)
            } else {
                let enclosing = self.frames[self.frames.len() - 1].closure;
                self.heap.as_closure(enclosing).upvalues[index]
            };
            self.heap.as_closure_mut(closure).upvalues.push(cell);
        }
        Ok(())
    }
}
