//! Virtual Machine for bytecode execution
//!
//! Main entry point for running Lox source: compile, wrap the script in a
//! closure, then execute it on the value stack.

use arrayvec::ArrayVec;
use builtins::NativeRegistry;
use core_types::{
    ErrorKind, InterpretError, InterpretResult, NativeFn, ObjRef, RuntimeError, StackFrame, Value,
};
use fnv::FnvHashMap;
use memory_manager::{hash_str, GcConfig, Heap, ObjKind};
use parser::Scanner;
use tracing::{debug, instrument, trace};

use crate::call_frame::{CallFrame, FRAMES_MAX};
use crate::gc_integration::vm_roots;
use crate::output::{OutputBuffer, DEFAULT_OUTPUT_CAPACITY};
use crate::upvalue::OpenUpvalues;

/// Default value stack capacity
pub const STACK_MAX: usize = FRAMES_MAX * 256;

/// VM settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Value stack capacity; exceeding it is a runtime error
    pub stack_max: usize,
    /// `print` output capacity in bytes
    pub output_capacity: usize,
    /// Collector settings
    pub gc: GcConfig,
}

impl VmConfig {
    /// Sets the value stack capacity
    pub fn with_stack_max(mut self, stack_max: usize) -> Self {
        self.stack_max = stack_max;
        self
    }

    /// Sets the output capacity
    pub fn with_output_capacity(mut self, bytes: usize) -> Self {
        self.output_capacity = bytes;
        self
    }

    /// Sets the collector settings
    pub fn with_gc(mut self, gc: GcConfig) -> Self {
        self.gc = gc;
        self
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_max: STACK_MAX,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
            gc: GcConfig::default(),
        }
    }
}

/// Virtual Machine for executing Lox programs
///
/// The VM owns all execution state:
/// - The object heap and its collector
/// - The value stack and the call-frame stack
/// - Globals, keyed by interned name
/// - Open upvalues
/// - The output and diagnostics buffers
///
/// Globals persist across [`VM::interpret`] calls, which is what a REPL needs.
///
/// # Example
///
/// ```
/// use core_types::InterpretResult;
/// use interpreter::VM;
///
/// let mut vm = VM::new();
/// assert_eq!(vm.interpret("print 1 + 2 * 3;"), InterpretResult::Ok);
/// assert_eq!(vm.output(), "7\n");
/// ```
pub struct VM {
    pub(crate) heap: Heap,
    pub(crate) stack: Vec<Value>,
    pub(crate) frames: ArrayVec<CallFrame, FRAMES_MAX>,
    pub(crate) globals: FnvHashMap<ObjRef, Value>,
    pub(crate) open_upvalues: OpenUpvalues,
    pub(crate) output: OutputBuffer,
    diagnostics: String,
    config: VmConfig,
}

impl VM {
    /// Create a VM with default settings and the built-in natives installed
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Create a VM with the given settings and the built-in natives installed
    pub fn with_config(config: VmConfig) -> Self {
        let mut vm = Self {
            heap: Heap::with_config(config.gc.clone()),
            stack: Vec::with_capacity(config.stack_max),
            frames: ArrayVec::new(),
            globals: FnvHashMap::default(),
            open_upvalues: OpenUpvalues::new(),
            output: OutputBuffer::with_capacity(config.output_capacity),
            diagnostics: String::new(),
            config,
        };
        builtins::install(&mut vm);
        vm
    }

    /// Compile and run `source`.
    ///
    /// Diagnostics are appended to [`VM::diagnostics`]: one line per compile
    /// error, or the runtime error message followed by its stack trace.
    #[instrument(skip_all, fields(bytes = source.len()))]
    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        let result = self.run_source(source);
        match &result {
            Ok(()) => {}
            Err(InterpretError::Compile(errors)) => {
                for error in errors {
                    self.diagnostics.push_str(&error.to_string());
                    self.diagnostics.push('\n');
                }
            }
            Err(InterpretError::Runtime(error)) => {
                self.diagnostics.push_str(&error.report());
                self.diagnostics.push('\n');
            }
        }
        let outcome = InterpretResult::from(&result);
        debug!(?outcome, "interpret finished");
        outcome
    }

    /// Like [`VM::interpret`] but returns the error instead of recording it
    pub fn run_source(&mut self, source: &str) -> Result<(), InterpretError> {
        let script = parser::compile(Scanner::new(source), &mut self.heap, &vm_roots!(self))
            .map_err(InterpretError::Compile)?;

        // The function stays on the stack while its closure is allocated.
        self.push(Value::Obj(script)).map_err(InterpretError::Runtime)?;
        let closure = self.heap.alloc_closure(script, &vm_roots!(self));
        self.pop();
        self.push(Value::Obj(closure)).map_err(InterpretError::Runtime)?;

        self.call(closure, 0).map_err(InterpretError::Runtime)?;
        self.run().map_err(InterpretError::Runtime)
    }

    /// Bind a host function to a global name
    pub fn define_native(&mut self, name: &str, function: NativeFn) {
        let handle = self.heap.intern(name, &vm_roots!(self));
        self.stack.push(Value::Obj(handle));
        let native = self.heap.alloc_native(name, function, &vm_roots!(self));
        self.stack.push(Value::Obj(native));
        self.globals.insert(handle, Value::Obj(native));
        self.stack.truncate(self.stack.len() - 2);
    }

    /// Value of a global, if defined
    pub fn global(&self, name: &str) -> Option<Value> {
        let handle = self.heap.find_interned(name, hash_str(name))?;
        self.globals.get(&handle).copied()
    }

    /// Text form of a value
    pub fn display(&self, value: Value) -> String {
        self.heap.display(value).to_string()
    }

    /// Program output so far
    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    /// Take the program output, leaving the buffer empty
    pub fn take_output(&mut self) -> String {
        self.output.take()
    }

    /// The output buffer itself
    pub fn output_buffer(&self) -> &OutputBuffer {
        &self.output
    }

    /// Rendered compile and runtime errors so far
    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }

    /// Take the diagnostics, leaving them empty
    pub fn take_diagnostics(&mut self) -> String {
        std::mem::take(&mut self.diagnostics)
    }

    /// The object heap
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Run a full collection now
    pub fn collect_garbage(&mut self) {
        self.heap.collect(&vm_roots!(self));
    }

    /// Active call frames
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Values on the stack
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Active settings
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    // Stack primitives.

    pub(crate) fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.stack_max {
            return Err(self.runtime_error(ErrorKind::StackOverflow, "Stack overflow."));
        }
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or_default()
    }

    pub(crate) fn peek(&self, distance: usize) -> Value {
        self.stack[self.stack.len() - 1 - distance]
    }

    // Calls.

    pub(crate) fn call_value(&mut self, callee: Value, arg_count: usize) -> Result<(), RuntimeError> {
        if let Value::Obj(handle) = callee {
            match self.heap.kind(handle) {
                ObjKind::Closure => return self.call(handle, arg_count),
                ObjKind::Native => {
                    let native = self.heap.as_native(handle).function;
                    let base = self.stack.len() - arg_count;
                    let result = native(&self.stack[base..]);
                    // Drop the arguments and the callee.
                    self.stack.truncate(base - 1);
                    return self.push(result);
                }
                _ => {}
            }
        }
        Err(self.runtime_error(ErrorKind::NotCallable, "Can only call functions."))
    }

    pub(crate) fn call(&mut self, closure: ObjRef, arg_count: usize) -> Result<(), RuntimeError> {
        let function = self.heap.as_closure(closure).function;
        let arity = self.heap.as_function(function).arity as usize;
        if arg_count != arity {
            return Err(self.runtime_error(
                ErrorKind::ArityMismatch,
                format!("Expected {} arguments but got {}.", arity, arg_count),
            ));
        }
        if self.frames.is_full() {
            return Err(self.runtime_error(ErrorKind::StackOverflow, "Stack overflow."));
        }
        let slots = self.stack.len() - arg_count - 1;
        trace!(depth = self.frames.len() + 1, slots, "call");
        self.frames.push(CallFrame::new(closure, function, slots));
        Ok(())
    }

    // Errors.

    /// Build a runtime error carrying the current stack trace, then reset the
    /// VM so the next `interpret` starts clean.
    pub(crate) fn runtime_error(&mut self, kind: ErrorKind, message: impl Into<String>) -> RuntimeError {
        let mut error = RuntimeError::new(kind, message);
        for frame in self.frames.iter().rev() {
            let function = self.heap.as_function(frame.function);
            let offset = frame.ip.saturating_sub(1);
            error.stack.push(StackFrame {
                function_name: function.name.map(|name| self.heap.str(name).to_string()),
                line: function.chunk.line(offset),
            });
        }
        debug!(?kind, message = %error.message, depth = error.stack.len(), "runtime error");
        self.reset_stack();
        error
    }

    fn reset_stack(&mut self) {
        // Escaped closures keep the values their frames held.
        self.close_upvalues(0);
        self.stack.clear();
        self.frames.clear();
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRegistry for VM {
    fn define_native(&mut self, name: &str, function: NativeFn) {
        VM::define_native(self, name, function);
    }
}
