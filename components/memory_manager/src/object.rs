//! Heap object variants
//!
//! Every object stored in the [`Heap`](crate::Heap) arena is one of the
//! variants of [`HeapObject`]. Objects refer to each other only through
//! [`ObjRef`] handles.

use bytecode_system::Chunk;
use core_types::{NativeFn, ObjRef, Value};
use std::fmt;
use std::hash::Hasher;
use std::mem::size_of;

/// Type tag of a heap object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    /// Interned string
    String,
    /// Compiled function
    Function,
    /// Host function
    Native,
    /// Function plus captured variables
    Closure,
    /// Captured variable cell
    Upvalue,
}

impl fmt::Display for ObjKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjKind::String => "string",
            ObjKind::Function => "function",
            ObjKind::Native => "native",
            ObjKind::Closure => "closure",
            ObjKind::Upvalue => "upvalue",
        };
        f.write_str(name)
    }
}

/// Immutable string with its precomputed FNV-1a hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoxString {
    text: Box<str>,
    hash: u64,
}

impl LoxString {
    /// Create a string, hashing its bytes
    pub fn new(text: impl Into<Box<str>>) -> Self {
        let text = text.into();
        let hash = hash_str(&text);
        Self { text, hash }
    }

    /// The string contents
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the string is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The cached FNV-1a hash
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// FNV-1a hash of a string's bytes
pub fn hash_str(text: &str) -> u64 {
    let mut hasher = fnv::FnvHasher::default();
    hasher.write(text.as_bytes());
    hasher.finish()
}

/// A compiled function: arity, captured-variable count, name and bytecode
#[derive(Debug, Clone, Default)]
pub struct Function {
    /// Declared parameter count
    pub arity: u8,
    /// Number of variables the function captures
    pub upvalue_count: usize,
    /// Function name, `None` for the top-level script
    pub name: Option<ObjRef>,
    /// Compiled body
    pub chunk: Chunk,
}

/// A host function registered under a global name
#[derive(Clone)]
pub struct Native {
    /// Registration name
    pub name: Box<str>,
    /// The callback
    pub function: NativeFn,
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Native").field("name", &self.name).finish()
    }
}

/// Runtime pairing of a function with the cells of the variables it captured
#[derive(Debug, Clone)]
pub struct Closure {
    /// The wrapped function
    pub function: ObjRef,
    /// Captured cells, in the order the compiler declared them
    pub upvalues: Vec<ObjRef>,
}

impl Closure {
    /// Create a closure with room for `upvalue_count` cells
    pub fn new(function: ObjRef, upvalue_count: usize) -> Self {
        Self {
            function,
            upvalues: Vec::with_capacity(upvalue_count),
        }
    }
}

/// A captured variable.
///
/// Open while the frame owning the variable is live; it then refers to a
/// stack slot. Closing copies the slot's value into the cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Upvalue {
    /// Refers to an absolute VM stack slot
    Open(usize),
    /// Owns the value
    Closed(Value),
}

impl Upvalue {
    /// Stack slot of an open upvalue
    pub fn slot(&self) -> Option<usize> {
        match self {
            Upvalue::Open(slot) => Some(*slot),
            Upvalue::Closed(_) => None,
        }
    }

    /// Whether the upvalue still refers to the stack
    pub fn is_open(&self) -> bool {
        matches!(self, Upvalue::Open(_))
    }
}

/// Any object that can live in the heap
#[derive(Debug, Clone)]
pub enum HeapObject {
    /// Interned string
    String(LoxString),
    /// Compiled function
    Function(Function),
    /// Host function
    Native(Native),
    /// Closure
    Closure(Closure),
    /// Captured variable cell
    Upvalue(Upvalue),
}

impl HeapObject {
    /// The variant tag
    pub fn kind(&self) -> ObjKind {
        match self {
            HeapObject::String(_) => ObjKind::String,
            HeapObject::Function(_) => ObjKind::Function,
            HeapObject::Native(_) => ObjKind::Native,
            HeapObject::Closure(_) => ObjKind::Closure,
            HeapObject::Upvalue(_) => ObjKind::Upvalue,
        }
    }

    /// Bytes charged against the collection threshold for this object
    pub fn size(&self) -> usize {
        let payload = match self {
            HeapObject::String(s) => s.len(),
            HeapObject::Function(f) => f.chunk.heap_size(),
            HeapObject::Native(n) => n.name.len(),
            HeapObject::Closure(c) => c.upvalues.capacity() * size_of::<ObjRef>(),
            HeapObject::Upvalue(_) => 0,
        };
        size_of::<HeapObject>() + payload
    }
}
