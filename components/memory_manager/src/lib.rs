//! Memory Manager - object heap and garbage collection
//!
//! This component provides:
//! - An arena heap addressed by [`ObjRef`](core_types::ObjRef) handles
//! - The heap object variants (strings, functions, natives, closures, upvalues)
//! - String interning through a weak, FNV-hashed intern table
//! - A tracing mark-and-sweep collector driven by an allocation threshold

pub mod gc;
pub mod heap;
pub mod object;

// Re-export main types
pub use gc::{
    GcConfig, GcStats, NoRoots, RootSource, DEFAULT_GROWTH_FACTOR, DEFAULT_INITIAL_THRESHOLD,
};
pub use heap::{Heap, ValueDisplay};
pub use object::{hash_str, Closure, Function, HeapObject, LoxString, Native, ObjKind, Upvalue};
