//! Arena heap with interned strings.
//!
//! Objects live in a vector of slots addressed by [`ObjRef`]. Freed slots are
//! recycled through a free list. The slot vector plays the role of the global
//! object list: sweeping is one pass over it.

use crate::gc::{GcConfig, GcStats, RootSource};
use crate::object::{hash_str, Closure, Function, HeapObject, LoxString, Native, ObjKind, Upvalue};
use core_types::{format_number, NativeFn, ObjRef, Value};
use fnv::FnvHashMap;
use std::fmt;
use tracing::trace;

/// One arena entry
#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) object: Option<HeapObject>,
    pub(crate) marked: bool,
    pub(crate) size: usize,
}

/// The object heap shared by the compiler and the VM.
///
/// All objects are created through [`Heap::alloc`], which may run a
/// collection first. Callers pass the roots that must survive that
/// collection.
#[derive(Debug)]
pub struct Heap {
    pub(crate) slots: Vec<Slot>,
    pub(crate) free: Vec<u32>,
    /// Intern table: FNV hash to the strings with that hash. Weak.
    pub(crate) strings: FnvHashMap<u64, Vec<ObjRef>>,
    pub(crate) bytes_allocated: usize,
    pub(crate) next_gc: usize,
    /// Gray worklist for marking
    pub(crate) gray: Vec<ObjRef>,
    pub(crate) config: GcConfig,
    pub(crate) stats: GcStats,
}

impl Heap {
    /// Creates a heap with the default collection settings.
    pub fn new() -> Self {
        Self::with_config(GcConfig::default())
    }

    /// Creates a heap with custom collection settings.
    pub fn with_config(config: GcConfig) -> Self {
        Heap {
            slots: Vec::new(),
            free: Vec::new(),
            strings: FnvHashMap::default(),
            bytes_allocated: 0,
            next_gc: config.initial_threshold,
            gray: Vec::new(),
            config,
            stats: GcStats::default(),
        }
    }

    /// Stores `object` in the heap and returns its handle.
    ///
    /// Charges the object's size first; when the running total exceeds the
    /// threshold (or stress mode is on) a full collection runs with `roots`
    /// before the object is linked, so the new object itself is never swept
    /// by that collection.
    pub fn alloc(&mut self, object: HeapObject, roots: &dyn RootSource) -> ObjRef {
        let size = object.size();
        self.bytes_allocated += size;
        if self.config.stress || self.bytes_allocated > self.next_gc {
            self.collect(roots);
        }

        let kind = object.kind();
        let slot = Slot {
            object: Some(object),
            marked: false,
            size,
        };
        let handle = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = slot;
                ObjRef(index)
            }
            None => {
                self.slots.push(slot);
                ObjRef((self.slots.len() - 1) as u32)
            }
        };
        trace!(handle = %handle, %kind, size, "allocate");
        handle
    }

    /// Returns the interned string with the given contents, allocating it on
    /// first use.
    pub fn intern(&mut self, text: &str, roots: &dyn RootSource) -> ObjRef {
        let hash = hash_str(text);
        if let Some(existing) = self.find_interned(text, hash) {
            return existing;
        }
        self.insert_string(LoxString::new(text), roots)
    }

    /// Like [`Heap::intern`] but takes ownership of freshly built text.
    ///
    /// On an intern hit the text is dropped.
    pub fn intern_owned(&mut self, text: String, roots: &dyn RootSource) -> ObjRef {
        let hash = hash_str(&text);
        if let Some(existing) = self.find_interned(&text, hash) {
            return existing;
        }
        self.insert_string(LoxString::new(text), roots)
    }

    /// Concatenates two strings into a new interned string.
    ///
    /// `a` and `b` must be reachable from `roots` (the VM leaves them on its
    /// stack) because the allocation may collect.
    pub fn concat(&mut self, a: ObjRef, b: ObjRef, roots: &dyn RootSource) -> ObjRef {
        let left = self.as_string(a).as_str();
        let right = self.as_string(b).as_str();
        let mut text = String::with_capacity(left.len() + right.len());
        text.push_str(left);
        text.push_str(right);
        self.intern_owned(text, roots)
    }

    /// Looks up an interned string by content without allocating.
    pub fn find_interned(&self, text: &str, hash: u64) -> Option<ObjRef> {
        self.strings.get(&hash)?.iter().copied().find(|candidate| {
            matches!(
                self.slots[candidate.index()].object,
                Some(HeapObject::String(ref s)) if s.as_str() == text
            )
        })
    }

    fn insert_string(&mut self, string: LoxString, roots: &dyn RootSource) -> ObjRef {
        let hash = string.hash();
        let handle = self.alloc(HeapObject::String(string), roots);
        self.strings.entry(hash).or_default().push(handle);
        handle
    }

    /// Allocates a finished function.
    pub fn alloc_function(&mut self, function: Function, roots: &dyn RootSource) -> ObjRef {
        self.alloc(HeapObject::Function(function), roots)
    }

    /// Allocates a native function wrapper.
    pub fn alloc_native(&mut self, name: &str, function: NativeFn, roots: &dyn RootSource) -> ObjRef {
        self.alloc(
            HeapObject::Native(Native {
                name: name.into(),
                function,
            }),
            roots,
        )
    }

    /// Allocates a closure over `function` with no captured cells yet.
    pub fn alloc_closure(&mut self, function: ObjRef, roots: &dyn RootSource) -> ObjRef {
        let upvalue_count = self.as_function(function).upvalue_count;
        self.alloc(HeapObject::Closure(Closure::new(function, upvalue_count)), roots)
    }

    /// Allocates an open upvalue for an absolute stack slot.
    pub fn alloc_upvalue(&mut self, slot: usize, roots: &dyn RootSource) -> ObjRef {
        self.alloc(HeapObject::Upvalue(Upvalue::Open(slot)), roots)
    }

    /// The object behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle refers to a freed slot.
    pub fn get(&self, handle: ObjRef) -> &HeapObject {
        match &self.slots[handle.index()].object {
            Some(object) => object,
            None => panic!("dangling object handle {}", handle),
        }
    }

    fn get_mut(&mut self, handle: ObjRef) -> &mut HeapObject {
        match &mut self.slots[handle.index()].object {
            Some(object) => object,
            None => panic!("dangling object handle {}", handle),
        }
    }

    /// Whether the handle refers to a live object.
    pub fn contains(&self, handle: ObjRef) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|slot| slot.object.is_some())
    }

    /// Type tag of the object behind a handle.
    pub fn kind(&self, handle: ObjRef) -> ObjKind {
        self.get(handle).kind()
    }

    /// Whether `value` is a string object.
    pub fn is_string(&self, value: Value) -> bool {
        matches!(value, Value::Obj(r) if self.kind(r) == ObjKind::String)
    }

    /// Typed access to a string.
    ///
    /// # Panics
    ///
    /// Panics if the object is not a string.
    pub fn as_string(&self, handle: ObjRef) -> &LoxString {
        match self.get(handle) {
            HeapObject::String(s) => s,
            other => panic!("expected string, found {}", other.kind()),
        }
    }

    /// Contents of a string object.
    pub fn str(&self, handle: ObjRef) -> &str {
        self.as_string(handle).as_str()
    }

    /// Typed access to a function.
    ///
    /// # Panics
    ///
    /// Panics if the object is not a function.
    pub fn as_function(&self, handle: ObjRef) -> &Function {
        match self.get(handle) {
            HeapObject::Function(f) => f,
            other => panic!("expected function, found {}", other.kind()),
        }
    }

    /// Typed access to a native.
    ///
    /// # Panics
    ///
    /// Panics if the object is not a native function.
    pub fn as_native(&self, handle: ObjRef) -> &Native {
        match self.get(handle) {
            HeapObject::Native(n) => n,
            other => panic!("expected native, found {}", other.kind()),
        }
    }

    /// Typed access to a closure.
    ///
    /// # Panics
    ///
    /// Panics if the object is not a closure.
    pub fn as_closure(&self, handle: ObjRef) -> &Closure {
        match self.get(handle) {
            HeapObject::Closure(c) => c,
            other => panic!("expected closure, found {}", other.kind()),
        }
    }

    /// Mutable access to a closure, used while filling its upvalues.
    ///
    /// # Panics
    ///
    /// Panics if the object is not a closure.
    pub fn as_closure_mut(&mut self, handle: ObjRef) -> &mut Closure {
        match self.get_mut(handle) {
            HeapObject::Closure(c) => c,
            other => panic!("expected closure, found {}", other.kind()),
        }
    }

    /// Typed access to an upvalue cell.
    ///
    /// # Panics
    ///
    /// Panics if the object is not an upvalue.
    pub fn as_upvalue(&self, handle: ObjRef) -> &Upvalue {
        match self.get(handle) {
            HeapObject::Upvalue(u) => u,
            other => panic!("expected upvalue, found {}", other.kind()),
        }
    }

    /// Mutable access to an upvalue cell.
    ///
    /// # Panics
    ///
    /// Panics if the object is not an upvalue.
    pub fn as_upvalue_mut(&mut self, handle: ObjRef) -> &mut Upvalue {
        match self.get_mut(handle) {
            HeapObject::Upvalue(u) => u,
            other => panic!("expected upvalue, found {}", other.kind()),
        }
    }

    /// Formats a value the way `print` shows it.
    pub fn display(&self, value: Value) -> ValueDisplay<'_> {
        ValueDisplay { heap: self, value }
    }

    /// Bytes currently charged to live and not-yet-swept objects.
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    /// Threshold that triggers the next collection.
    pub fn next_gc(&self) -> usize {
        self.next_gc
    }

    /// Number of occupied slots.
    pub fn object_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.object.is_some()).count()
    }

    /// Number of strings in the intern table.
    pub fn interned_count(&self) -> usize {
        self.strings.values().map(Vec::len).sum()
    }

    /// Collection settings.
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Collection counters.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

/// [`fmt::Display`] adapter returned by [`Heap::display`].
pub struct ValueDisplay<'a> {
    heap: &'a Heap,
    value: Value,
}

impl ValueDisplay<'_> {
    fn fmt_function(&self, f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
        match function.name {
            Some(name) => write!(f, "<fn {}>", self.heap.str(name)),
            None => f.write_str("<script>"),
        }
    }
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => f.write_str("nil"),
            Value::Number(n) => f.write_str(&format_number(n)),
            Value::Obj(handle) => match self.heap.get(handle) {
                HeapObject::String(s) => f.write_str(s.as_str()),
                HeapObject::Function(function) => self.fmt_function(f, function),
                HeapObject::Native(_) => f.write_str("<native fn>"),
                HeapObject::Closure(closure) => {
                    self.fmt_function(f, self.heap.as_function(closure.function))
                }
                HeapObject::Upvalue(_) => f.write_str("upvalue"),
            },
        }
    }
}
