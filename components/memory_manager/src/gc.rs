//! Mark-and-sweep garbage collector.
//!
//! Marking is iterative: a marked object is pushed on the gray worklist and
//! its children are marked when it is popped, so deep object graphs never
//! recurse. The intern table holds its strings weakly; unmarked entries are
//! dropped right before the sweep.

use crate::heap::Heap;
use crate::object::{HeapObject, Upvalue};
use core_types::{ObjRef, Value};
use tracing::{debug, trace};

/// Default collection threshold (1 MiB)
pub const DEFAULT_INITIAL_THRESHOLD: usize = 1024 * 1024;

/// Default threshold growth factor applied to the live size after a collection
pub const DEFAULT_GROWTH_FACTOR: usize = 2;

/// Supplier of GC roots.
///
/// Implementors mark every value they keep alive with [`Heap::mark_value`]
/// or [`Heap::mark_object`].
pub trait RootSource {
    /// Mark every root
    fn mark_roots(&self, heap: &mut Heap);
}

/// Root source with no roots
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoots;

impl RootSource for NoRoots {
    fn mark_roots(&self, _heap: &mut Heap) {}
}

impl<const N: usize> RootSource for [Value; N] {
    fn mark_roots(&self, heap: &mut Heap) {
        for value in self {
            heap.mark_value(*value);
        }
    }
}

impl RootSource for Vec<Value> {
    fn mark_roots(&self, heap: &mut Heap) {
        for value in self {
            heap.mark_value(*value);
        }
    }
}

impl<A: RootSource + ?Sized, B: RootSource + ?Sized> RootSource for (&A, &B) {
    fn mark_roots(&self, heap: &mut Heap) {
        self.0.mark_roots(heap);
        self.1.mark_roots(heap);
    }
}

/// Collection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcConfig {
    /// Allocated bytes that trigger the first collection
    pub initial_threshold: usize,
    /// Next threshold = live bytes after a collection × this factor
    pub growth_factor: usize,
    /// Collect before every allocation
    pub stress: bool,
}

impl GcConfig {
    /// Sets the first collection threshold
    pub fn with_initial_threshold(mut self, bytes: usize) -> Self {
        self.initial_threshold = bytes;
        self
    }

    /// Sets the growth factor
    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor.max(1);
        self
    }

    /// Enables or disables stress mode
    pub fn with_stress(mut self, stress: bool) -> Self {
        self.stress = stress;
        self
    }
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            initial_threshold: DEFAULT_INITIAL_THRESHOLD,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            stress: false,
        }
    }
}

/// Collection counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Completed collections
    pub collections: usize,
    /// Objects freed over all collections
    pub objects_freed: usize,
    /// Bytes freed over all collections
    pub bytes_freed: usize,
}

impl Heap {
    /// Runs a full collection.
    ///
    /// Everything not reachable from `roots` is freed and the next threshold
    /// becomes the live size times the growth factor.
    pub fn collect(&mut self, roots: &dyn RootSource) {
        let before = self.bytes_allocated;
        debug!(bytes = before, threshold = self.next_gc, "gc begin");

        roots.mark_roots(self);
        self.trace_references();
        self.remove_white_strings();
        let (objects, bytes) = self.sweep();

        self.next_gc = self.bytes_allocated * self.config.growth_factor;
        self.stats.collections += 1;
        self.stats.objects_freed += objects;
        self.stats.bytes_freed += bytes;
        debug!(
            collected = before - self.bytes_allocated,
            objects,
            from = before,
            to = self.bytes_allocated,
            next = self.next_gc,
            "gc end"
        );
    }

    /// Marks a value if it refers to a heap object.
    pub fn mark_value(&mut self, value: Value) {
        if let Value::Obj(handle) = value {
            self.mark_object(handle);
        }
    }

    /// Marks an object and queues it for scanning.
    pub fn mark_object(&mut self, handle: ObjRef) {
        let slot = &mut self.slots[handle.index()];
        if slot.marked || slot.object.is_none() {
            return;
        }
        slot.marked = true;
        self.gray.push(handle);
    }

    /// Whether an object is marked in the collection in progress.
    pub fn is_marked(&self, handle: ObjRef) -> bool {
        self.slots[handle.index()].marked
    }

    fn trace_references(&mut self) {
        let mut children = Vec::new();
        while let Some(handle) = self.gray.pop() {
            self.blacken(handle, &mut children);
        }
    }

    fn blacken(&mut self, handle: ObjRef, children: &mut Vec<Value>) {
        children.clear();
        match self.get(handle) {
            HeapObject::String(_) | HeapObject::Native(_) => {}
            HeapObject::Function(function) => {
                if let Some(name) = function.name {
                    children.push(Value::Obj(name));
                }
                children.extend_from_slice(&function.chunk.constants);
            }
            HeapObject::Closure(closure) => {
                children.push(Value::Obj(closure.function));
                children.extend(closure.upvalues.iter().copied().map(Value::Obj));
            }
            // An open upvalue's value lives in a stack slot, which is a root.
            HeapObject::Upvalue(Upvalue::Open(_)) => {}
            HeapObject::Upvalue(Upvalue::Closed(value)) => children.push(*value),
        }
        for child in children.iter() {
            self.mark_value(*child);
        }
    }

    fn remove_white_strings(&mut self) {
        let slots = &self.slots;
        self.strings.retain(|_, bucket| {
            bucket.retain(|handle| slots[handle.index()].marked);
            !bucket.is_empty()
        });
    }

    fn sweep(&mut self) -> (usize, usize) {
        let mut objects = 0;
        let mut bytes = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.object.is_none() {
                continue;
            }
            if slot.marked {
                slot.marked = false;
                continue;
            }
            if let Some(object) = slot.object.take() {
                trace!(handle = index, kind = %object.kind(), size = slot.size, "free");
            }
            objects += 1;
            bytes += slot.size;
            self.free.push(index as u32);
        }
        self.bytes_allocated -= bytes;
        (objects, bytes)
    }
}
