//! GC root integration for the VM
//!
//! The VM's roots are its value stack, the closure of every active frame,
//! the open upvalue cells and both keys and values of the globals table.
//! [`vm_roots!`] borrows exactly those fields so the heap can be borrowed
//! mutably alongside them.

use crate::call_frame::CallFrame;
use crate::upvalue::OpenUpvalues;
use core_types::{ObjRef, Value};
use fnv::FnvHashMap;
use memory_manager::{Heap, RootSource};

/// Borrowed view of everything the VM keeps alive
pub(crate) struct VmRoots<'a> {
    pub stack: &'a [Value],
    pub frames: &'a [CallFrame],
    pub globals: &'a FnvHashMap<ObjRef, Value>,
    pub open_upvalues: &'a OpenUpvalues,
}

impl RootSource for VmRoots<'_> {
    fn mark_roots(&self, heap: &mut Heap) {
        for value in self.stack {
            heap.mark_value(*value);
        }
        for frame in self.frames {
            heap.mark_object(frame.closure);
        }
        for (_, cell) in self.open_upvalues.iter() {
            heap.mark_object(cell);
        }
        for (name, value) in self.globals {
            heap.mark_object(*name);
            heap.mark_value(*value);
        }
    }
}

/// Roots of a `VM`, borrowing only the fields that hold them
macro_rules! vm_roots {
    ($vm:expr) => {
        $crate::gc_integration::VmRoots {
            stack: &$vm.stack,
            frames: &$vm.frames,
            globals: &$vm.globals,
            open_upvalues: &$vm.open_upvalues,
        }
    };
}

pub(crate) use vm_roots;
