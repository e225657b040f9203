//! Upvalue capture and closing
//!
//! Open upvalues are tracked by the stack slot they refer to. Two closures
//! capturing the same live slot share one cell; when the slot's frame ends
//! (or its block scope closes) the cell takes its own copy of the value.

use crate::vm::VM;
use core_types::{ObjRef, Value};
use memory_manager::Upvalue;

use crate::gc_integration::vm_roots;

/// Open upvalue cells ordered by the stack slot they refer to
#[derive(Debug, Clone, Default)]
pub struct OpenUpvalues {
    cells: Vec<(usize, ObjRef)>,
}

impl OpenUpvalues {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// The open cell for `slot`, if any
    pub fn find(&self, slot: usize) -> Option<ObjRef> {
        self.cells
            .binary_search_by_key(&slot, |(s, _)| *s)
            .ok()
            .map(|index| self.cells[index].1)
    }

    /// Track a new open cell; a slot already tracked keeps its cell
    pub fn insert(&mut self, slot: usize, cell: ObjRef) {
        if let Err(index) = self.cells.binary_search_by_key(&slot, |(s, _)| *s) {
            self.cells.insert(index, (slot, cell));
        }
    }

    /// Remove and return every cell at or above `slot`
    pub fn split_from(&mut self, slot: usize) -> Vec<(usize, ObjRef)> {
        let at = self.cells.partition_point(|(s, _)| *s < slot);
        self.cells.split_off(at)
    }

    /// Iterate `(slot, cell)` pairs, lowest slot first
    pub fn iter(&self) -> impl Iterator<Item = (usize, ObjRef)> + '_ {
        self.cells.iter().copied()
    }

    /// Number of open cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is open
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Forget every cell
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl VM {
    /// Cell for the local at absolute stack `slot`, reusing an open one
    pub(crate) fn capture_upvalue(&mut self, slot: usize) -> ObjRef {
        if let Some(cell) = self.open_upvalues.find(slot) {
            return cell;
        }
        let cell = self.heap.alloc_upvalue(slot, &vm_roots!(self));
        self.open_upvalues.insert(slot, cell);
        cell
    }

    /// Close every open cell referring to `from` or a higher slot
    pub(crate) fn close_upvalues(&mut self, from: usize) {
        for (slot, cell) in self.open_upvalues.split_from(from) {
            let value = self.stack[slot];
            *self.heap.as_upvalue_mut(cell) = Upvalue::Closed(value);
        }
    }

    /// Current value of a captured variable
    pub(crate) fn read_upvalue(&self, cell: ObjRef) -> Value {
        match *self.heap.as_upvalue(cell) {
            Upvalue::Open(slot) => self.stack[slot],
            Upvalue::Closed(value) => value,
        }
    }

    /// Assign a captured variable
    pub(crate) fn write_upvalue(&mut self, cell: ObjRef, value: Value) {
        match self.heap.as_upvalue_mut(cell) {
            Upvalue::Open(slot) => {
                let slot = *slot;
                self.stack[slot] = value;
            }
            Upvalue::Closed(stored) => *stored = value,
        }
    }
}
