//! Call frame for function call stack management

use core_types::ObjRef;

/// Maximum call depth
pub const FRAMES_MAX: usize = 64;

/// Call frame representing one closure invocation
///
/// The frame's locals live in the shared value stack starting at `slots`;
/// slot zero holds the callee itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallFrame {
    /// The closure being executed
    pub closure: ObjRef,
    /// The closure's function, cached to avoid a lookup per instruction
    pub function: ObjRef,
    /// Offset of the next byte to execute in the function's chunk
    pub ip: usize,
    /// Stack index of the frame's first slot
    pub slots: usize,
}

impl CallFrame {
    /// Create a frame positioned at the start of `function`
    pub fn new(closure: ObjRef, function: ObjRef, slots: usize) -> Self {
        Self {
            closure,
            function,
            ip: 0,
            slots,
        }
    }
}
