//! Native functions available to every Lox program
//!
//! Natives are plain function pointers ([`NativeFn`]). A host exposes them by
//! implementing [`NativeRegistry`] and calling [`install`] before running
//! user code.
//!
//! # Example
//!
//! ```
//! use builtins::{install, NativeRegistry};
//! use core_types::NativeFn;
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl NativeRegistry for Names {
//!     fn define_native(&mut self, name: &str, _function: NativeFn) {
//!         self.0.push(name.to_string());
//!     }
//! }
//!
//! let mut names = Names::default();
//! install(&mut names);
//! assert_eq!(names.0, vec!["clock"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;

use core_types::NativeFn;

pub use clock::clock;

/// Every native, in registration order
pub const NATIVES: &[(&str, NativeFn)] = &[("clock", clock)];

/// Something natives can be registered with, usually the VM's globals
pub trait NativeRegistry {
    /// Bind `function` to the global `name`
    fn define_native(&mut self, name: &str, function: NativeFn);
}

/// Register every entry of [`NATIVES`]
pub fn install(registry: &mut impl NativeRegistry) {
    for (name, function) in NATIVES {
        registry.define_native(name, *function);
    }
}
