//! Integration test suite for the Lox virtual machine
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use builtins;
    pub use bytecode_system;
    pub use core_types;
    pub use interpreter;
    pub use lox_cli;
    pub use memory_manager;
    pub use parser;
}
