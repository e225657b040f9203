//! Runtime orchestration for Lox execution
//!
//! Wraps one persistent [`VM`] so that globals survive between REPL lines.

use crate::error::{CliError, CliResult};
use core_types::InterpretError;
use interpreter::{VmConfig, VM};
use tracing::{info, warn};

/// Main runtime driving the VM for files, inline code and the REPL
pub struct Runtime {
    /// Persistent VM instance for maintaining state
    vm: VM,
}

impl Runtime {
    /// Create a new runtime instance
    ///
    /// # Example
    /// ```
    /// use interpreter::VmConfig;
    /// use lox_cli::Runtime;
    ///
    /// let runtime = Runtime::new(VmConfig::default());
    /// ```
    pub fn new(config: VmConfig) -> Self {
        Self {
            vm: VM::with_config(config),
        }
    }

    /// Execute a Lox file
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or execution fails
    ///
    /// # Example
    /// ```no_run
    /// use interpreter::VmConfig;
    /// use lox_cli::Runtime;
    ///
    /// let mut runtime = Runtime::new(VmConfig::default());
    /// runtime.execute_file("example.lox").unwrap();
    /// ```
    pub fn execute_file(&mut self, path: &str) -> CliResult<()> {
        let source = std::fs::read_to_string(path)?;
        info!(path, bytes = source.len(), "running file");
        self.execute_string(&source)
    }

    /// Execute a Lox source string
    ///
    /// Program output is kept in the VM; read it with
    /// [`Runtime::take_output`] whether or not this succeeds.
    ///
    /// # Example
    /// ```
    /// use interpreter::VmConfig;
    /// use lox_cli::Runtime;
    ///
    /// let mut runtime = Runtime::new(VmConfig::default());
    /// runtime.execute_string("print 40 + 2;").unwrap();
    /// assert_eq!(runtime.take_output(), "42\n");
    /// ```
    pub fn execute_string(&mut self, source: &str) -> CliResult<()> {
        self.vm.run_source(source).map_err(|err| match err {
            InterpretError::Compile(errors) => {
                let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
                CliError::Compile(lines.join("\n"))
            }
            InterpretError::Runtime(error) => CliError::Runtime(error.report()),
        })
    }

    /// Take the program output produced so far
    pub fn take_output(&mut self) -> String {
        let truncated = self.vm.output_buffer().truncated();
        let output = self.vm.take_output();
        if truncated {
            warn!("program output exceeded the buffer and was truncated");
        }
        output
    }

    /// The underlying VM
    pub fn vm(&self) -> &VM {
        &self.vm
    }

    /// Start the interactive REPL
    pub fn repl(&mut self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}
