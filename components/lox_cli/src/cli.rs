//! Command-line arguments

use clap::Parser;
use interpreter::VmConfig;
use memory_manager::GcConfig;

/// Lox bytecode virtual machine
#[derive(Debug, Clone, Parser)]
#[command(name = "lox", version, about = "Lox bytecode virtual machine")]
pub struct Cli {
    /// Script to run
    #[arg(short, long)]
    pub file: Option<String>,

    /// Source to run inline
    #[arg(short, long)]
    pub eval: Option<String>,

    /// Start the interactive REPL
    #[arg(short, long)]
    pub repl: bool,

    /// Collect garbage before every allocation
    #[arg(long)]
    pub gc_stress: bool,

    /// Allocated bytes that trigger the first collection
    #[arg(long, value_name = "BYTES")]
    pub gc_threshold: Option<usize>,

    /// Value stack capacity
    #[arg(long, value_name = "VALUES")]
    pub stack_max: Option<usize>,
}

impl Cli {
    /// VM settings selected by the flags
    pub fn vm_config(&self) -> VmConfig {
        let mut gc = GcConfig::default().with_stress(self.gc_stress);
        if let Some(bytes) = self.gc_threshold {
            gc = gc.with_initial_threshold(bytes);
        }
        let mut config = VmConfig::default().with_gc(gc);
        if let Some(stack_max) = self.stack_max {
            config = config.with_stack_max(stack_max);
        }
        config
    }
}
