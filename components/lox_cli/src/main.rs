//! Lox CLI
//!
//! Entry point for the `lox` binary. Parses CLI arguments, installs logging
//! and delegates to the Runtime for execution.

use clap::Parser as ClapParser;
use lox_cli::{Cli, CliResult, Runtime};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let mut runtime = Runtime::new(cli.vm_config());

    let result = if let Some(file) = &cli.file {
        flush_after(&mut runtime, |runtime| runtime.execute_file(file))
    } else if let Some(code) = &cli.eval {
        flush_after(&mut runtime, |runtime| runtime.execute_string(code))
    } else if cli.repl {
        runtime.repl()
    } else {
        println!("Lox {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage:");
        println!("  lox --file <FILE>     Run a Lox script");
        println!("  lox --eval <CODE>     Run inline Lox code");
        println!("  lox --repl            Start interactive REPL");
        println!();
        println!("Run 'lox --help' for more options.");
        Ok(())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Run `f`, then write whatever the program printed, even on error
fn flush_after(runtime: &mut Runtime, f: impl FnOnce(&mut Runtime) -> CliResult<()>) -> CliResult<()> {
    let result = f(runtime);
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(runtime.take_output().as_bytes())?;
    stdout.flush()?;
    result
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("LOX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
