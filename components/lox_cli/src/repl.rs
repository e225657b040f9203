//! REPL (Read-Eval-Print Loop) implementation

use crate::error::{CliError, CliResult};
use crate::runtime::Runtime;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the interactive REPL
///
/// Each complete input is run on the same VM, so globals carry over.
/// Input with unbalanced braces, parentheses or an open string continues on
/// the next line.
pub fn run_repl(runtime: &mut Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("Lox {}", env!("CARGO_PKG_VERSION"));
    println!("Type .help for commands, .exit to quit.");

    let mut line_buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "... " } else { "> " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline && trimmed.starts_with('.') {
                    if handle_repl_command(trimmed) == Command::Exit {
                        break;
                    }
                    continue;
                }

                if in_multiline {
                    line_buffer.push('\n');
                }
                line_buffer.push_str(&line);

                if !is_input_complete(&line_buffer) {
                    in_multiline = true;
                    continue;
                }
                in_multiline = false;

                let _ = editor.add_history_entry(line_buffer.as_str());
                let result = runtime.execute_string(&line_buffer);
                print!("{}", runtime.take_output());
                if let Err(e) = result {
                    eprintln!("{}", e);
                }
                line_buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                if in_multiline {
                    println!("^C");
                    line_buffer.clear();
                    in_multiline = false;
                } else {
                    println!("Press Ctrl-D or type .exit to quit");
                }
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!();
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Continue,
    Exit,
}

/// Handle special REPL commands
fn handle_repl_command(command: &str) -> Command {
    match command {
        ".exit" => Command::Exit,
        ".help" => {
            println!("REPL Commands:");
            println!("  .help     - Show this help message");
            println!("  .clear    - Clear the screen");
            println!("  .exit     - Exit the REPL");
            Command::Continue
        }
        ".clear" => {
            print!("\x1B[2J\x1B[1;1H");
            Command::Continue
        }
        _ => {
            println!("Unknown command: {}", command);
            println!("Type .help for available commands");
            Command::Continue
        }
    }
}

/// Check if the input appears to be complete
///
/// Balanced braces and parentheses outside strings and `//` comments.
fn is_input_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            '/' if chars.peek() == Some(&'/') => {
                // Skip the rest of the line.
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    depth <= 0 && !in_string
}
