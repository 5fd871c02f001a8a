//! Interactive prompt

use lox::Engine;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Prompt shown before each line.
pub const PROMPT: &str = "> ";

/// Read lines until end of input, running each one on `engine`.
///
/// Errors are printed and the session continues. Ctrl-C abandons the
/// current line; Ctrl-D ends the session.
///
/// # Errors
///
/// Returns terminal failures.
pub fn run(engine: &mut dyn Engine) -> anyhow::Result<u8> {
    let mut editor = DefaultEditor::new()?;
    tracing::info!(engine = engine.name(), "starting REPL");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        if line.trim().is_empty() {
            continue;
        }
        editor.add_history_entry(line.as_str())?;

        engine.context().reset_interrupt();
        match engine.run_repl_line(&line) {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => {}
            Err(err) => eprintln!("{}", err),
        }
    }

    Ok(0)
}
