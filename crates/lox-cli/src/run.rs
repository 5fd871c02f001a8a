//! Running scripts and dumping intermediate forms

use std::fs;
use std::path::Path;

use anyhow::Context;
use lox::ast::printer::print_program;
use lox::{parse_source, scan, Engine, EvalContext, LoxError, Session};
use lox_bytecode::{compile, disassemble, Vm};

use crate::{Dump, EngineKind, Options};

/// Command line usage error (sysexits `EX_USAGE`).
pub const EX_USAGE: u8 = 64;

/// Static errors in the input (sysexits `EX_DATAERR`).
pub const EX_DATAERR: u8 = 65;

/// Runtime error (sysexits `EX_SOFTWARE`).
pub const EX_SOFTWARE: u8 = 70;

/// The script could not be read (sysexits `EX_IOERR`).
pub const EX_IOERR: u8 = 74;

/// Run whatever the options ask for and return the process exit code.
///
/// # Errors
///
/// Returns I/O and terminal failures; Lox errors are reported on stderr
/// and turned into exit codes instead.
pub fn run(options: &Options) -> anyhow::Result<u8> {
    match (&options.script, options.dump) {
        (Some(path), Some(dump)) => dump_file(path, dump),
        (Some(path), None) => run_file(path, options),
        (None, Some(_)) => {
            eprintln!("--dump needs a script to read");
            Ok(EX_USAGE)
        }
        (None, None) => {
            let mut engine = engine(options);
            crate::repl::run(engine.as_mut())
        }
    }
}

/// Build the engine selected on the command line.
pub fn engine(options: &Options) -> Box<dyn Engine> {
    let ctx = EvalContext::with_max_call_depth(options.max_call_depth).with_trace(options.trace);

    match options.engine {
        EngineKind::TreeWalk => Box::new(Session::new().with_context(ctx)),
        EngineKind::Bytecode => Box::new(Vm::new().with_context(ctx)),
    }
}

fn read_script(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(err) => {
            eprintln!("Could not read file '{}': {}", path.display(), err);
            None
        }
    }
}

fn run_file(path: &Path, options: &Options) -> anyhow::Result<u8> {
    let Some(source) = read_script(path) else {
        return Ok(EX_IOERR);
    };

    let mut engine = engine(options);
    tracing::debug!(engine = engine.name(), script = %path.display(), "running script");

    match engine.run(&source) {
        Ok(()) => Ok(0),
        Err(err) => Ok(report(&err)),
    }
}

fn dump_file(path: &Path, dump: Dump) -> anyhow::Result<u8> {
    let Some(source) = read_script(path) else {
        return Ok(EX_IOERR);
    };

    match dump {
        Dump::Tokens => {
            let (tokens, errors) = scan(&source);
            if !errors.is_empty() {
                return Ok(report(&LoxError::Compile(errors)));
            }
            let json = serde_json::to_string_pretty(&tokens).context("serializing tokens")?;
            println!("{}", json);
        }
        Dump::Ast => match parse_source(&source) {
            Ok(statements) => println!("{}", print_program(&statements)),
            Err(err) => return Ok(report(&err)),
        },
        Dump::Bytecode => {
            let chunk = match compile(&source) {
                Ok(chunk) => chunk,
                Err(errors) => return Ok(report(&LoxError::Compile(errors))),
            };
            let name = path.display().to_string();
            print!("{}", disassemble(&chunk, &name)?);
        }
    }

    Ok(0)
}

/// Print a Lox error to stderr and pick the matching exit code.
pub fn report(err: &LoxError) -> u8 {
    eprintln!("{}", err);
    match err {
        LoxError::Compile(_) => EX_DATAERR,
        LoxError::Runtime(_) => EX_SOFTWARE,
    }
}
