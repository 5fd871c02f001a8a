//! The `lox` command line
//!
//! Runs a script when given a path, otherwise starts a REPL. Either way
//! the work happens on a worker thread with a large stack, so deep Lox
//! recursion hits the configured call depth limit before the native
//! stack runs out.

mod logging;
mod repl;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::{Parser, ValueEnum};
use lox::DEFAULT_MAX_CALL_DEPTH;

use crate::run::{EX_SOFTWARE, EX_USAGE};

/// Stack size of the thread running Lox code.
const STACK_SIZE: usize = 64 * 1024 * 1024;

/// lox - run Lox scripts or start an interactive prompt
#[derive(Parser, Debug)]
#[command(name = "lox", version, about = "Run Lox scripts or start a REPL")]
pub struct Options {
    /// Script to run; starts a REPL when omitted
    pub script: Option<PathBuf>,

    /// Execution engine
    #[arg(long, value_enum, default_value_t = EngineKind::TreeWalk)]
    pub engine: EngineKind,

    /// Print an intermediate form of the script instead of running it
    #[arg(long, value_enum)]
    pub dump: Option<Dump>,

    /// Maximum depth of nested Lox calls
    #[arg(long, env = "LOX_MAX_CALL_DEPTH", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    pub max_call_depth: usize,

    /// Log every executed statement or instruction
    #[arg(long)]
    pub trace: bool,

    /// Raise the log level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Which back end runs the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Resolve and walk the syntax tree
    TreeWalk,
    /// Compile to bytecode and run on the stack VM
    Bytecode,
}

/// Intermediate forms `--dump` can print.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Dump {
    /// Scanner output as JSON
    Tokens,
    /// Parsed program in prefix form
    Ast,
    /// Disassembled bytecode
    Bytecode,
}

fn main() -> ExitCode {
    let options = match Options::try_parse() {
        Ok(options) => options,
        Err(err) => {
            let code = if err.use_stderr() { EX_USAGE } else { 0 };
            // Nothing more to report if the usage text itself can't be written.
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    logging::init(options.verbose, options.trace);
    tracing::debug!(?options, "starting");

    let worker = thread::Builder::new()
        .name("lox".to_string())
        .stack_size(STACK_SIZE)
        .spawn(move || run::run(&options));

    let result = match worker {
        Ok(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(anyhow::anyhow!("interpreter thread panicked"))),
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(EX_SOFTWARE)
        }
    }
}
