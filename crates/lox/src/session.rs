//! Running source text end to end
//!
//! A [`Session`] drives the whole pipeline (scan, parse, resolve,
//! interpret) and keeps interpreter state between runs. The [`Engine`]
//! trait is the seam the command line uses to pick between this
//! tree-walker and other back ends.

use std::io::Write;

use crate::ast::Stmt;
use crate::context::EvalContext;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::parse;
use crate::resolver::resolve;
use crate::scanner::scan;
use crate::value::Value;

/// A back end that can run Lox source.
pub trait Engine {
    /// Short name of the engine, for logs.
    fn name(&self) -> &'static str;

    /// The context controlling limits, interruption and tracing.
    fn context(&self) -> &EvalContext;

    /// Run a complete program.
    ///
    /// # Errors
    ///
    /// Returns the static errors, or the runtime error that stopped it.
    fn run(&mut self, source: &str) -> Result<(), LoxError>;

    /// Run one line typed at a prompt. Returns the rendered value when
    /// the line was a bare expression.
    ///
    /// # Errors
    ///
    /// Returns the static errors, or the runtime error that stopped it.
    fn run_repl_line(&mut self, line: &str) -> Result<Option<String>, LoxError> {
        self.run(line).map(|()| None)
    }
}

/// Scan and parse `source`, merging scanner and parser errors.
///
/// Scanner errors come first; the parser still runs over whatever tokens
/// were produced, so both kinds are reported together.
///
/// # Errors
///
/// Returns every scanner and parser error.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>, LoxError> {
    let (tokens, mut errors) = scan(source);

    match parse(tokens) {
        Ok(statements) if errors.is_empty() => Ok(statements),
        Ok(_) => Err(LoxError::Compile(errors)),
        Err(parse_errors) => {
            errors.extend(parse_errors);
            Err(LoxError::Compile(errors))
        }
    }
}

/// A tree-walking interpreter session.
///
/// # Example
///
/// ```
/// use lox::{Session, SharedOutput};
///
/// let out = SharedOutput::new();
/// let mut session = Session::with_output(out.clone());
///
/// session.run("var greeting = \"hi\";").unwrap();
/// session.run("print greeting;").unwrap();
///
/// assert_eq!(out.contents(), "hi\n");
/// ```
#[derive(Debug, Default)]
pub struct Session {
    interpreter: Interpreter,
}

impl Session {
    /// Create a session printing to stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session printing to `out`.
    pub fn with_output(out: impl Write + 'static) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    /// Replace the evaluation context.
    pub fn with_context(mut self, ctx: EvalContext) -> Self {
        self.interpreter = self.interpreter.with_context(ctx);
        self
    }

    /// The underlying interpreter.
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Run a complete program.
    ///
    /// Nothing executes unless the whole program scans, parses and
    /// resolves cleanly.
    ///
    /// # Errors
    ///
    /// Returns the static errors, or the runtime error that stopped it.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let statements = self.compile(source)?;
        self.interpreter.interpret(&statements)?;
        Ok(())
    }

    /// Run one line typed at a prompt.
    ///
    /// A line holding a single expression statement is evaluated and its
    /// value returned. The trailing `;` may be left off such a line.
    ///
    /// # Errors
    ///
    /// Returns the static errors, or the runtime error that stopped it.
    pub fn eval_line(&mut self, line: &str) -> Result<Option<Value>, LoxError> {
        let statements = match self.compile(line) {
            Ok(statements) => statements,
            Err(err) => {
                let trimmed = line.trim_end();
                if trimmed.ends_with(';') || trimmed.ends_with('}') {
                    return Err(err);
                }
                self.compile(&format!("{};", trimmed)).map_err(|_| err)?
            }
        };

        if let [stmt @ Stmt::Expression(_)] = statements.as_slice() {
            let value = self.interpreter.execute_for_value(stmt)?;
            return Ok(value);
        }

        self.interpreter.interpret(&statements)?;
        Ok(None)
    }

    fn compile(&mut self, source: &str) -> Result<Vec<Stmt>, LoxError> {
        let statements = parse_source(source)?;
        let locals = resolve(&statements)?;
        self.interpreter.add_locals(locals);
        Ok(statements)
    }
}

impl Engine for Session {
    fn name(&self) -> &'static str {
        "tree-walk"
    }

    fn context(&self) -> &EvalContext {
        self.interpreter.context()
    }

    fn run(&mut self, source: &str) -> Result<(), LoxError> {
        Session::run(self, source)
    }

    fn run_repl_line(&mut self, line: &str) -> Result<Option<String>, LoxError> {
        Ok(self.eval_line(line)?.map(|value| value.to_string()))
    }
}
