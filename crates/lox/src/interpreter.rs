//! The tree-walking interpreter
//!
//! Holds everything that survives between statements: the global scope,
//! the current scope, the resolver's side table and the output sink.

use std::io::{self, Write};
use std::rc::Rc;

use crate::ast::{ExprId, Stmt};
use crate::context::EvalContext;
use crate::environment::{EnvRef, Environment};
use crate::error::{EvalError, RuntimeError};
use crate::eval::stmt::enter_statement;
use crate::eval::{Evaluate, Execute};
use crate::resolver::Locals;
use crate::token::Token;
use crate::value::Value;

/// Executes resolved programs.
///
/// State persists across calls to [`Interpreter::interpret`], which is
/// what lets a REPL keep its definitions between lines.
pub struct Interpreter {
    pub(crate) globals: EnvRef,
    pub(crate) environment: EnvRef,
    pub(crate) locals: Locals,
    pub(crate) ctx: EvalContext,
    pub(crate) out: Box<dyn Write>,
    pub(crate) call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Create an interpreter printing to `out`.
    pub fn with_output(out: impl Write + 'static) -> Self {
        let globals = Environment::with_prelude().into_ref();
        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: Locals::new(),
            ctx: EvalContext::default(),
            out: Box::new(out),
            call_depth: 0,
        }
    }

    /// Replace the evaluation context.
    pub fn with_context(mut self, ctx: EvalContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// The evaluation context (limits, interrupt flag, tracing).
    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// The global scope.
    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Merge a resolver side table into the interpreter's.
    pub fn add_locals(&mut self, locals: Locals) {
        self.locals.extend(locals);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Entry Points
    // ═══════════════════════════════════════════════════════════════════

    /// Execute a resolved program, stopping at the first runtime error.
    ///
    /// # Errors
    ///
    /// Returns the runtime error that stopped execution.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        let result = statements.iter().try_for_each(|stmt| stmt.execute(self));
        self.finish(result)
    }

    /// Execute one resolved statement, keeping the value of an
    /// expression statement instead of discarding it.
    ///
    /// # Errors
    ///
    /// Returns the runtime error raised while executing.
    pub fn execute_for_value(&mut self, stmt: &Stmt) -> Result<Option<Value>, RuntimeError> {
        let result = match stmt {
            Stmt::Expression(expr) => {
                enter_statement(stmt, self).and_then(|()| expr.eval(self).map(Some))
            }
            _ => stmt.execute(self).map(|()| None),
        };
        self.finish(result)
    }

    fn finish<T>(&mut self, result: Result<T, EvalError>) -> Result<T, RuntimeError> {
        let flushed = self.out.flush();

        let value = result.map_err(|err| {
            self.call_depth = 0;
            self.environment = Rc::clone(&self.globals);
            tracing::debug!(line = err.line(), "runtime error: {}", err);
            RuntimeError::from(err)
        })?;

        flushed.map_err(|e| RuntimeError::new(format!("Output error: {}", e), 0))?;
        Ok(value)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scopes and Calls
    // ═══════════════════════════════════════════════════════════════════

    /// Execute `statements` in `environment`, restoring the current scope
    /// afterwards even when a statement fails or returns.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: EnvRef,
    ) -> Result<(), EvalError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = statements.iter().try_for_each(|stmt| stmt.execute(self));
        self.environment = previous;
        result
    }

    /// Read a variable from the scope the resolver chose, or from the
    /// globals when it was not resolved locally.
    pub(crate) fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value, EvalError> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Record entry into a call, failing once the depth limit is passed.
    pub(crate) fn enter_call(&mut self, name: &str, line: usize) -> Result<(), EvalError> {
        if self.call_depth >= self.ctx.max_call_depth {
            return Err(EvalError::StackOverflow {
                depth: self.call_depth + 1,
                max: self.ctx.max_call_depth,
                line,
            });
        }

        self.call_depth += 1;
        if self.ctx.trace {
            tracing::trace!(function = name, depth = self.call_depth, line, "call");
        }
        Ok(())
    }

    /// Record return from a call.
    pub(crate) fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("globals", &self.globals.borrow())
            .field("locals", &self.locals.len())
            .field("ctx", &self.ctx)
            .field("call_depth", &self.call_depth)
            .finish()
    }
}
