//! The stack virtual machine
//!
//! Executes one chunk at a time. Globals live in a name-keyed table that
//! outlasts each run, so a REPL can keep its definitions between lines.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use lox::{Engine, EvalContext, EvalError, LoxError, RuntimeError};

use crate::chunk::{Chunk, OpCode};
use crate::compiler::compile;
use crate::debug::disassemble_instruction;
use crate::error::BytecodeError;
use crate::value::Value;

/// Why execution stopped early.
enum Fault {
    /// A Lox runtime error
    Eval(EvalError),
    /// A malformed chunk
    Decode(BytecodeError),
}

impl From<EvalError> for Fault {
    fn from(err: EvalError) -> Self {
        Fault::Eval(err)
    }
}

impl From<BytecodeError> for Fault {
    fn from(err: BytecodeError) -> Self {
        Fault::Decode(err)
    }
}

type Step<T> = Result<T, Fault>;

/// A bytecode virtual machine.
///
/// # Example
///
/// ```
/// use lox::SharedOutput;
/// use lox_bytecode::Vm;
///
/// let out = SharedOutput::new();
/// let mut vm = Vm::with_output(out.clone());
///
/// vm.interpret("var a = 40;").unwrap();
/// vm.interpret("print a + 2;").unwrap();
///
/// assert_eq!(out.contents(), "42\n");
/// ```
pub struct Vm {
    ip: usize,
    stack: Vec<Value>,
    globals: HashMap<Rc<str>, Value>,
    out: Box<dyn Write>,
    ctx: EvalContext,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Create a VM printing to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Create a VM printing to `out`.
    pub fn with_output(out: impl Write + 'static) -> Self {
        Self {
            ip: 0,
            stack: Vec::new(),
            globals: HashMap::new(),
            out: Box::new(out),
            ctx: EvalContext::default(),
        }
    }

    /// Replace the evaluation context.
    pub fn with_context(mut self, ctx: EvalContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// The evaluation context (interrupt flag, tracing).
    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// Look up a global by name.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Compile and run `source`.
    ///
    /// # Errors
    ///
    /// Returns the compile errors, or the runtime error that stopped it.
    pub fn interpret(&mut self, source: &str) -> Result<(), LoxError> {
        let chunk = compile(source)?;
        self.run(&chunk)?;
        Ok(())
    }

    /// Execute a compiled chunk.
    ///
    /// On error the value stack is cleared; globals defined before the
    /// error are kept.
    ///
    /// # Errors
    ///
    /// Returns the runtime error that stopped execution. A chunk that does
    /// not decode is reported as a runtime error too.
    pub fn run(&mut self, chunk: &Chunk) -> Result<(), RuntimeError> {
        self.ip = 0;
        let result = self.execute(chunk);
        let flushed = self.out.flush();

        result.map_err(|fault| {
            self.stack.clear();
            let err = match fault {
                Fault::Eval(err) => RuntimeError::from(err),
                Fault::Decode(err) => RuntimeError::new(err.to_string(), chunk.line(self.ip)),
            };
            tracing::debug!(line = err.line, "runtime error: {}", err.message);
            err
        })?;

        flushed.map_err(|e| RuntimeError::new(format!("Output error: {}", e), 0))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════

    fn execute(&mut self, chunk: &Chunk) -> Step<()> {
        loop {
            let offset = self.ip;
            let line = chunk.line(offset);
            let op = OpCode::decode(chunk.byte(offset)?, offset)?;

            if self.ctx.trace {
                let mut listing = String::new();
                disassemble_instruction(chunk, offset, &mut listing)?;
                tracing::trace!(
                    stack = ?self.stack,
                    "execute {}",
                    listing.trim_end()
                );
            }

            self.ip = offset + 1 + op.operand_len();

            match op {
                OpCode::Constant => {
                    let index = usize::from(chunk.byte(offset + 1)?);
                    let value = chunk.constant(index)?.clone();
                    self.push(value);
                }
                OpCode::Nil => self.push(Value::Nil),
                OpCode::True => self.push(Value::Bool(true)),
                OpCode::False => self.push(Value::Bool(false)),
                OpCode::Pop => {
                    self.pop(offset)?;
                }

                // Variables
                OpCode::GetLocal => {
                    let slot = usize::from(chunk.byte(offset + 1)?);
                    let value = self
                        .stack
                        .get(slot)
                        .cloned()
                        .ok_or(BytecodeError::StackUnderflow { offset })?;
                    self.push(value);
                }
                OpCode::SetLocal => {
                    let slot = usize::from(chunk.byte(offset + 1)?);
                    let value = self.peek(offset)?.clone();
                    let target = self
                        .stack
                        .get_mut(slot)
                        .ok_or(BytecodeError::StackUnderflow { offset })?;
                    *target = value;
                }
                OpCode::GetGlobal => {
                    let name = read_name(chunk, offset)?;
                    let Some(value) = self.globals.get(&name) else {
                        return Err(undefined(&name, line));
                    };
                    let value = value.clone();
                    self.push(value);
                }
                OpCode::DefineGlobal => {
                    let name = read_name(chunk, offset)?;
                    let value = self.pop(offset)?;
                    self.globals.insert(name, value);
                }
                OpCode::SetGlobal => {
                    let name = read_name(chunk, offset)?;
                    if !self.globals.contains_key(&name) {
                        return Err(undefined(&name, line));
                    }
                    let value = self.peek(offset)?.clone();
                    self.globals.insert(name, value);
                }

                // Operators
                OpCode::Equal => {
                    let b = self.pop(offset)?;
                    let a = self.pop(offset)?;
                    self.push(Value::Bool(a == b));
                }
                OpCode::Greater => self.compare(offset, line, |a, b| a > b)?,
                OpCode::Less => self.compare(offset, line, |a, b| a < b)?,
                OpCode::GreaterEqual => self.compare(offset, line, |a, b| a >= b)?,
                OpCode::LessEqual => self.compare(offset, line, |a, b| a <= b)?,
                OpCode::Add => self.add(offset, line)?,
                OpCode::Subtract => self.arithmetic(offset, line, |a, b| a - b)?,
                OpCode::Multiply => self.arithmetic(offset, line, |a, b| a * b)?,
                OpCode::Divide => self.arithmetic(offset, line, |a, b| a / b)?,
                OpCode::Not => {
                    let value = self.pop(offset)?;
                    self.push(Value::Bool(!value.is_truthy()));
                }
                OpCode::Negate => match self.pop(offset)? {
                    Value::Number(n) => self.push(Value::Number(-n)),
                    _ => return Err(EvalError::OperandNotNumber { line }.into()),
                },

                // Statements and control flow
                OpCode::Print => {
                    let value = self.pop(offset)?;
                    writeln!(self.out, "{}", value).map_err(|e| EvalError::Output {
                        message: e.to_string(),
                        line,
                    })?;
                }
                OpCode::Jump => {
                    self.ip += usize::from(chunk.short(offset + 1)?);
                }
                OpCode::JumpIfFalse => {
                    let distance = usize::from(chunk.short(offset + 1)?);
                    if !self.peek(offset)?.is_truthy() {
                        self.ip += distance;
                    }
                }
                OpCode::Loop => {
                    if self.ctx.is_interrupted() {
                        return Err(EvalError::Interrupted { line }.into());
                    }
                    let distance = usize::from(chunk.short(offset + 1)?);
                    self.ip = self
                        .ip
                        .checked_sub(distance)
                        .ok_or(BytecodeError::Truncated { offset })?;
                }
                OpCode::Return => return Ok(()),
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Stack
    // ═══════════════════════════════════════════════════════════════════

    fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    fn pop(&mut self, offset: usize) -> Result<Value, BytecodeError> {
        self.stack
            .pop()
            .ok_or(BytecodeError::StackUnderflow { offset })
    }

    fn peek(&self, offset: usize) -> Result<&Value, BytecodeError> {
        self.stack
            .last()
            .ok_or(BytecodeError::StackUnderflow { offset })
    }

    fn operands(&mut self, offset: usize) -> Result<(Value, Value), BytecodeError> {
        let b = self.pop(offset)?;
        let a = self.pop(offset)?;
        Ok((a, b))
    }

    fn arithmetic(&mut self, offset: usize, line: usize, op: fn(f64, f64) -> f64) -> Step<()> {
        match self.operands(offset)? {
            (Value::Number(a), Value::Number(b)) => {
                self.push(Value::Number(op(a, b)));
                Ok(())
            }
            _ => Err(EvalError::OperandsNotNumbers { line }.into()),
        }
    }

    fn compare(&mut self, offset: usize, line: usize, op: fn(f64, f64) -> bool) -> Step<()> {
        match self.operands(offset)? {
            (Value::Number(a), Value::Number(b)) => {
                self.push(Value::Bool(op(a, b)));
                Ok(())
            }
            _ => Err(EvalError::OperandsNotNumbers { line }.into()),
        }
    }

    fn add(&mut self, offset: usize, line: usize) -> Step<()> {
        let result = match self.operands(offset)? {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::String(a), Value::String(b)) => Value::string(format!("{}{}", a, b)),
            _ => return Err(EvalError::InvalidAddOperands { line }.into()),
        };
        self.push(result);
        Ok(())
    }
}

/// Read the variable name named by the operand of the instruction at
/// `offset`.
fn read_name(chunk: &Chunk, offset: usize) -> Result<Rc<str>, BytecodeError> {
    let index = usize::from(chunk.byte(offset + 1)?);
    match chunk.constant(index)? {
        Value::String(name) => Ok(Rc::clone(name)),
        _ => Err(BytecodeError::InvalidName { index }),
    }
}

fn undefined(name: &str, line: usize) -> Fault {
    Fault::Eval(EvalError::UndefinedVariable {
        name: name.to_string(),
        line,
    })
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.globals.keys().collect();
        names.sort();
        f.debug_struct("Vm")
            .field("stack", &self.stack)
            .field("globals", &names)
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl Engine for Vm {
    fn name(&self) -> &'static str {
        "bytecode"
    }

    fn context(&self) -> &EvalContext {
        &self.ctx
    }

    fn run(&mut self, source: &str) -> Result<(), LoxError> {
        self.interpret(source)
    }
}
