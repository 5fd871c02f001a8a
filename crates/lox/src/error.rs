//! Error types for scanning, parsing, resolving and evaluating Lox

use thiserror::Error;

use crate::eval::ControlFlow;
use crate::token::{Token, TokenType};

/// A static error found before execution (scanner, parser or resolver).
///
/// Renders as `[line N] Error at 'lexeme': message`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    /// Line the error was reported on
    pub line: usize,

    /// Location suffix: empty, ` at end` or ` at 'lexeme'`
    pub location: String,

    /// Human-readable message
    pub message: String,
}

impl SyntaxError {
    /// An error attached to a line only (scanner errors).
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            location: String::new(),
            message: message.into(),
        }
    }

    /// An error attached to a token.
    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let location = if token.typ == TokenType::Eof {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        Self {
            line: token.line,
            location,
            message: message.into(),
        }
    }
}

/// A runtime error as reported to the user.
///
/// Renders as the message followed by `[line N]` on its own line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    /// Human-readable message
    pub message: String,

    /// Line of the token that triggered the error
    pub line: usize,
}

impl RuntimeError {
    /// Create a new runtime error.
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Errors raised while evaluating the tree.
///
/// `ControlFlow` is not a real error: `return` unwinds through the
/// evaluator as an `Err` until the enclosing call catches it.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Unary operand of the wrong type
    #[error("Operand must be a number.")]
    OperandNotNumber {
        /// Operator line
        line: usize,
    },

    /// Binary operands of the wrong type
    #[error("Operands must be numbers.")]
    OperandsNotNumbers {
        /// Operator line
        line: usize,
    },

    /// `+` applied to anything but two numbers or two strings
    #[error("Operands must be two numbers or two strings.")]
    InvalidAddOperands {
        /// Operator line
        line: usize,
    },

    /// Variable not defined in any enclosing scope
    #[error("Undefined variable '{name}'.")]
    UndefinedVariable {
        /// Variable name
        name: String,
        /// Reference line
        line: usize,
    },

    /// Neither a field nor a method with this name
    #[error("Undefined property '{name}'.")]
    UndefinedProperty {
        /// Property name
        name: String,
        /// Reference line
        line: usize,
    },

    /// Property read on a non-instance
    #[error("Only instances have properties.")]
    NotAnInstance {
        /// Property line
        line: usize,
    },

    /// Property write on a non-instance
    #[error("Only instances have fields.")]
    FieldOnNonInstance {
        /// Property line
        line: usize,
    },

    /// Call on something that is not a function or class
    #[error("Can only call functions and classes.")]
    NotCallable {
        /// Closing paren line
        line: usize,
    },

    /// Wrong number of arguments
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        /// Declared arity
        expected: usize,
        /// Arguments supplied
        got: usize,
        /// Closing paren line
        line: usize,
    },

    /// `class A < B` where `B` is not a class
    #[error("Superclass must be a class.")]
    SuperclassNotClass {
        /// Superclass name line
        line: usize,
    },

    /// Call depth exceeded the configured maximum
    #[error("Stack overflow.")]
    StackOverflow {
        /// Depth at which the overflow happened
        depth: usize,
        /// Configured maximum
        max: usize,
        /// Call line
        line: usize,
    },

    /// Evaluation was interrupted from outside
    #[error("Interrupted.")]
    Interrupted {
        /// Line of the statement about to run
        line: usize,
    },

    /// A native function failed
    #[error("{message}")]
    Native {
        /// Failure description
        message: String,
        /// Call line
        line: usize,
    },

    /// Writing program output failed
    #[error("Output error: {message}")]
    Output {
        /// Underlying I/O error
        message: String,
        /// Print statement line
        line: usize,
    },

    /// Non-local control flow (`return`)
    #[error("control flow escaped its enclosing function")]
    ControlFlow(ControlFlow),
}

impl EvalError {
    /// The source line the error is attributed to.
    pub fn line(&self) -> usize {
        match self {
            EvalError::OperandNotNumber { line }
            | EvalError::OperandsNotNumbers { line }
            | EvalError::InvalidAddOperands { line }
            | EvalError::UndefinedVariable { line, .. }
            | EvalError::UndefinedProperty { line, .. }
            | EvalError::NotAnInstance { line }
            | EvalError::FieldOnNonInstance { line }
            | EvalError::NotCallable { line }
            | EvalError::ArityMismatch { line, .. }
            | EvalError::SuperclassNotClass { line }
            | EvalError::StackOverflow { line, .. }
            | EvalError::Interrupted { line }
            | EvalError::Native { line, .. }
            | EvalError::Output { line, .. } => *line,
            EvalError::ControlFlow(_) => 0,
        }
    }
}

impl From<EvalError> for RuntimeError {
    fn from(err: EvalError) -> Self {
        RuntimeError::new(err.to_string(), err.line())
    }
}

/// Any failure of a complete run: static errors, or a runtime error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoxError {
    /// One or more static errors; nothing was executed
    #[error("{}", join_lines(.0))]
    Compile(Vec<SyntaxError>),

    /// Execution stopped at a runtime error
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl LoxError {
    /// Process exit code for this error (sysexits `EX_DATAERR` / `EX_SOFTWARE`).
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Compile(_) => 65,
            LoxError::Runtime(_) => 70,
        }
    }
}

impl From<Vec<SyntaxError>> for LoxError {
    fn from(errors: Vec<SyntaxError>) -> Self {
        LoxError::Compile(errors)
    }
}

fn join_lines(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_at_token() {
        let token = Token::new(TokenType::Identifier, "foo", None, 3);
        let err = SyntaxError::at_token(&token, "Expect ';' after value.");
        assert_eq!(
            err.to_string(),
            "[line 3] Error at 'foo': Expect ';' after value."
        );
    }

    #[test]
    fn test_syntax_error_at_end() {
        let token = Token::new(TokenType::Eof, "", None, 7);
        let err = SyntaxError::at_token(&token, "Expect expression.");
        assert_eq!(err.to_string(), "[line 7] Error at end: Expect expression.");
    }

    #[test]
    fn test_syntax_error_at_line() {
        let err = SyntaxError::at_line(2, "Unexpected character.");
        assert_eq!(err.to_string(), "[line 2] Error: Unexpected character.");
    }

    #[test]
    fn test_runtime_error_from_eval_error() {
        let err: RuntimeError = EvalError::ArityMismatch {
            expected: 2,
            got: 1,
            line: 4,
        }
        .into();
        assert_eq!(err.to_string(), "Expected 2 arguments but got 1.\n[line 4]");
    }

    #[test]
    fn test_lox_error_exit_codes() {
        assert_eq!(LoxError::Compile(vec![]).exit_code(), 65);
        assert_eq!(
            LoxError::Runtime(RuntimeError::new("boom", 1)).exit_code(),
            70
        );
    }

    #[test]
    fn test_compile_error_joins_lines() {
        let err = LoxError::Compile(vec![
            SyntaxError::at_line(1, "Unexpected character."),
            SyntaxError::at_line(2, "Unterminated string."),
        ]);
        assert_eq!(
            err.to_string(),
            "[line 1] Error: Unexpected character.\n[line 2] Error: Unterminated string."
        );
    }
}
