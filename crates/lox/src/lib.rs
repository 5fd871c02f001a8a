//! # Lox
//!
//! A tree-walking interpreter for the Lox language.
//!
//! Source text flows through a fixed pipeline:
//!
//! ```text
//! Source → [Scanner] → Tokens → [Parser] → AST → [Resolver] → [Interpreter] → Output
//! ```
//!
//! - **Scanner**: turns characters into tokens, collecting lexical errors
//! - **Parser**: recursive descent into statements, recovering after errors
//! - **Resolver**: computes lexical scope distances before anything runs
//! - **Interpreter**: walks the tree with closures, classes and inheritance
//!
//! [`Session`] wires the stages together and keeps state between runs,
//! which is all a REPL needs.
//!
//! ```
//! use lox::{Session, SharedOutput};
//!
//! let out = SharedOutput::new();
//! let mut session = Session::with_output(out.clone());
//! session
//!     .run("class Greeter { hi(name) { print \"hi \" + name; } } Greeter().hi(\"lox\");")
//!     .unwrap();
//! assert_eq!(out.contents(), "hi lox\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod context;
pub mod environment;
pub mod error;
pub mod eval;
pub mod interpreter;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;

// Re-export main types
pub use ast::{Expr, ExprId, ExprKind, FunctionDecl, LiteralValue, Stmt};
pub use context::{EvalContext, DEFAULT_MAX_CALL_DEPTH};
pub use environment::{EnvRef, Environment};
pub use error::{EvalError, LoxError, RuntimeError, SyntaxError};
pub use eval::{call_value, eval_expr, ControlFlow, Evaluate, Execute};
pub use interpreter::Interpreter;
pub use output::SharedOutput;
pub use parser::{parse, Parser};
pub use resolver::{resolve, Locals, Resolver};
pub use scanner::{scan, Scanner};
pub use session::{parse_source, Engine, Session};
pub use token::{Literal, Token, TokenType};
pub use value::{format_number, LoxClass, LoxFunction, LoxInstance, NativeFunction, Value};

/// Lox crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
