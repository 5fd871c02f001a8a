//! Expression and statement evaluation
//!
//! Each expression kind is evaluated in its own module; the dispatcher
//! here only routes. Statements are executed through [`Execute`].

pub mod binary;
pub mod call;
pub mod control;
pub mod literal;
pub mod logical;
pub mod property;
pub mod stmt;
pub mod unary;
pub mod variable;

pub use call::call_value;
pub use control::ControlFlow;
pub use stmt::Execute;

use crate::ast::{Expr, ExprKind};
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Trait for evaluating expressions to values.
///
/// This is the core abstraction for the tree-walking interpreter.
pub trait Evaluate {
    /// Evaluate this node against the interpreter's current state.
    fn eval(&self, interp: &mut Interpreter) -> Result<Value, EvalError>;
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Expr {
    fn eval(&self, interp: &mut Interpreter) -> Result<Value, EvalError> {
        match &self.kind {
            ExprKind::Literal(value) => Ok(literal::eval_literal(value)),
            ExprKind::Grouping(inner) => inner.eval(interp),
            ExprKind::Unary { operator, right } => unary::eval_unary(operator, right, interp),
            ExprKind::Binary {
                left,
                operator,
                right,
            } => binary::eval_binary(left, operator, right, interp),
            ExprKind::Logical {
                left,
                operator,
                right,
            } => logical::eval_logical(left, operator, right, interp),

            ExprKind::Variable(name) => interp.look_up_variable(name, self.id),
            ExprKind::Assign { name, value } => variable::eval_assign(self.id, name, value, interp),

            ExprKind::Call {
                callee,
                paren,
                arguments,
            } => call::eval_call(callee, paren, arguments, interp),

            ExprKind::Get { object, name } => property::eval_get(object, name, interp),
            ExprKind::Set {
                object,
                name,
                value,
            } => property::eval_set(object, name, value, interp),
            ExprKind::This(keyword) => interp.look_up_variable(keyword, self.id),
            ExprKind::Super { keyword, method } => {
                property::eval_super(self.id, keyword, method, interp)
            }
        }
    }
}

/// Evaluate a single expression.
///
/// # Errors
///
/// Returns the first runtime error raised while evaluating.
pub fn eval_expr(expr: &Expr, interp: &mut Interpreter) -> Result<Value, EvalError> {
    expr.eval(interp)
}
