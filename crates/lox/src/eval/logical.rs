//! Short-circuit `and` / `or`

use super::Evaluate;
use crate::ast::Expr;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Evaluate `left and right` / `left or right`.
///
/// The result is whichever operand decided the outcome, not a boolean.
pub fn eval_logical(
    left: &Expr,
    operator: &Token,
    right: &Expr,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let left = left.eval(interp)?;

    let decided = match operator.typ {
        TokenType::Or => left.is_truthy(),
        _ => !left.is_truthy(),
    };

    if decided {
        Ok(left)
    } else {
        right.eval(interp)
    }
}
