//! Unary operation evaluation

use super::Evaluate;
use crate::ast::Expr;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Evaluate `-right` or `!right`.
///
/// # Errors
///
/// Returns `OperandNotNumber` when negating anything but a number.
pub fn eval_unary(
    operator: &Token,
    right: &Expr,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let operand = right.eval(interp)?;

    match operator.typ {
        TokenType::Minus => match operand {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(EvalError::OperandNotNumber {
                line: operator.line,
            }),
        },
        TokenType::Bang => Ok(Value::Bool(!operand.is_truthy())),
        // The parser only builds unary nodes for `-` and `!`
        _ => Ok(Value::Nil),
    }
}
