//! Variable assignment

use super::Evaluate;
use crate::ast::{Expr, ExprId};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Evaluate `name = value`, writing to the scope the resolver chose.
///
/// Assignment is an expression: its result is the assigned value.
///
/// # Errors
///
/// Returns `UndefinedVariable` when assigning to an undeclared global.
pub fn eval_assign(
    id: ExprId,
    name: &Token,
    value: &Expr,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let value = value.eval(interp)?;

    match interp.locals.get(&id).copied() {
        Some(distance) => {
            Environment::assign_at(&interp.environment, distance, name, value.clone())?
        }
        None => interp.globals.borrow_mut().assign(name, value.clone())?,
    }

    Ok(value)
}
