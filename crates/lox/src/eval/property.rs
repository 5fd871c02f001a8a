//! Property access: `object.name`, `object.name = value`, `super.name`

use std::rc::Rc;

use super::Evaluate;
use crate::ast::{Expr, ExprId};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::{get_property, Value};

/// Evaluate `object.name`.
///
/// # Errors
///
/// Returns `NotAnInstance` when the receiver is not an instance and
/// `UndefinedProperty` when no field or method matches.
pub fn eval_get(object: &Expr, name: &Token, interp: &mut Interpreter) -> Result<Value, EvalError> {
    match object.eval(interp)? {
        Value::Instance(instance) => get_property(&instance, name),
        _ => Err(EvalError::NotAnInstance { line: name.line }),
    }
}

/// Evaluate `object.name = value`.
///
/// The receiver is evaluated before the value.
///
/// # Errors
///
/// Returns `FieldOnNonInstance` when the receiver is not an instance.
pub fn eval_set(
    object: &Expr,
    name: &Token,
    value: &Expr,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let Value::Instance(instance) = object.eval(interp)? else {
        return Err(EvalError::FieldOnNonInstance { line: name.line });
    };

    let value = value.eval(interp)?;
    instance.borrow_mut().set(name, value.clone());
    Ok(value)
}

/// Evaluate `super.method`: look the method up starting at the
/// superclass and bind it to the current `this`.
///
/// # Errors
///
/// Returns `UndefinedProperty` when no ancestor defines the method.
pub fn eval_super(
    id: ExprId,
    keyword: &Token,
    method: &Token,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let Some(distance) = interp.locals.get(&id).copied() else {
        return Err(EvalError::UndefinedVariable {
            name: keyword.lexeme.clone(),
            line: keyword.line,
        });
    };

    // `this` always lives in the scope just inside the one holding `super`.
    let superclass = Environment::get_at(&interp.environment, distance, keyword)?;
    let this_token = Token::identifier("this", keyword.line);
    let this_distance = distance.saturating_sub(1);
    let this = Environment::get_at(&interp.environment, this_distance, &this_token)?;

    let (Value::Class(superclass), Value::Instance(instance)) = (superclass, this) else {
        return Err(EvalError::SuperclassNotClass { line: keyword.line });
    };

    match superclass.find_method(&method.lexeme) {
        Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
        None => Err(EvalError::UndefinedProperty {
            name: method.lexeme.clone(),
            line: method.line,
        }),
    }
}
