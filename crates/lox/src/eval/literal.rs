//! Literal evaluation

use std::rc::Rc;

use crate::ast::LiteralValue;
use crate::value::Value;

/// Convert a source literal to a runtime value.
///
/// String literals share their storage with the syntax tree.
pub fn eval_literal(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Nil => Value::Nil,
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::String(s) => Value::String(Rc::clone(s)),
    }
}
