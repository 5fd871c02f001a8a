//! Binary operation evaluation

use super::Evaluate;
use crate::ast::Expr;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Evaluate an arithmetic, comparison or equality operator.
///
/// Both operands are evaluated, left first, before any type check.
///
/// # Errors
///
/// Returns `OperandsNotNumbers` or `InvalidAddOperands` on type mismatch.
pub fn eval_binary(
    left: &Expr,
    operator: &Token,
    right: &Expr,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let left = left.eval(interp)?;
    let right = right.eval(interp)?;
    apply(operator, left, right)
}

/// Apply a binary operator to already-evaluated operands.
///
/// # Errors
///
/// Returns `OperandsNotNumbers` or `InvalidAddOperands` on type mismatch.
pub fn apply(operator: &Token, left: Value, right: Value) -> Result<Value, EvalError> {
    let line = operator.line;

    match operator.typ {
        // Equality works on any pair of values
        TokenType::EqualEqual => Ok(Value::Bool(left == right)),
        TokenType::BangEqual => Ok(Value::Bool(left != right)),

        TokenType::Plus => eval_add(left, right, line),

        TokenType::Minus => numeric(left, right, line, |a, b| Value::Number(a - b)),
        TokenType::Star => numeric(left, right, line, |a, b| Value::Number(a * b)),
        TokenType::Slash => numeric(left, right, line, |a, b| Value::Number(a / b)),

        TokenType::Greater => numeric(left, right, line, |a, b| Value::Bool(a > b)),
        TokenType::GreaterEqual => numeric(left, right, line, |a, b| Value::Bool(a >= b)),
        TokenType::Less => numeric(left, right, line, |a, b| Value::Bool(a < b)),
        TokenType::LessEqual => numeric(left, right, line, |a, b| Value::Bool(a <= b)),

        // The parser only builds binary nodes for the operators above
        _ => Ok(Value::Nil),
    }
}

fn eval_add(left: Value, right: Value, line: usize) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(a), Value::String(b)) => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(&a);
            joined.push_str(&b);
            Ok(Value::string(joined))
        }
        _ => Err(EvalError::InvalidAddOperands { line }),
    }
}

fn numeric(
    left: Value,
    right: Value,
    line: usize,
    op: impl FnOnce(f64, f64) -> Value,
) -> Result<Value, EvalError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(op(a, b)),
        _ => Err(EvalError::OperandsNotNumbers { line }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(typ: TokenType, lexeme: &str) -> Token {
        Token::new(typ, lexeme, None, 7)
    }

    #[test]
    fn test_arithmetic() {
        let star = op(TokenType::Star, "*");
        let result = apply(&star, Value::from(6.0), Value::from(7.0)).unwrap();
        assert_eq!(result, Value::from(42.0));
    }

    #[test]
    fn test_string_concatenation() {
        let plus = op(TokenType::Plus, "+");
        let result = apply(&plus, Value::from("foo"), Value::from("bar")).unwrap();
        assert_eq!(result, Value::from("foobar"));
    }

    #[test]
    fn test_mixed_add_is_an_error() {
        let plus = op(TokenType::Plus, "+");
        let err = apply(&plus, Value::from("a"), Value::from(1.0)).unwrap_err();
        assert!(matches!(err, EvalError::InvalidAddOperands { line: 7 }));
    }

    #[test]
    fn test_comparison_requires_numbers() {
        let less = op(TokenType::Less, "<");
        let err = apply(&less, Value::from("a"), Value::from("b")).unwrap_err();
        assert_eq!(err.to_string(), "Operands must be numbers.");
    }

    #[test]
    fn test_equality_across_kinds() {
        let eq = op(TokenType::EqualEqual, "==");
        assert_eq!(
            apply(&eq, Value::Nil, Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            apply(&eq, Value::Nil, Value::Nil).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let slash = op(TokenType::Slash, "/");
        let result = apply(&slash, Value::from(1.0), Value::from(0.0)).unwrap();
        assert_eq!(result, Value::Number(f64::INFINITY));
    }
}
