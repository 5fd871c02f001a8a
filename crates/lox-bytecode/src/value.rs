//! Values on the VM stack

use std::fmt;
use std::rc::Rc;

use lox::format_number;

/// A runtime value of the bytecode engine.
///
/// The engine has no objects beyond strings, so this is a smaller set
/// than the tree-walker's.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `nil`
    Nil,

    /// `true` or `false`
    Bool(bool),

    /// Every Lox number is a double
    Number(f64),

    /// Immutable string
    String(Rc<str>),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// `nil` and `false` are falsey; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_tree_walker() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.0).to_string(), "-0");
        assert_eq!(Value::string("s").to_string(), "s");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::string("a"), Value::string("a"));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }
}
