//! Value representation for runtime values

mod callable;
mod class;
mod display;

pub use callable::{LoxFunction, NativeFnPtr, NativeFunction};
pub use class::{get_property, LoxClass, LoxInstance};
pub use display::format_number;

use std::cell::RefCell;
use std::rc::Rc;

/// Runtime value representation for the Lox interpreter.
///
/// Primitives are stored inline; strings are shared immutable slices and
/// everything with identity (functions, classes, instances) lives behind
/// an `Rc`.
#[derive(Debug, Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Primitives
    // ═══════════════════════════════════════════════════════════════════
    /// `nil`
    Nil,

    /// `true` or `false`
    Bool(bool),

    /// Every Lox number is a double
    Number(f64),

    /// Immutable string
    String(Rc<str>),

    // ═══════════════════════════════════════════════════════════════════
    // Objects
    // ═══════════════════════════════════════════════════════════════════
    /// User-defined function or bound method
    Function(Rc<LoxFunction>),

    /// Built-in native function
    Native(NativeFunction),

    /// A class (callable to construct instances)
    Class(Rc<LoxClass>),

    /// An instance with mutable fields
    Instance(Rc<RefCell<LoxInstance>>),
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

    /// Extract a number, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Primitives compare by value, objects by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(&a.func, &b.func),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn test_equality_of_primitives() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::from(1.0), Value::from(1.0));
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_ne!(Value::from(1.0), Value::from("1"));
        assert_ne!(Value::Nil, Value::Bool(false));
    }

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn test_classes_compare_by_identity() {
        let a = Rc::new(LoxClass::new("A", None, Default::default()));
        let same = Value::Class(Rc::clone(&a));
        let other = Value::Class(Rc::new(LoxClass::new("A", None, Default::default())));

        assert_eq!(Value::Class(a), same);
        assert_ne!(same, other);
    }
}
