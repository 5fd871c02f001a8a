//! Control flow mechanism for `return`

use crate::value::Value;

/// Control flow signal for non-local jumps.
///
/// When `return` is executed it doesn't complete normally. Instead it
/// produces an `Err(EvalError::ControlFlow(...))` that propagates up
/// through blocks, loops and conditionals until the enclosing call
/// catches it.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    /// Return from a function with a value.
    Return {
        /// Value to return from the function
        value: Value,
    },
}

impl ControlFlow {
    /// Create a return.
    pub fn return_value(value: Value) -> Self {
        ControlFlow::Return { value }
    }

    /// The value carried by the signal.
    pub fn into_value(self) -> Value {
        match self {
            ControlFlow::Return { value } => value,
        }
    }
}
