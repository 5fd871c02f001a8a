//! Callable value types: user functions and native builtins

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{LoxInstance, Value};
use crate::ast::FunctionDecl;
use crate::environment::{EnvRef, Environment};

/// Type alias for native function pointers.
pub type NativeFnPtr = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// A user-defined function or method, closed over its defining scope.
#[derive(Clone)]
pub struct LoxFunction {
    /// The declaration, shared with the syntax tree
    pub declaration: Rc<FunctionDecl>,

    /// Scope the function was declared in
    pub closure: EnvRef,

    /// Whether this is a class's `init` method
    pub is_initializer: bool,
}

impl LoxFunction {
    /// Create a function closing over `closure`.
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a copy whose closure binds `this` to `instance`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let environment = Environment::enclosed(Rc::clone(&self.closure));
        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));

        LoxFunction::new(
            Rc::clone(&self.declaration),
            environment,
            self.is_initializer,
        )
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The closure may contain this function; never walk it.
        write!(f, "LoxFunction({}/{})", self.name(), self.arity())
    }
}

/// A built-in native function.
///
/// These are Rust functions exposed to Lox code.
#[derive(Clone)]
pub struct NativeFunction {
    /// Function name (for display/debugging)
    pub name: String,

    /// Number of arguments expected
    pub arity: usize,

    /// The actual function pointer
    pub func: NativeFnPtr,
}

impl NativeFunction {
    /// Wrap a Rust closure as a native function.
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&[Value]) -> Result<Value, String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}
