//! Runtime environment: a chain of lexical scopes
//!
//! Every block, call and bound method gets its own [`Environment`] that
//! points at the scope it was created in. Closures keep their defining
//! scope alive through the shared [`EnvRef`].

mod prelude;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::EvalError;
use crate::token::Token;
use crate::value::Value;

/// Shared, mutable handle to a scope.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A single scope: its bindings and the scope that encloses it.
///
/// # Example
///
/// ```
/// use lox::{Environment, Token, Value};
///
/// let globals = Environment::new().into_ref();
/// globals.borrow_mut().define("x", Value::from(1.0));
///
/// // A nested scope shadows without touching the outer binding
/// let inner = Environment::enclosed(globals.clone());
/// inner.borrow_mut().define("x", Value::from(10.0));
///
/// let x = Token::identifier("x", 1);
/// assert_eq!(inner.borrow().get(&x).unwrap(), Value::from(10.0));
/// assert_eq!(globals.borrow().get(&x).unwrap(), Value::from(1.0));
/// ```
#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// Create a scope with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope nested inside `enclosing`.
    pub fn enclosed(enclosing: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }))
    }

    /// Wrap this scope in a shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// The enclosing scope, if any.
    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Bind `name` in this scope, replacing any existing binding.
    ///
    /// Redefinition is allowed; at global scope it is how the REPL lets
    /// users redeclare a variable.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Whether `name` is bound directly in this scope.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Look `name` up in this scope or any enclosing one.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if no scope in the chain binds it.
    pub fn get(&self, name: &Token) -> Result<Value, EvalError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get(name),
            None => Err(undefined(name)),
        }
    }

    /// Assign to the nearest existing binding of `name`.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if no scope in the chain binds it.
    /// Assignment never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), EvalError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(undefined(name)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Resolved Access
    // ═══════════════════════════════════════════════════════════════════

    /// Walk `distance` scopes outward from `env`.
    ///
    /// Stops at the outermost scope if the chain is shorter.
    pub fn ancestor(env: &EnvRef, distance: usize) -> EnvRef {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let next = current.borrow().enclosing();
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Read `name` from exactly the scope `distance` hops out.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if that scope does not bind it.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value, EvalError> {
        let scope = Self::ancestor(env, distance);
        let value = scope.borrow().values.get(&name.lexeme).cloned();
        value.ok_or_else(|| undefined(name))
    }

    /// Assign `name` in exactly the scope `distance` hops out.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if that scope does not bind it.
    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), EvalError> {
        let scope = Self::ancestor(env, distance);
        let mut scope = scope.borrow_mut();
        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> EvalError {
    EvalError::UndefinedVariable {
        name: name.lexeme.clone(),
        line: name.line,
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values can hold closures over this scope; list names only.
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("enclosed", &self.enclosing.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Token {
        Token::identifier(name, 1)
    }

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("x", Value::from(1.0));
        assert_eq!(env.get(&ident("x")).unwrap(), Value::from(1.0));
    }

    #[test]
    fn test_get_undefined() {
        let env = Environment::new();
        let err = env.get(&ident("nope")).unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable 'nope'.");
    }

    #[test]
    fn test_redefine_replaces() {
        let mut env = Environment::new();
        env.define("x", Value::from(1.0));
        env.define("x", Value::from("two"));
        assert_eq!(env.get(&ident("x")).unwrap(), Value::from("two"));
    }

    #[test]
    fn test_assign_reaches_enclosing_scope() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("x", Value::from(1.0));
        let inner = Environment::enclosed(Rc::clone(&outer));

        inner
            .borrow_mut()
            .assign(&ident("x"), Value::from(2.0))
            .unwrap();

        assert!(!inner.borrow().contains("x"));
        assert_eq!(outer.borrow().get(&ident("x")).unwrap(), Value::from(2.0));
    }

    #[test]
    fn test_assign_never_creates() {
        let mut env = Environment::new();
        assert!(env.assign(&ident("x"), Value::Nil).is_err());
        assert!(!env.contains("x"));
    }

    #[test]
    fn test_get_at_skips_shadowing() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("a", Value::from("outer"));
        let inner = Environment::enclosed(Rc::clone(&outer));
        inner.borrow_mut().define("a", Value::from("inner"));

        let a = ident("a");
        assert_eq!(
            Environment::get_at(&inner, 0, &a).unwrap(),
            Value::from("inner")
        );
        assert_eq!(
            Environment::get_at(&inner, 1, &a).unwrap(),
            Value::from("outer")
        );
    }

    #[test]
    fn test_assign_at() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("a", Value::Nil);
        let inner = Environment::enclosed(Rc::clone(&outer));

        let a = ident("a");
        let assigned = Environment::assign_at(&inner, 1, &a, Value::Bool(true));
        assert!(assigned.is_ok());
        assert_eq!(outer.borrow().get(&a).unwrap(), Value::Bool(true));
        assert!(Environment::assign_at(&inner, 0, &a, Value::Nil).is_err());
    }

    #[test]
    fn test_ancestor_stops_at_root() {
        let root = Environment::new().into_ref();
        let child = Environment::enclosed(Rc::clone(&root));
        assert!(Rc::ptr_eq(&Environment::ancestor(&child, 5), &root));
    }
}
