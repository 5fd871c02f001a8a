//! Classes and their instances

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{LoxFunction, Value};
use crate::error::EvalError;
use crate::token::Token;

/// A class: a name, an optional superclass and a method table.
pub struct LoxClass {
    /// Class name
    pub name: String,

    /// Superclass, searched when a method is not found here
    pub superclass: Option<Rc<LoxClass>>,

    /// Methods in declaration order
    pub methods: IndexMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    /// Create a class.
    pub fn new(
        name: impl Into<String>,
        superclass: Option<Rc<LoxClass>>,
        methods: IndexMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name: name.into(),
            superclass,
            methods,
        }
    }

    /// Find a method on this class or the nearest ancestor defining it.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }

    /// Arguments a call to the class expects: the initializer's arity, or 0.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field(
                "superclass",
                &self.superclass.as_ref().map(|s| s.name.as_str()),
            )
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An instance of a class with its own fields.
pub struct LoxInstance {
    /// The instance's class
    pub class: Rc<LoxClass>,

    /// Fields in assignment order
    pub fields: IndexMap<String, Value>,
}

impl LoxInstance {
    /// Create an instance with no fields.
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: IndexMap::new(),
        }
    }

    /// Set (or create) a field.
    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

/// Read a property: fields shadow methods, methods are bound to the instance.
///
/// # Errors
///
/// Returns `UndefinedProperty` if neither a field nor a method matches.
pub fn get_property(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value, EvalError> {
    let method = {
        let borrowed = instance.borrow();
        if let Some(value) = borrowed.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }
        borrowed.class.find_method(&name.lexeme)
    };

    match method {
        Some(method) => Ok(Value::Function(Rc::new(method.bind(Rc::clone(instance))))),
        None => Err(EvalError::UndefinedProperty {
            name: name.lexeme.clone(),
            line: name.line,
        }),
    }
}

impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
