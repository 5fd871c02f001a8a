//! Statement execution

use std::io::Write;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{ControlFlow, Evaluate};
use crate::ast::printer::print_stmt;
use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::{LoxClass, LoxFunction, Value};

/// Trait for executing statements for their effects.
pub trait Execute {
    /// Execute this statement against the interpreter's current state.
    fn execute(&self, interp: &mut Interpreter) -> Result<(), EvalError>;
}

/// Guard run before every statement: honours a pending interrupt and
/// emits the trace line.
///
/// # Errors
///
/// Returns `Interrupted` when the context's interrupt flag is set.
pub(crate) fn enter_statement(stmt: &Stmt, interp: &Interpreter) -> Result<(), EvalError> {
    if interp.ctx.is_interrupted() {
        return Err(EvalError::Interrupted {
            line: stmt.line().unwrap_or(0),
        });
    }

    if interp.ctx.trace {
        tracing::trace!(
            line = stmt.line().unwrap_or(0),
            depth = interp.call_depth,
            "execute {}",
            print_stmt(stmt)
        );
    }

    Ok(())
}

impl Execute for Stmt {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), EvalError> {
        enter_statement(self, interp)?;

        match self {
            Stmt::Expression(expr) => expr.eval(interp).map(drop),
            Stmt::Print(expr) => exec_print(expr, interp),
            Stmt::Var { name, initializer } => exec_var(name, initializer.as_ref(), interp),
            Stmt::Block(statements) => {
                let scope = Environment::enclosed(Rc::clone(&interp.environment));
                interp.execute_block(statements, scope)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if condition.eval(interp)?.is_truthy() {
                    then_branch.execute(interp)
                } else if let Some(else_branch) = else_branch {
                    else_branch.execute(interp)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while condition.eval(interp)?.is_truthy() {
                    body.execute(interp)?;
                }
                Ok(())
            }
            Stmt::Function(decl) => {
                let function =
                    LoxFunction::new(Rc::clone(decl), Rc::clone(&interp.environment), false);
                define(interp, &decl.name, Value::Function(Rc::new(function)));
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => expr.eval(interp)?,
                    None => Value::Nil,
                };
                Err(EvalError::ControlFlow(ControlFlow::return_value(value)))
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => exec_class(name, superclass.as_ref(), methods, interp),
        }
    }
}

fn define(interp: &Interpreter, name: &Token, value: Value) {
    interp
        .environment
        .borrow_mut()
        .define(name.lexeme.clone(), value);
}

fn exec_print(expr: &Expr, interp: &mut Interpreter) -> Result<(), EvalError> {
    let value = expr.eval(interp)?;
    writeln!(interp.out, "{}", value).map_err(|e| EvalError::Output {
        message: e.to_string(),
        line: expr.line().unwrap_or(0),
    })
}

fn exec_var(
    name: &Token,
    initializer: Option<&Expr>,
    interp: &mut Interpreter,
) -> Result<(), EvalError> {
    let value = match initializer {
        Some(expr) => expr.eval(interp)?,
        None => Value::Nil,
    };
    define(interp, name, value);
    Ok(())
}

/// Declare a class.
///
/// The name is bound before the methods are created so they can refer to
/// the class; a subclass's methods close over an extra scope holding
/// `super`.
fn exec_class(
    name: &Token,
    superclass: Option<&Expr>,
    methods: &[Rc<FunctionDecl>],
    interp: &mut Interpreter,
) -> Result<(), EvalError> {
    let superclass = match superclass {
        Some(expr) => match expr.eval(interp)? {
            Value::Class(class) => Some(class),
            _ => {
                return Err(EvalError::SuperclassNotClass {
                    line: expr.line().unwrap_or(name.line),
                });
            }
        },
        None => None,
    };

    define(interp, name, Value::Nil);

    let method_scope = match &superclass {
        Some(superclass) => {
            let scope = Environment::enclosed(Rc::clone(&interp.environment));
            scope
                .borrow_mut()
                .define("super", Value::Class(Rc::clone(superclass)));
            scope
        }
        None => Rc::clone(&interp.environment),
    };

    let methods: IndexMap<String, Rc<LoxFunction>> = methods
        .iter()
        .map(|decl| {
            let is_initializer = decl.name.lexeme == "init";
            let method =
                LoxFunction::new(Rc::clone(decl), Rc::clone(&method_scope), is_initializer);
            (decl.name.lexeme.clone(), Rc::new(method))
        })
        .collect();

    let class = LoxClass::new(name.lexeme.clone(), superclass, methods);
    tracing::debug!(class = %class.name, methods = class.methods.len(), "declared class");

    interp
        .environment
        .borrow_mut()
        .assign(name, Value::Class(Rc::new(class)))
}
