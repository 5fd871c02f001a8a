//! Function call evaluation

use std::cell::RefCell;
use std::rc::Rc;

use super::Evaluate;
use crate::ast::Expr;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::{LoxClass, LoxFunction, LoxInstance, NativeFunction, Value};

/// Evaluate `callee(arguments)`.
///
/// The callee is evaluated first, then the arguments left to right.
pub fn eval_call(
    callee: &Expr,
    paren: &Token,
    arguments: &[Expr],
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let callee = callee.eval(interp)?;

    let args: Vec<Value> = arguments
        .iter()
        .map(|arg| arg.eval(interp))
        .collect::<Result<Vec<_>, _>>()?;

    call_value(&callee, args, paren.line, interp)
}

/// Call a Value as a function.
///
/// # Errors
///
/// Returns `NotCallable` if the value is not a function or class.
/// Returns `ArityMismatch` if the argument count doesn't match.
/// Returns `StackOverflow` if the call would exceed the call depth limit.
pub fn call_value(
    callee: &Value,
    args: Vec<Value>,
    line: usize,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    match callee {
        Value::Function(function) => {
            check_arity(function.arity(), args.len(), line)?;
            call_function(function, args, line, interp)
        }
        Value::Native(native) => {
            check_arity(native.arity, args.len(), line)?;
            call_native(native, &args, line)
        }
        Value::Class(class) => {
            check_arity(class.arity(), args.len(), line)?;
            instantiate(class, args, line, interp)
        }
        _ => Err(EvalError::NotCallable { line }),
    }
}

fn check_arity(expected: usize, got: usize, line: usize) -> Result<(), EvalError> {
    if expected == got {
        Ok(())
    } else {
        Err(EvalError::ArityMismatch {
            expected,
            got,
            line,
        })
    }
}

/// Run a user function's body in a fresh scope over its closure.
fn call_function(
    function: &LoxFunction,
    args: Vec<Value>,
    line: usize,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    interp.enter_call(function.name(), line)?;

    let environment = Environment::enclosed(Rc::clone(&function.closure));
    {
        let mut scope = environment.borrow_mut();
        for (param, arg) in function.declaration.params.iter().zip(args) {
            scope.define(param.lexeme.clone(), arg);
        }
    }

    let result = interp.execute_block(&function.declaration.body, environment);
    interp.exit_call();

    let returned = match result {
        Ok(()) => Value::Nil,
        Err(EvalError::ControlFlow(flow)) => flow.into_value(),
        Err(err) => return Err(err),
    };

    // An initializer always yields its instance, even on a bare `return;`
    // or when invoked directly as `instance.init()`.
    if function.is_initializer {
        let this = Token::identifier("this", line);
        return Environment::get_at(&function.closure, 0, &this);
    }

    Ok(returned)
}

fn call_native(native: &NativeFunction, args: &[Value], line: usize) -> Result<Value, EvalError> {
    (native.func)(args).map_err(|message| EvalError::Native { message, line })
}

/// Calling a class constructs an instance and runs `init` on it.
fn instantiate(
    class: &Rc<LoxClass>,
    args: Vec<Value>,
    line: usize,
    interp: &mut Interpreter,
) -> Result<Value, EvalError> {
    let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));

    if let Some(initializer) = class.find_method("init") {
        let bound = initializer.bind(Rc::clone(&instance));
        call_function(&bound, args, line, interp)?;
    }

    Ok(Value::Instance(instance))
}
