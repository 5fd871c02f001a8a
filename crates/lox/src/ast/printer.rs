//! Parenthesized prefix rendering of the syntax tree

use super::{Expr, ExprKind, FunctionDecl, LiteralValue, Stmt};
use crate::value::format_number;

/// Render an expression, e.g. `(* (- 123) (group 45.67))`.
pub fn print_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Assign { name, value } => {
            parenthesize(&format!("= {}", name.lexeme), &[value.as_ref()])
        }
        ExprKind::Binary {
            left,
            operator,
            right,
        }
        | ExprKind::Logical {
            left,
            operator,
            right,
        } => parenthesize(&operator.lexeme, &[left.as_ref(), right.as_ref()]),
        ExprKind::Call {
            callee, arguments, ..
        } => {
            let mut parts = vec![print_expr(callee)];
            parts.extend(arguments.iter().map(print_expr));
            format!("(call {})", parts.join(" "))
        }
        ExprKind::Get { object, name } => format!("(. {} {})", print_expr(object), name.lexeme),
        ExprKind::Grouping(inner) => parenthesize("group", &[inner.as_ref()]),
        ExprKind::Literal(literal) => print_literal(literal),
        ExprKind::Set {
            object,
            name,
            value,
        } => format!(
            "(set {} {} {})",
            print_expr(object),
            name.lexeme,
            print_expr(value)
        ),
        ExprKind::Super { method, .. } => format!("(super {})", method.lexeme),
        ExprKind::This(_) => "this".to_string(),
        ExprKind::Unary { operator, right } => parenthesize(&operator.lexeme, &[right.as_ref()]),
        ExprKind::Variable(name) => name.lexeme.clone(),
    }
}

/// Render a statement.
pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Block(stmts) => block("block", stmts),
        Stmt::Class {
            name,
            superclass,
            methods,
        } => {
            let mut out = format!("(class {}", name.lexeme);
            if let Some(superclass) = superclass {
                out.push_str(&format!(" < {}", print_expr(superclass)));
            }
            for method in methods {
                out.push(' ');
                out.push_str(&print_function("method", method));
            }
            out.push(')');
            out
        }
        Stmt::Expression(expr) => format!("(; {})", print_expr(expr)),
        Stmt::Function(decl) => print_function("fun", decl),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => match else_branch {
            Some(else_branch) => format!(
                "(if {} {} {})",
                print_expr(condition),
                print_stmt(then_branch),
                print_stmt(else_branch)
            ),
            None => format!("(if {} {})", print_expr(condition), print_stmt(then_branch)),
        },
        Stmt::Print(expr) => format!("(print {})", print_expr(expr)),
        Stmt::Return { value, .. } => match value {
            Some(value) => format!("(return {})", print_expr(value)),
            None => "(return)".to_string(),
        },
        Stmt::Var { name, initializer } => match initializer {
            Some(init) => format!("(var {} {})", name.lexeme, print_expr(init)),
            None => format!("(var {})", name.lexeme),
        },
        Stmt::While { condition, body } => {
            format!("(while {} {})", print_expr(condition), print_stmt(body))
        }
    }
}

/// Render a whole program, one top-level statement per line.
pub fn print_program(stmts: &[Stmt]) -> String {
    stmts.iter().map(print_stmt).collect::<Vec<_>>().join("\n")
}

fn print_literal(literal: &LiteralValue) -> String {
    match literal {
        LiteralValue::Nil => "nil".to_string(),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Number(n) => format_number(*n),
        LiteralValue::String(s) => format!("{:?}", s.as_ref()),
    }
}

fn print_function(keyword: &str, decl: &FunctionDecl) -> String {
    let params = decl
        .params
        .iter()
        .map(|p| p.lexeme.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let mut out = format!("({} {} ({})", keyword, decl.name.lexeme, params);
    for stmt in &decl.body {
        out.push(' ');
        out.push_str(&print_stmt(stmt));
    }
    out.push(')');
    out
}

fn block(name: &str, stmts: &[Stmt]) -> String {
    let mut out = format!("({}", name);
    for stmt in stmts {
        out.push(' ');
        out.push_str(&print_stmt(stmt));
    }
    out.push(')');
    out
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut out = format!("({}", name);
    for expr in exprs {
        out.push(' ');
        out.push_str(&print_expr(expr));
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenType};

    #[test]
    fn test_print_nested_expression() {
        let expr = Expr::new(ExprKind::Binary {
            left: Box::new(Expr::new(ExprKind::Unary {
                operator: Token::new(TokenType::Minus, "-", None, 1),
                right: Box::new(Expr::new(ExprKind::Literal(LiteralValue::Number(123.0)))),
            })),
            operator: Token::new(TokenType::Star, "*", None, 1),
            right: Box::new(Expr::new(ExprKind::Grouping(Box::new(Expr::new(
                ExprKind::Literal(LiteralValue::Number(45.67)),
            ))))),
        });

        assert_eq!(print_expr(&expr), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn test_print_var_statement() {
        let stmt = Stmt::Var {
            name: Token::identifier("greeting", 1),
            initializer: Some(Expr::new(ExprKind::Literal(LiteralValue::String(
                "hi".into(),
            )))),
        };
        assert_eq!(print_stmt(&stmt), "(var greeting \"hi\")");
    }

    #[test]
    fn test_print_property_access_lists_object_first() {
        let object = || Box::new(Expr::new(ExprKind::Variable(Token::identifier("a", 1))));
        let get = Expr::new(ExprKind::Get {
            object: object(),
            name: Token::identifier("b", 1),
        });
        let set = Expr::new(ExprKind::Set {
            object: object(),
            name: Token::identifier("b", 1),
            value: Box::new(Expr::new(ExprKind::Literal(LiteralValue::Number(1.0)))),
        });

        assert_eq!(print_expr(&get), "(. a b)");
        assert_eq!(print_expr(&set), "(set a b 1)");
    }
}
