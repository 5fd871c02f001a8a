//! Recursive-descent parser producing statements from tokens

use std::rc::Rc;

use crate::ast::{Expr, ExprKind, FunctionDecl, LiteralValue, Stmt};
use crate::error::SyntaxError;
use crate::token::{Literal, Token, TokenType};

/// Maximum number of call arguments and function parameters.
pub const MAX_ARITY: usize = 255;

/// Marker for a parse failure that has already been recorded.
///
/// The parser unwinds with this to the nearest declaration, then
/// synchronizes and keeps going.
#[derive(Debug)]
struct ParseFailed;

type ParseResult<T> = Result<T, ParseFailed>;

/// Parses a token stream into a program.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<SyntaxError>,
}

impl Parser {
    /// Create a parser over scanned tokens.
    ///
    /// The token list must end with an `Eof` token, as produced by the
    /// scanner; one is appended if it is missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.typ) != Some(TokenType::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenType::Eof, "", None, line));
        }

        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parse the whole program.
    ///
    /// # Errors
    ///
    /// Returns every syntax error found. The parser recovers after each
    /// one, so later errors are reported too.
    pub fn parse(mut self) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        if self.errors.is_empty() {
            Ok(statements)
        } else {
            Err(self.errors)
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Token Cursor
    // ═══════════════════════════════════════════════════════════════════

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().typ == TokenType::Eof
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn check(&self, typ: TokenType) -> bool {
        !self.is_at_end() && self.peek().typ == typ
    }

    fn matches(&mut self, types: &[TokenType]) -> bool {
        if types.iter().any(|typ| self.check(*typ)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, typ: TokenType, message: &str) -> ParseResult<Token> {
        if self.check(typ) {
            return Ok(self.advance());
        }

        Err(self.error_at_current(message))
    }

    fn error_at_current(&mut self, message: &str) -> ParseFailed {
        let token = self.peek().clone();
        self.error(&token, message)
    }

    /// Record an error without unwinding.
    fn error(&mut self, token: &Token, message: &str) -> ParseFailed {
        self.errors.push(SyntaxError::at_token(token, message));
        ParseFailed
    }

    /// Skip tokens until a likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().typ == TokenType::Semicolon {
                return;
            }

            match self.peek().typ {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {}
            }

            self.advance();
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Declarations
    // ═══════════════════════════════════════════════════════════════════

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[TokenType::Class]) {
            self.class_declaration()
        } else if self.matches(&[TokenType::Fun]) {
            self.function("function").map(Stmt::Function)
        } else if self.matches(&[TokenType::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseFailed) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::Identifier, "Expect class name.")?;

        let superclass = if self.matches(&[TokenType::Less]) {
            let name = self.consume(TokenType::Identifier, "Expect superclass name.")?;
            Some(Expr::new(ExprKind::Variable(name)))
        } else {
            None
        };

        self.consume(TokenType::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    fn function(&mut self, kind: &str) -> ParseResult<Rc<FunctionDecl>> {
        let name = self.consume(TokenType::Identifier, &format!("Expect {} name.", kind))?;
        let message = format!("Expect '(' after {} name.", kind);
        self.consume(TokenType::LeftParen, &message)?;

        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 parameters.");
                }

                let param = self.consume(TokenType::Identifier, "Expect parameter name.")?;
                params.push(param);

                if !self.matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenType::RightParen, "Expect ')' after parameters.")?;

        let message = format!("Expect '{{' before {} body.", kind);
        self.consume(TokenType::LeftBrace, &message)?;
        let body = self.block()?;

        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::Identifier, "Expect variable name.")?;

        let initializer = if self.matches(&[TokenType::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenType::For]) {
            self.for_statement()
        } else if self.matches(&[TokenType::If]) {
            self.if_statement()
        } else if self.matches(&[TokenType::Print]) {
            self.print_statement()
        } else if self.matches(&[TokenType::Return]) {
            self.return_statement()
        } else if self.matches(&[TokenType::While]) {
            self.while_statement()
        } else if self.matches(&[TokenType::LeftBrace]) {
            Ok(Stmt::Block(self.block()?))
        } else {
            self.expression_statement()
        }
    }

    /// Desugars `for` into an equivalent `while` loop.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenType::Semicolon]) {
            None
        } else if self.matches(&[TokenType::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenType::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition =
            condition.unwrap_or_else(|| Expr::new(ExprKind::Literal(LiteralValue::Bool(true))));
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenType::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };

        self.consume(TokenType::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expressions (lowest to highest precedence)
    // ═══════════════════════════════════════════════════════════════════

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[TokenType::Equal]) {
            let equals = self.previous().clone();
            let value = Box::new(self.assignment()?);

            return match expr.kind {
                ExprKind::Variable(name) => Ok(Expr::new(ExprKind::Assign { name, value })),
                ExprKind::Get { object, name } => Ok(Expr::new(ExprKind::Set {
                    object,
                    name,
                    value,
                })),
                // Reported, but the left side is still a valid expression.
                kind => {
                    self.error(&equals, "Invalid assignment target.");
                    Ok(Expr { id: expr.id, kind })
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.matches(&[TokenType::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.matches(&[TokenType::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parse a left-associative chain of binary operators.
    fn binary(
        &mut self,
        operators: &[TokenType],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;

        while self.matches(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::new(ExprKind::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary(
            &[TokenType::BangEqual, TokenType::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary(
            &[
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Less,
                TokenType::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenType::Minus, TokenType::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenType::Slash, TokenType::Star], Self::unary)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenType::Bang, TokenType::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::new(ExprKind::Unary {
                operator,
                right: Box::new(right),
            }));
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[TokenType::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenType::Dot]) {
                let message = "Expect property name after '.'.";
                let name = self.consume(TokenType::Identifier, message)?;
                expr = Expr::new(ExprKind::Get {
                    object: Box::new(expr),
                    name,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenType::RightParen) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);

                if !self.matches(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenType::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::new(ExprKind::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenType::False]) {
            return Ok(literal(LiteralValue::Bool(false)));
        }
        if self.matches(&[TokenType::True]) {
            return Ok(literal(LiteralValue::Bool(true)));
        }
        if self.matches(&[TokenType::Nil]) {
            return Ok(literal(LiteralValue::Nil));
        }

        if self.matches(&[TokenType::Number, TokenType::String]) {
            let value = match &self.previous().literal {
                Some(Literal::Number(n)) => LiteralValue::Number(*n),
                Some(Literal::String(s)) => LiteralValue::String(Rc::from(s.as_str())),
                None => LiteralValue::Nil,
            };
            return Ok(literal(value));
        }

        if self.matches(&[TokenType::Super]) {
            let keyword = self.previous().clone();
            self.consume(TokenType::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(TokenType::Identifier, "Expect superclass method name.")?;
            return Ok(Expr::new(ExprKind::Super { keyword, method }));
        }

        if self.matches(&[TokenType::This]) {
            return Ok(Expr::new(ExprKind::This(self.previous().clone())));
        }

        if self.matches(&[TokenType::Identifier]) {
            return Ok(Expr::new(ExprKind::Variable(self.previous().clone())));
        }

        if self.matches(&[TokenType::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenType::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::new(ExprKind::Grouping(Box::new(expr))));
        }

        Err(self.error_at_current("Expect expression."))
    }
}

fn literal(value: LiteralValue) -> Expr {
    Expr::new(ExprKind::Literal(value))
}

/// Parse a token stream in one call.
///
/// # Errors
///
/// Returns every syntax error found.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::printer::print_program;
    use crate::scanner::scan;

    fn parse_source(source: &str) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty());
        parse(tokens)
    }

    fn printed(source: &str) -> String {
        print_program(&parse_source(source).expect("parse failed"))
    }

    fn error_messages(source: &str) -> Vec<String> {
        parse_source(source)
            .expect_err("expected parse errors")
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Precedence and Associativity
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn test_factor_binds_tighter_than_term() {
        assert_eq!(printed("1 + 2 * 3;"), "(; (+ 1 (* 2 3)))");
    }

    #[test]
    fn test_binary_is_left_associative() {
        assert_eq!(printed("1 - 2 - 3;"), "(; (- (- 1 2) 3))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(printed("a = b = 1;"), "(; (= a (= b 1)))");
    }

    #[test]
    fn test_logical_precedence() {
        assert_eq!(printed("a or b and c;"), "(; (or a (and b c)))");
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_eq!(printed("1 < 2 == !false;"), "(; (== (< 1 2) (! false)))");
    }

    #[test]
    fn test_call_and_property_chain() {
        assert_eq!(
            printed("a.b(1, 2).c = 3;"),
            "(; (set (call (. a b) 1 2) c 3))"
        );
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn test_for_desugars_to_while() {
        assert_eq!(
            printed("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0) (while (< i 3) (block (print i) (; (= i (+ i 1))))))"
        );
    }

    #[test]
    fn test_for_without_clauses_loops_forever() {
        assert_eq!(printed("for (;;) print 1;"), "(while true (print 1))");
    }

    #[test]
    fn test_class_with_superclass() {
        assert_eq!(
            printed("class B < A { m(x) { return x; } }"),
            "(class B < A (method m (x) (return x)))"
        );
    }

    #[test]
    fn test_super_and_this() {
        assert_eq!(
            printed("class B < A { m() { super.m(); this.x = 1; } }"),
            "(class B < A (method m () (; (call (super m))) (; (set this x 1))))"
        );
    }

    #[test]
    fn test_if_else() {
        assert_eq!(
            printed("if (x) print 1; else print 2;"),
            "(if x (print 1) (print 2))"
        );
    }

    // ═══════════════════════════════════════════════════════════════════
    // Errors and Recovery
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(
            error_messages("print 1"),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            error_messages("1 + 2 = 3;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_recovers_and_reports_multiple_errors() {
        let errors = error_messages("var = 1;\nprint ;\nprint 3;");
        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 2] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let args = (0..256)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let errors = error_messages(&format!("f({});", args));
        assert_eq!(
            errors,
            vec!["[line 1] Error at '255': Can't have more than 255 arguments."]
        );
    }

    #[test]
    fn test_super_requires_method() {
        assert_eq!(
            error_messages("super;"),
            vec!["[line 1] Error at ';': Expect '.' after 'super'."]
        );
    }
}
