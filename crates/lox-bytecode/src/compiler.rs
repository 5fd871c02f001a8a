//! Single-pass compiler from tokens to a chunk
//!
//! There is no syntax tree: a Pratt parser walks the tokens and emits
//! bytecode as it recognizes each construct. Globals are looked up by
//! name at run time; locals live in stack slots resolved here.
//!
//! The engine covers the procedural core of Lox (expressions, variables,
//! blocks and control flow). Functions and classes are reported as
//! compile errors.

use lox::{scan, Literal, SyntaxError, Token, TokenType};

use crate::chunk::{Chunk, OpCode, MAX_CONSTANTS};
use crate::value::Value;

/// Most locals addressable with a one-byte slot.
pub const MAX_LOCALS: usize = 256;

/// Compile `source` into a chunk ending in `OP_RETURN`.
///
/// # Example
///
/// ```
/// use lox_bytecode::{compile, OpCode};
///
/// let chunk = compile("print 1 + 2;").unwrap();
/// assert_eq!(chunk.code().last(), Some(&u8::from(OpCode::Return)));
/// ```
///
/// # Errors
///
/// Returns every scanner and compiler error, scanner errors first.
pub fn compile(source: &str) -> Result<Chunk, Vec<SyntaxError>> {
    let (tokens, mut errors) = scan(source);

    let mut compiler = Compiler::new(tokens);
    compiler.program();
    errors.append(&mut compiler.errors);

    tracing::debug!(
        bytes = compiler.chunk.len(),
        constants = compiler.chunk.constants().len(),
        errors = errors.len(),
        "compiled chunk"
    );

    if errors.is_empty() {
        Ok(compiler.chunk)
    } else {
        Err(errors)
    }
}

/// Binding strength, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    /// One level tighter; binary operators parse their right operand here.
    fn tighter(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

type ParseFn = fn(&mut Compiler, bool);

struct ParseRule {
    prefix: Option<ParseFn>,
    infix: Option<ParseFn>,
    precedence: Precedence,
}

impl ParseRule {
    fn new(prefix: Option<ParseFn>, infix: Option<ParseFn>, precedence: Precedence) -> Self {
        Self {
            prefix,
            infix,
            precedence,
        }
    }
}

fn rule(typ: TokenType) -> ParseRule {
    use TokenType::*;

    match typ {
        LeftParen => ParseRule::new(
            Some(Compiler::grouping),
            Some(Compiler::call),
            Precedence::Call,
        ),
        Dot => ParseRule::new(None, Some(Compiler::dot), Precedence::Call),
        Minus => ParseRule::new(
            Some(Compiler::unary),
            Some(Compiler::binary),
            Precedence::Term,
        ),
        Plus => ParseRule::new(None, Some(Compiler::binary), Precedence::Term),
        Slash | Star => ParseRule::new(None, Some(Compiler::binary), Precedence::Factor),
        Bang => ParseRule::new(Some(Compiler::unary), None, Precedence::None),
        BangEqual | EqualEqual => {
            ParseRule::new(None, Some(Compiler::binary), Precedence::Equality)
        }
        Greater | GreaterEqual | Less | LessEqual => {
            ParseRule::new(None, Some(Compiler::binary), Precedence::Comparison)
        }
        Identifier => ParseRule::new(Some(Compiler::variable), None, Precedence::None),
        String => ParseRule::new(Some(Compiler::string), None, Precedence::None),
        Number => ParseRule::new(Some(Compiler::number), None, Precedence::None),
        And => ParseRule::new(None, Some(Compiler::and), Precedence::And),
        Or => ParseRule::new(None, Some(Compiler::or), Precedence::Or),
        False | True | Nil => ParseRule::new(Some(Compiler::literal), None, Precedence::None),
        This => ParseRule::new(Some(Compiler::this), None, Precedence::None),
        Super => ParseRule::new(Some(Compiler::super_), None, Precedence::None),
        _ => ParseRule::new(None, None, Precedence::None),
    }
}

/// A local variable slot. `depth` is `None` while its initializer runs.
#[derive(Debug)]
struct Local {
    name: String,
    depth: Option<usize>,
}

struct Compiler {
    tokens: Vec<Token>,
    previous: usize,
    current: usize,
    chunk: Chunk,
    locals: Vec<Local>,
    scope_depth: usize,
    errors: Vec<SyntaxError>,
    panic_mode: bool,
}

impl Compiler {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.typ) != Some(TokenType::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenType::Eof, "", None, line));
        }

        Self {
            tokens,
            previous: 0,
            current: 0,
            chunk: Chunk::new(),
            locals: Vec::new(),
            scope_depth: 0,
            errors: Vec::new(),
            panic_mode: false,
        }
    }

    fn program(&mut self) {
        while !self.check(TokenType::Eof) {
            self.declaration();
        }
        self.emit(OpCode::Return);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Token Cursor
    // ═══════════════════════════════════════════════════════════════════

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.previous]
    }

    fn advance(&mut self) {
        self.previous = self.current;
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
    }

    fn check(&self, typ: TokenType) -> bool {
        self.peek().typ == typ
    }

    fn matches(&mut self, typ: TokenType) -> bool {
        if !self.check(typ) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, typ: TokenType, message: &str) {
        if self.check(typ) {
            self.advance();
        } else {
            self.error_at_current(message);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Errors
    // ═══════════════════════════════════════════════════════════════════

    fn error_at_current(&mut self, message: &str) {
        let token = self.peek().clone();
        self.error_at(&token, message);
    }

    fn error(&mut self, message: &str) {
        let token = self.previous().clone();
        self.error_at(&token, message);
    }

    /// Record an error unless one is already being recovered from.
    fn error_at(&mut self, token: &Token, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.errors.push(SyntaxError::at_token(token, message));
    }

    fn unsupported(&mut self, feature: &str) {
        let message = format!("{} is not supported by the bytecode engine.", feature);
        self.error(&message);
    }

    /// Skip tokens until a likely statement boundary.
    fn synchronize(&mut self) {
        self.panic_mode = false;

        while !self.check(TokenType::Eof) {
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

    /// Skip an unsupported declaration through the end of its body.
    fn skip_declaration(&mut self) {
        let mut depth = 0usize;

        while !self.check(TokenType::Eof) {
            match self.peek().typ {
                TokenType::LeftBrace => depth += 1,
                TokenType::RightBrace if depth <= 1 => {
                    self.advance();
                    break;
                }
                TokenType::RightBrace => depth -= 1,
                TokenType::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                _ => {}
            }
            self.advance();
        }

        self.panic_mode = false;
    }

    // ═══════════════════════════════════════════════════════════════════
    // Emitting
    // ═══════════════════════════════════════════════════════════════════

    fn emit(&mut self, byte: impl Into<u8>) {
        let line = self.previous().line;
        self.chunk.write(byte, line);
    }

    fn emit_with_operand(&mut self, op: OpCode, operand: u8) {
        self.emit(op);
        self.emit(operand);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        let index = self.chunk.add_constant(value);
        if index >= MAX_CONSTANTS {
            self.error("Too many constants in one chunk.");
            return 0;
        }
        u8::try_from(index).unwrap_or(0)
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_with_operand(OpCode::Constant, index);
    }

    /// Emit a forward jump with a placeholder distance; returns the
    /// offset of the distance to patch.
    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit(op);
        self.emit(0xffu8);
        self.emit(0xffu8);
        self.chunk.len() - 2
    }

    fn patch_jump(&mut self, offset: usize) {
        let distance = self.chunk.len() - offset - 2;
        let Ok(distance) = u16::try_from(distance) else {
            self.error("Too much code to jump over.");
            return;
        };

        let [hi, lo] = distance.to_be_bytes();
        self.chunk.patch(offset, hi);
        self.chunk.patch(offset + 1, lo);
    }

    fn emit_loop(&mut self, loop_start: usize) {
        self.emit(OpCode::Loop);

        let distance = self.chunk.len() - loop_start + 2;
        let Ok(distance) = u16::try_from(distance) else {
            self.error("Loop body too large.");
            return;
        };

        let [hi, lo] = distance.to_be_bytes();
        self.emit(hi);
        self.emit(lo);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Declarations
    // ═══════════════════════════════════════════════════════════════════

    fn declaration(&mut self) {
        if self.matches(TokenType::Fun) {
            self.unsupported("Function declaration");
            self.skip_declaration();
        } else if self.matches(TokenType::Class) {
            self.unsupported("Class declaration");
            self.skip_declaration();
        } else if self.matches(TokenType::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");

        if self.matches(TokenType::Equal) {
            self.expression();
        } else {
            self.emit(OpCode::Nil);
        }
        self.consume(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
        );

        self.define_variable(global);
    }

    /// Consume a variable name. Returns its name constant for globals,
    /// 0 for locals.
    fn parse_variable(&mut self, message: &str) -> u8 {
        self.consume(TokenType::Identifier, message);

        self.declare_variable();
        if self.scope_depth > 0 {
            return 0;
        }

        let name = self.previous().lexeme.clone();
        self.make_constant(Value::string(name))
    }

    fn declare_variable(&mut self) {
        if self.scope_depth == 0 {
            return;
        }

        let name = self.previous().lexeme.clone();
        let depth = self.scope_depth;
        let duplicate = self
            .locals
            .iter()
            .rev()
            .take_while(|local| !matches!(local.depth, Some(d) if d < depth))
            .any(|local| local.name == name);
        if duplicate {
            self.error("Already a variable with this name in this scope.");
        }

        self.add_local(name);
    }

    fn add_local(&mut self, name: String) {
        if self.locals.len() >= MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.locals.push(Local { name, depth: None });
    }

    fn define_variable(&mut self, global: u8) {
        if self.scope_depth > 0 {
            if let Some(local) = self.locals.last_mut() {
                local.depth = Some(self.scope_depth);
            }
            return;
        }

        self.emit_with_operand(OpCode::DefineGlobal, global);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    fn statement(&mut self) {
        if self.matches(TokenType::Print) {
            self.print_statement();
        } else if self.matches(TokenType::If) {
            self.if_statement();
        } else if self.matches(TokenType::While) {
            self.while_statement();
        } else if self.matches(TokenType::For) {
            self.for_statement();
        } else if self.matches(TokenType::Return) {
            self.unsupported("'return'");
        } else if self.matches(TokenType::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after value.");
        self.emit(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after expression.");
        self.emit(OpCode::Pop);
    }

    fn if_statement(&mut self) {
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after if condition.");

        let then_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit(OpCode::Pop);
        self.statement();

        let else_jump = self.emit_jump(OpCode::Jump);
        self.patch_jump(then_jump);
        self.emit(OpCode::Pop);

        if self.matches(TokenType::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.chunk.len();
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit(OpCode::Pop);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit(OpCode::Pop);
    }

    fn for_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.");

        if self.matches(TokenType::Semicolon) {
            // No initializer.
        } else if self.matches(TokenType::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.chunk.len();
        let mut exit_jump = None;
        if !self.matches(TokenType::Semicolon) {
            self.expression();
            self.consume(TokenType::Semicolon, "Expect ';' after loop condition.");

            exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
            self.emit(OpCode::Pop);
        }

        if !self.matches(TokenType::RightParen) {
            let body_jump = self.emit_jump(OpCode::Jump);
            let increment_start = self.chunk.len();
            self.expression();
            self.emit(OpCode::Pop);
            self.consume(TokenType::RightParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit(OpCode::Pop);
        }

        self.end_scope();
    }

    fn block(&mut self) {
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            self.declaration();
        }
        self.consume(TokenType::RightBrace, "Expect '}' after block.");
    }

    fn begin_scope(&mut self) {
        self.scope_depth += 1;
    }

    fn end_scope(&mut self) {
        self.scope_depth -= 1;

        let depth = self.scope_depth;
        while self
            .locals
            .last()
            .is_some_and(|local| !matches!(local.depth, Some(d) if d <= depth))
        {
            self.locals.pop();
            self.emit(OpCode::Pop);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix) = rule(self.previous().typ).prefix else {
            self.error("Expect expression.");
            return;
        };

        let can_assign = precedence <= Precedence::Assignment;
        prefix(self, can_assign);

        while precedence <= rule(self.peek().typ).precedence {
            self.advance();
            if let Some(infix) = rule(self.previous().typ).infix {
                infix(self, can_assign);
            }
        }

        if can_assign && self.matches(TokenType::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    fn grouping(&mut self, _can_assign: bool) {
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after expression.");
    }

    fn number(&mut self, _can_assign: bool) {
        if let Some(Literal::Number(n)) = self.previous().literal {
            self.emit_constant(Value::Number(n));
        }
    }

    fn string(&mut self, _can_assign: bool) {
        if let Some(Literal::String(s)) = &self.previous().literal {
            let value = Value::string(s);
            self.emit_constant(value);
        }
    }

    fn literal(&mut self, _can_assign: bool) {
        match self.previous().typ {
            TokenType::False => self.emit(OpCode::False),
            TokenType::True => self.emit(OpCode::True),
            _ => self.emit(OpCode::Nil),
        }
    }

    fn unary(&mut self, _can_assign: bool) {
        let operator = self.previous().typ;
        self.parse_precedence(Precedence::Unary);

        match operator {
            TokenType::Minus => self.emit(OpCode::Negate),
            _ => self.emit(OpCode::Not),
        }
    }

    fn binary(&mut self, _can_assign: bool) {
        let operator = self.previous().typ;
        self.parse_precedence(rule(operator).precedence.tighter());

        match operator {
            TokenType::BangEqual => {
                self.emit(OpCode::Equal);
                self.emit(OpCode::Not);
            }
            TokenType::EqualEqual => self.emit(OpCode::Equal),
            TokenType::Greater => self.emit(OpCode::Greater),
            TokenType::GreaterEqual => self.emit(OpCode::GreaterEqual),
            TokenType::Less => self.emit(OpCode::Less),
            TokenType::LessEqual => self.emit(OpCode::LessEqual),
            TokenType::Plus => self.emit(OpCode::Add),
            TokenType::Minus => self.emit(OpCode::Subtract),
            TokenType::Star => self.emit(OpCode::Multiply),
            _ => self.emit(OpCode::Divide),
        }
    }

    fn and(&mut self, _can_assign: bool) {
        let end_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit(OpCode::Pop);
        self.parse_precedence(Precedence::And);
        self.patch_jump(end_jump);
    }

    fn or(&mut self, _can_assign: bool) {
        let else_jump = self.emit_jump(OpCode::JumpIfFalse);
        let end_jump = self.emit_jump(OpCode::Jump);

        self.patch_jump(else_jump);
        self.emit(OpCode::Pop);

        self.parse_precedence(Precedence::Or);
        self.patch_jump(end_jump);
    }

    fn variable(&mut self, can_assign: bool) {
        let name = self.previous().lexeme.clone();

        let (get, set, operand) = match self.resolve_local(&name) {
            Some(slot) => (OpCode::GetLocal, OpCode::SetLocal, slot),
            None => {
                let constant = self.make_constant(Value::string(&name));
                (OpCode::GetGlobal, OpCode::SetGlobal, constant)
            }
        };

        if can_assign && self.matches(TokenType::Equal) {
            self.expression();
            self.emit_with_operand(set, operand);
        } else {
            self.emit_with_operand(get, operand);
        }
    }

    /// Find the slot of the innermost local named `name`.
    fn resolve_local(&mut self, name: &str) -> Option<u8> {
        let (slot, local) = self
            .locals
            .iter()
            .enumerate()
            .rev()
            .find(|(_, local)| local.name == name)?;

        let uninitialized = local.depth.is_none();
        if uninitialized {
            self.error("Can't read local variable in its own initializer.");
        }
        u8::try_from(slot).ok()
    }

    fn this(&mut self, _can_assign: bool) {
        self.unsupported("'this'");
    }

    fn super_(&mut self, _can_assign: bool) {
        self.unsupported("'super'");
    }

    fn call(&mut self, _can_assign: bool) {
        self.unsupported("Function call");
    }

    fn dot(&mut self, _can_assign: bool) {
        self.unsupported("Property access");
    }
}
