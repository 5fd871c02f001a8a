//! Scanner turning source text into tokens

use crate::error::SyntaxError;
use crate::token::{Literal, Token, TokenType};

/// Converts Lox source into a flat list of tokens.
///
/// Scanning never stops early: every lexical error is recorded and the
/// scanner moves on, so a single pass reports all of them.
///
/// # Example
///
/// ```
/// use lox::scanner::Scanner;
/// use lox::token::TokenType;
///
/// let (tokens, errors) = Scanner::new("var x = 1;").scan_tokens();
/// assert!(errors.is_empty());
/// assert_eq!(tokens.len(), 6);
/// assert_eq!(tokens.last().map(|t| t.typ), Some(TokenType::Eof));
/// ```
pub struct Scanner<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,

    /// Byte offset where the current lexeme starts
    start: usize,

    /// Byte offset of the next unread character
    current: usize,

    line: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scan the whole source.
    ///
    /// Returns the tokens (always terminated by a single `Eof`) together
    /// with any lexical errors encountered.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<SyntaxError>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        let eof = Token::new(TokenType::Eof, "", None, self.line);
        self.tokens.push(eof);

        tracing::debug!(
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "scanned source"
        );

        (self.tokens, self.errors)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Character Cursor
    // ═══════════════════════════════════════════════════════════════════

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        Some(c)
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> &'a str {
        &self.source[self.start..self.current]
    }

    fn add_token(&mut self, typ: TokenType) {
        self.add_literal_token(typ, None);
    }

    fn add_literal_token(&mut self, typ: TokenType, literal: Option<Literal>) {
        let token = Token::new(typ, self.lexeme(), literal, self.line);
        self.tokens.push(token);
    }

    fn error(&mut self, message: &str) {
        self.errors.push(SyntaxError::at_line(self.line, message));
    }

    // ═══════════════════════════════════════════════════════════════════
    // Token Rules
    // ═══════════════════════════════════════════════════════════════════

    fn scan_token(&mut self) {
        let Some(c) = self.advance() else {
            return;
        };

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),
            '!' => {
                let typ = if self.matches('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(typ);
            }
            '=' => {
                let typ = if self.matches('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(typ);
            }
            '<' => {
                let typ = if self.matches('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(typ);
            }
            '>' => {
                let typ = if self.matches('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(typ);
            }
            '/' => {
                if self.matches('/') {
                    // A comment goes until the end of the line.
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_alpha(c) => self.identifier(),
            _ => self.error("Unexpected character."),
        }
    }

    fn string(&mut self) {
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.error("Unterminated string.");
            return;
        }

        // The closing quote.
        self.advance();

        let value = &self.source[self.start + 1..self.current - 1];
        self.add_literal_token(TokenType::String, Some(Literal::String(value.to_string())));
    }

    fn number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // A fractional part needs at least one digit after the dot.
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        match self.lexeme().parse::<f64>() {
            Ok(value) => self.add_literal_token(TokenType::Number, Some(Literal::Number(value))),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_some_and(is_alphanumeric) {
            self.advance();
        }

        let typ = TokenType::keyword(self.lexeme()).unwrap_or(TokenType::Identifier);
        self.add_token(typ);
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

/// Scan `source` in one call.
pub fn scan(source: &str) -> (Vec<Token>, Vec<SyntaxError>) {
    Scanner::new(source).scan_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(source: &str) -> Vec<TokenType> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().map(|t| t.typ).collect()
    }

    #[test]
    fn test_single_and_double_char_tokens() {
        assert_eq!(
            types("(){},.-+;*! != = == < <= > >= /"),
            vec![
                TokenType::LeftParen,
                TokenType::RightParen,
                TokenType::LeftBrace,
                TokenType::RightBrace,
                TokenType::Comma,
                TokenType::Dot,
                TokenType::Minus,
                TokenType::Plus,
                TokenType::Semicolon,
                TokenType::Star,
                TokenType::Bang,
                TokenType::BangEqual,
                TokenType::Equal,
                TokenType::EqualEqual,
                TokenType::Less,
                TokenType::LessEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Slash,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            types("and andy _under class9 fun"),
            vec![
                TokenType::And,
                TokenType::Identifier,
                TokenType::Identifier,
                TokenType::Identifier,
                TokenType::Fun,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        let (tokens, _) = scan("123 45.67");
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(45.67)));
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_number() {
        let (tokens, _) = scan("123.");
        assert_eq!(tokens[0].typ, TokenType::Number);
        assert_eq!(tokens[0].lexeme, "123");
        assert_eq!(tokens[1].typ, TokenType::Dot);
    }

    #[test]
    fn test_leading_dot_is_not_part_of_number() {
        assert_eq!(
            types(".5"),
            vec![TokenType::Dot, TokenType::Number, TokenType::Eof]
        );
    }

    #[test]
    fn test_multiline_string_advances_line() {
        let (tokens, errors) = scan("\"a\nb\" x");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::String("a\nb".to_string())));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = scan("\"abc\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 2] Error: Unterminated string."
        );
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_unexpected_character_keeps_scanning() {
        let (tokens, errors) = scan("1 | 2 @");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error: Unexpected character."
        );
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_comments_are_skipped() {
        let (tokens, _) = scan("// nothing here\nprint");
        assert_eq!(tokens[0].typ, TokenType::Print);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn test_non_ascii_in_string_and_comment() {
        let (tokens, errors) = scan("// ünïcödé\n\"日本\"");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::String("日本".to_string())));
    }

    #[test]
    fn test_eof_carries_final_line() {
        let (tokens, _) = scan("\n\n");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].line, 3);
    }
}
