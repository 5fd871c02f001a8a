//! Lexical tokens produced by the scanner

use serde::Serialize;
use std::fmt;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    // Single-character tokens.
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `;`
    Semicolon,
    /// `/`
    Slash,
    /// `*`
    Star,

    // One or two character tokens.
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,

    // Literals.
    /// A name that is not a keyword
    Identifier,
    /// A string literal
    String,
    /// A number literal
    Number,

    // Keywords.
    /// `and`
    And,
    /// `class`
    Class,
    /// `else`
    Else,
    /// `false`
    False,
    /// `fun`
    Fun,
    /// `for`
    For,
    /// `if`
    If,
    /// `nil`
    Nil,
    /// `or`
    Or,
    /// `print`
    Print,
    /// `return`
    Return,
    /// `super`
    Super,
    /// `this`
    This,
    /// `true`
    True,
    /// `var`
    Var,
    /// `while`
    While,

    /// End of input
    Eof,
}

impl TokenType {
    /// Look up the keyword for an identifier lexeme, if any.
    pub fn keyword(lexeme: &str) -> Option<TokenType> {
        let typ = match lexeme {
            "and" => TokenType::And,
            "class" => TokenType::Class,
            "else" => TokenType::Else,
            "false" => TokenType::False,
            "for" => TokenType::For,
            "fun" => TokenType::Fun,
            "if" => TokenType::If,
            "nil" => TokenType::Nil,
            "or" => TokenType::Or,
            "print" => TokenType::Print,
            "return" => TokenType::Return,
            "super" => TokenType::Super,
            "this" => TokenType::This,
            "true" => TokenType::True,
            "var" => TokenType::Var,
            "while" => TokenType::While,
            _ => return None,
        };
        Some(typ)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The literal value carried by a string or number token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    /// Numeric literal, always a double
    Number(f64),
    /// String literal without the surrounding quotes
    String(String),
}

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// What kind of token this is
    pub typ: TokenType,

    /// The exact source text of the token
    pub lexeme: String,

    /// Literal value for string and number tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<Literal>,

    /// 1-based source line
    pub line: usize,
}

impl Token {
    /// Create a new token.
    pub fn new(
        typ: TokenType,
        lexeme: impl Into<String>,
        literal: Option<Literal>,
        line: usize,
    ) -> Self {
        Self {
            typ,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }

    /// Create a synthetic identifier token, used for `this` and `super`
    /// bindings and in tests.
    pub fn identifier(name: &str, line: usize) -> Self {
        Self::new(TokenType::Identifier, name, None, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(Literal::Number(n)) => write!(f, "{} {} {}", self.typ, self.lexeme, n),
            Some(Literal::String(s)) => write!(f, "{} {} {}", self.typ, self.lexeme, s),
            None => write!(f, "{} {}", self.typ, self.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenType::keyword("while"), Some(TokenType::While));
        assert_eq!(TokenType::keyword("super"), Some(TokenType::Super));
        assert_eq!(TokenType::keyword("whilst"), None);
        assert_eq!(TokenType::keyword("While"), None);
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenType::Number, "1.5", Some(Literal::Number(1.5)), 1);
        assert_eq!(token.to_string(), "Number 1.5 1.5");

        let token = Token::new(TokenType::Semicolon, ";", None, 3);
        assert_eq!(token.to_string(), "Semicolon ;");
    }

    #[test]
    fn test_token_serializes_to_json() {
        let token = Token::new(
            TokenType::String,
            "\"hi\"",
            Some(Literal::String("hi".into())),
            2,
        );
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["typ"], "String");
        assert_eq!(json["literal"], "hi");
        assert_eq!(json["line"], 2);

        let token = Token::new(TokenType::Semicolon, ";", None, 1);
        let json = serde_json::to_value(&token).unwrap();
        assert!(json.get("literal").is_none());
    }
}
