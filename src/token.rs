use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // literals and identifiers
    Identifier,
    Int,
    String,

    // operators
    Assign,
    Equal,
    Exclam,
    NotEqual,
    Less,
    Greater,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Caret,

    // delimiters
    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

impl TokenKind {
    pub fn from_keyword_str(name: &str) -> Option<TokenKind> {
        match name {
            "let" => Some(TokenKind::Let),
            "fn" => Some(TokenKind::Function),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "return" => Some(TokenKind::Return),
            _ => None,
        }
    }
}

/// Diagnostics name token kinds by their variant, e.g. `expected Assign, got Int`.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Token {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Token {
            kind: TokenKind::Eof,
            literal: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(TokenKind::from_keyword_str("fn"), Some(TokenKind::Function));
        assert_eq!(TokenKind::from_keyword_str("return"), Some(TokenKind::Return));
        assert_eq!(TokenKind::from_keyword_str("len"), None);
    }

    #[test]
    fn kind_displays_as_variant_name() {
        assert_eq!(TokenKind::Assign.to_string(), "Assign");
        assert_eq!(TokenKind::Eof.to_string(), "Eof");
    }
}
