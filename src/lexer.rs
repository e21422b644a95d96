use crate::token::{Token, TokenKind};

use unicode_xid::UnicodeXID;

/// Pull-based tokenizer. Each call to [`Lexer::next_token`] yields one token;
/// once the source is exhausted it keeps yielding `Eof`.
#[derive(Debug, Clone)]
pub struct Lexer {
    source: Vec<char>,

    start: usize,
    current: usize,
}

pub fn tokenize(text: &str) -> Lexer {
    Lexer::from_str(text)
}

impl Lexer {
    pub fn from_str(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            start: 0,
            current: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) {
        self.current += 1;
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn create_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.lexeme())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn lex_string(&mut self) -> Token {
        while !self.at_end() && self.peek() != Some('"') {
            self.advance();
        }

        if self.at_end() {
            return self.create_token(TokenKind::Illegal);
        }

        self.advance(); // closing quote
        self.create_token(TokenKind::String)
    }

    fn lex_number(&mut self) -> Token {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        self.create_token(TokenKind::Int)
    }

    fn lex_ident(&mut self) -> Token {
        while matches!(self.peek(), Some(c) if c.is_xid_start()) {
            self.advance();
        }

        let lexeme = self.lexeme();
        let kind = TokenKind::from_keyword_str(&lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme)
    }

    /// Operators that may be followed by `=` to form a two-character operator.
    fn lex_maybe_equal(&mut self, single: TokenKind, double: TokenKind) -> Token {
        if self.peek() == Some('=') {
            self.advance();
            self.create_token(double)
        } else {
            self.create_token(single)
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.current;

        let c = match self.peek() {
            Some(c) => c,
            None => return Token::eof(),
        };
        self.advance();

        match c {
            '=' => self.lex_maybe_equal(TokenKind::Assign, TokenKind::Equal),
            '!' => self.lex_maybe_equal(TokenKind::Exclam, TokenKind::NotEqual),
            '<' => self.create_token(TokenKind::Less),
            '>' => self.create_token(TokenKind::Greater),
            '+' => self.create_token(TokenKind::Plus),
            '-' => self.create_token(TokenKind::Minus),
            '*' => self.create_token(TokenKind::Asterisk),
            '/' => self.create_token(TokenKind::Slash),
            '^' => self.create_token(TokenKind::Caret),

            ',' => self.create_token(TokenKind::Comma),
            ';' => self.create_token(TokenKind::Semicolon),
            ':' => self.create_token(TokenKind::Colon),
            '(' => self.create_token(TokenKind::LParen),
            ')' => self.create_token(TokenKind::RParen),
            '{' => self.create_token(TokenKind::LBrace),
            '}' => self.create_token(TokenKind::RBrace),
            '[' => self.create_token(TokenKind::LBracket),
            ']' => self.create_token(TokenKind::RBracket),

            '"' => self.lex_string(),

            _ if c.is_ascii_digit() => self.lex_number(),
            _ if c.is_xid_start() => self.lex_ident(),
            _ => self.create_token(TokenKind::Illegal),
        }
    }

    /// Drains the stream. The returned vector always ends with a single `Eof`.
    pub fn tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).tokens().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_operators() {
        for (src, kind) in [
            ("=", TokenKind::Assign),
            ("<", TokenKind::Less),
            (">", TokenKind::Greater),
            ("!", TokenKind::Exclam),
            ("+", TokenKind::Plus),
            ("-", TokenKind::Minus),
            ("*", TokenKind::Asterisk),
            ("/", TokenKind::Slash),
            ("^", TokenKind::Caret),
            (":", TokenKind::Colon),
            ("[", TokenKind::LBracket),
            ("]", TokenKind::RBracket),
        ] {
            assert_eq!(tokenize(src).next_token(), Token::new(kind, src));
        }
    }

    #[test]
    fn two_char_operators_use_maximal_munch() {
        assert_eq!(tokenize("==").next_token(), Token::new(TokenKind::Equal, "=="));
        assert_eq!(tokenize("!=").next_token(), Token::new(TokenKind::NotEqual, "!="));
        assert_eq!(
            kinds("=5"),
            vec![TokenKind::Assign, TokenKind::Int, TokenKind::Eof]
        );
        assert_eq!(
            kinds("= ="),
            vec![TokenKind::Assign, TokenKind::Assign, TokenKind::Eof]
        );
    }

    #[test]
    fn eof_repeats_forever() {
        let mut lexer = tokenize("");
        assert_eq!(lexer.next_token(), Token::eof());
        assert_eq!(lexer.next_token(), Token::eof());
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = tokenize("let fn if else true false return five").tokens();
        let expected = vec![
            Token::new(TokenKind::Let, "let"),
            Token::new(TokenKind::Function, "fn"),
            Token::new(TokenKind::If, "if"),
            Token::new(TokenKind::Else, "else"),
            Token::new(TokenKind::True, "true"),
            Token::new(TokenKind::False, "false"),
            Token::new(TokenKind::Return, "return"),
            Token::new(TokenKind::Identifier, "five"),
            Token::eof(),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn identifiers_are_letters_only() {
        let tokens = tokenize("foo1").tokens();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Identifier, "foo"),
                Token::new(TokenKind::Int, "1"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn string_literal_keeps_quotes_in_literal() {
        assert_eq!(
            tokenize("\"Hello World!\"").next_token(),
            Token::new(TokenKind::String, "\"Hello World!\"")
        );
        // no escape processing
        assert_eq!(
            tokenize(r#""a\n""#).next_token(),
            Token::new(TokenKind::String, r#""a\n""#)
        );
    }

    #[test]
    fn unterminated_string_is_illegal() {
        let tokens = tokenize("\"abc").tokens();
        assert_eq!(
            tokens,
            vec![Token::new(TokenKind::Illegal, "\"abc"), Token::eof()]
        );
    }

    #[test]
    fn unknown_character_is_illegal() {
        assert_eq!(tokenize("@").next_token(), Token::new(TokenKind::Illegal, "@"));
    }

    #[test]
    fn let_with_function() {
        assert_eq!(
            kinds("let add = fn(x, y) {\n  return x + y;\n};"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Function,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }
}
