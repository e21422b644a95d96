use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{self, Expression, Statement},
    token::{Token, TokenKind},
};

/// A syntax error. Its `Display` is the diagnostic text handed to callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, got {got}")]
    Expected { expected: TokenKind, got: TokenKind },
    #[error("{0} is not prefix/left side value for expression")]
    NoPrefix(TokenKind),
    #[error("could not parse {0} as integer")]
    InvalidInt(String),
    #[error("duplicate key {0} in hash literal")]
    DuplicateKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Result<Expression, ParseError>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> Result<Expression, ParseError>;

impl TokenKind {
    fn precedence(&self) -> Precedence {
        match self {
            Self::Equal | Self::NotEqual => Precedence::Equals,
            Self::Less | Self::Greater => Precedence::LessGreater,
            Self::Plus | Self::Minus | Self::Caret => Precedence::Sum,
            Self::Asterisk | Self::Slash => Precedence::Product,
            Self::LParen => Precedence::Call,
            Self::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }

    fn prefix_parse_fn<'a>(&self) -> Option<PrefixParseFn<'a>> {
        match self {
            Self::Identifier => Some(Parser::parse_identifier_expr),
            Self::Int => Some(Parser::parse_int_literal),
            Self::String => Some(Parser::parse_string_literal),
            Self::True | Self::False => Some(Parser::parse_boolean_literal),
            Self::Exclam | Self::Minus => Some(Parser::parse_prefix),
            Self::LParen => Some(Parser::parse_grouped),
            Self::If => Some(Parser::parse_if),
            Self::Function => Some(Parser::parse_function_literal),
            Self::LBracket => Some(Parser::parse_array_literal),
            Self::LBrace => Some(Parser::parse_hash_literal),
            _ => None,
        }
    }

    fn infix_parse_fn<'a>(&self) -> Option<InfixParseFn<'a>> {
        match self {
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::Greater
            | Self::Plus
            | Self::Minus
            | Self::Caret
            | Self::Asterisk
            | Self::Slash => Some(Parser::parse_infix),
            Self::LParen => Some(Parser::parse_call),
            Self::LBracket => Some(Parser::parse_index),
            _ => None,
        }
    }
}

static EOF: Token = Token {
    kind: TokenKind::Eof,
    literal: String::new(),
};

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    errors: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Diagnostics collected by the last [`Parser::parse_program`], in order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    fn peek(&self) -> &'a Token {
        self.tokens.get(self.current).unwrap_or(&EOF)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if self.current < self.tokens.len() {
            self.current += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            self.current += 1;
            Ok(token)
        } else {
            Err(ParseError::Expected {
                expected: kind,
                got: token.kind,
            })
        }
    }

    /// Parses statements until `Eof` or the first failure. A failure stops the
    /// program there; what was parsed before it is kept.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn parse_program(&mut self) -> ast::Program {
        let mut program = ast::Program::default();

        while self.peek_kind() != TokenKind::Eof {
            match self.parse_statement() {
                Ok(stmt) => program.statements.push(stmt),
                Err(err) => {
                    trace!(%err, parsed = program.statements.len(), "parse stopped");
                    self.errors.push(err.to_string());
                    break;
                }
            }
        }

        program
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.advance().clone();
        let name = self.parse_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr(Precedence::Lowest)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(ast::LetStatement { token, name, value }.into())
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.advance().clone();
        let value = self.parse_expr(Precedence::Lowest)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(ast::ReturnStatement { token, value }.into())
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.peek().clone();
        let value = self.parse_expr(Precedence::Lowest)?;

        if self.peek_kind() == TokenKind::Semicolon {
            self.current += 1;
        }

        Ok(ast::ExpressionStatement { token, value }.into())
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, ParseError> {
        self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            stmts.push(self.parse_statement()?);
        }

        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_expr(&mut self, min_prec: Precedence) -> Result<Expression, ParseError> {
        let prefix = self
            .peek_kind()
            .prefix_parse_fn()
            .ok_or(ParseError::NoPrefix(self.peek_kind()))?;
        let mut lhs = prefix(self)?;

        while self.peek_kind() != TokenKind::Semicolon && min_prec < self.peek_kind().precedence() {
            let infix = match self.peek_kind().infix_parse_fn() {
                Some(infix) => infix,
                None => break,
            };
            lhs = infix(self, lhs)?;
        }

        Ok(lhs)
    }

    /// Comma separated expressions up to and including `end`.
    fn parse_expr_list(&mut self, end: TokenKind) -> Result<Vec<Expression>, ParseError> {
        let mut list = Vec::new();

        if self.peek_kind() == end {
            self.current += 1;
            return Ok(list);
        }

        list.push(self.parse_expr(Precedence::Lowest)?);
        while self.peek_kind() == TokenKind::Comma {
            self.current += 1;
            list.push(self.parse_expr(Precedence::Lowest)?);
        }

        self.expect(end)?;
        Ok(list)
    }

    fn parse_identifier(&mut self) -> Result<ast::Identifier, ParseError> {
        let token = self.expect(TokenKind::Identifier)?.clone();
        Ok(ast::Identifier {
            name: token.literal.clone(),
            token,
        })
    }

    fn parse_identifier_expr(&mut self) -> Result<Expression, ParseError> {
        Ok(self.parse_identifier()?.into())
    }

    fn parse_int_literal(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let value = token
            .literal
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidInt(token.literal.clone()))?;

        Ok(ast::IntLiteral { token, value }.into())
    }

    fn parse_string_literal(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let value = token
            .literal
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&token.literal)
            .to_string();

        Ok(ast::StringLiteral { token, value }.into())
    }

    fn parse_boolean_literal(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let value = token.kind == TokenKind::True;

        Ok(ast::BooleanLiteral { token, value }.into())
    }

    fn parse_prefix(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let operand = self.parse_expr(Precedence::Prefix)?;

        Ok(ast::PrefixOperator {
            op: token.literal.clone(),
            token,
            operand: Box::new(operand),
        }
        .into())
    }

    fn parse_grouped(&mut self) -> Result<Expression, ParseError> {
        self.advance();
        let expr = self.parse_expr(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;

        Ok(expr)
    }

    fn parse_if(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();

        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;

        let consequence = self.parse_block()?;
        self.expect(TokenKind::Else)?;
        let alternative = self.parse_block()?;

        Ok(ast::IfExpression {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        }
        .into())
    }

    fn parse_function_literal(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.peek_kind() != TokenKind::RParen {
            params.push(self.parse_identifier()?);
            while self.peek_kind() == TokenKind::Comma {
                self.current += 1;
                params.push(self.parse_identifier()?);
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;

        Ok(ast::FunctionLiteral {
            token,
            params,
            body,
        }
        .into())
    }

    fn parse_array_literal(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let elements = self.parse_expr_list(TokenKind::RBracket)?;

        Ok(ast::ArrayLiteral { token, elements }.into())
    }

    fn parse_hash_literal(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let mut pairs: Vec<(Expression, Expression)> = Vec::new();

        while self.peek_kind() != TokenKind::RBrace {
            let key = self.parse_expr(Precedence::Lowest)?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr(Precedence::Lowest)?;

            if pairs.iter().any(|(existing, _)| *existing == key) {
                return Err(ParseError::DuplicateKey(key.to_string()));
            }
            pairs.push((key, value));

            if self.peek_kind() != TokenKind::RBrace {
                self.expect(TokenKind::Comma)?;
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(ast::HashLiteral { token, pairs }.into())
    }

    fn parse_infix(&mut self, lhs: Expression) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let rhs = self.parse_expr(token.kind.precedence())?;

        Ok(ast::InfixOperator {
            op: token.literal.clone(),
            token,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
        .into())
    }

    fn parse_call(&mut self, callee: Expression) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let args = self.parse_expr_list(TokenKind::RParen)?;

        Ok(ast::Call {
            token,
            callee: Box::new(callee),
            args,
        }
        .into())
    }

    fn parse_index(&mut self, base: Expression) -> Result<Expression, ParseError> {
        let token = self.advance().clone();
        let index = self.parse_expr(Precedence::Lowest)?;
        self.expect(TokenKind::RBracket)?;

        Ok(ast::IndexExpression {
            token,
            base: Box::new(base),
            index: Box::new(index),
        }
        .into())
    }
}

/// Parses a token stream into a program plus its diagnostics.
pub fn parse(tokens: &[Token]) -> (ast::Program, Vec<String>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.take_errors())
}
