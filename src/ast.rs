use std::fmt;

use derive_more::{From, TryInto};

use crate::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub token: Token,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: Vec<Expression>,
}

/// Keys are kept in source order; the parser rejects structurally equal keys.
#[derive(Debug, Clone, PartialEq)]
pub struct HashLiteral {
    pub token: Token,
    pub pairs: Vec<(Expression, Expression)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub token: Token,
    pub base: Box<Expression>,
    pub index: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixOperator {
    pub token: Token,
    pub op: String,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixOperator {
    pub token: Token,
    pub op: String,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub consequence: Vec<Statement>,
    pub alternative: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub token: Token,
    pub params: Vec<Identifier>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub token: Token,
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, From, TryInto)]
pub enum Expression {
    Identifier(Identifier),
    IntLiteral(IntLiteral),
    BooleanLiteral(BooleanLiteral),
    StringLiteral(StringLiteral),
    ArrayLiteral(ArrayLiteral),
    HashLiteral(HashLiteral),
    Index(IndexExpression),
    Prefix(PrefixOperator),
    Infix(InfixOperator),
    If(IfExpression),
    Function(FunctionLiteral),
    Call(Call),
}

impl Expression {
    pub fn token_literal(&self) -> &str {
        match self {
            Expression::Identifier(e) => &e.token.literal,
            Expression::IntLiteral(e) => &e.token.literal,
            Expression::BooleanLiteral(e) => &e.token.literal,
            Expression::StringLiteral(e) => &e.token.literal,
            Expression::ArrayLiteral(e) => &e.token.literal,
            Expression::HashLiteral(e) => &e.token.literal,
            Expression::Index(e) => &e.token.literal,
            Expression::Prefix(e) => &e.token.literal,
            Expression::Infix(e) => &e.token.literal,
            Expression::If(e) => &e.token.literal,
            Expression::Function(e) => &e.token.literal,
            Expression::Call(e) => &e.token.literal,
        }
    }

    /// Name of the node variant, used in evaluator messages.
    pub fn node_kind(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "Identifier",
            Expression::IntLiteral(_) => "IntLiteral",
            Expression::BooleanLiteral(_) => "BooleanLiteral",
            Expression::StringLiteral(_) => "StringLiteral",
            Expression::ArrayLiteral(_) => "ArrayLiteral",
            Expression::HashLiteral(_) => "HashLiteral",
            Expression::Index(_) => "IndexExpression",
            Expression::Prefix(_) => "PrefixOperator",
            Expression::Infix(_) => "InfixOperator",
            Expression::If(_) => "IfExpression",
            Expression::Function(_) => "FunctionLiteral",
            Expression::Call(_) => "Call",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub token: Token,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, From, TryInto)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn token_literal(&self) -> &str {
        match self {
            Statement::Let(s) => &s.token.literal,
            Statement::Return(s) => &s.token.literal,
            Statement::Expression(s) => &s.token.literal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(|s| s.token_literal())
            .unwrap_or("")
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// `{ a b }`, or `{}` when empty.
fn write_block(f: &mut fmt::Formatter<'_>, stmts: &[Statement]) -> fmt::Result {
    if stmts.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{ ")?;
    write_joined(f, stmts, " ")?;
    f.write_str(" }")
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntLiteral(lit) => write!(f, "{}", lit.value),
            Expression::BooleanLiteral(lit) => write!(f, "{}", lit.value),
            Expression::StringLiteral(lit) => write!(f, "\"{}\"", lit.value),
            Expression::ArrayLiteral(arr) => {
                f.write_str("[")?;
                write_joined(f, &arr.elements, ", ")?;
                f.write_str("]")
            }
            Expression::HashLiteral(hash) => {
                f.write_str("{")?;
                for (i, (key, value)) in hash.pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Expression::Index(idx) => write!(f, "({}[{}])", idx.base, idx.index),
            Expression::Prefix(prefix) => write!(f, "({}{})", prefix.op, prefix.operand),
            Expression::Infix(infix) => write!(f, "({} {} {})", infix.lhs, infix.op, infix.rhs),
            Expression::If(if_expr) => {
                write!(f, "if ({}) ", if_expr.condition)?;
                write_block(f, &if_expr.consequence)?;
                f.write_str(" else ")?;
                write_block(f, &if_expr.alternative)
            }
            Expression::Function(fun) => {
                f.write_str("fn(")?;
                write_joined(f, &fun.params, ", ")?;
                f.write_str(") ")?;
                write_block(f, &fun.body)
            }
            Expression::Call(call) => {
                write!(f, "{}(", call.callee)?;
                write_joined(f, &call.args, ", ")?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(s) => write!(f, "let {} = {};", s.name, s.value),
            Statement::Return(s) => write!(f, "return {};", s.value),
            Statement::Expression(s) => write!(f, "{}", s.value),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.statements, "\n")
    }
}
