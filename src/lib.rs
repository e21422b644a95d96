//! An interpreter for the Monkey scripting language: a pull-based lexer, a
//! Pratt parser, and a tree-walking evaluator with closures.
//!
//! ```
//! use monkey_lang::{eval, parse, tokenize, Environment, Object};
//!
//! let (program, errors) = parse(&tokenize("let add = fn(a, b) { a + b }; add(2, 3)").tokens());
//! assert!(errors.is_empty());
//! assert_eq!(eval(&program, &Environment::new()), Object::Int(5));
//! ```

pub mod ast;
pub mod common;
pub mod interpreter;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod token;

pub use interpreter::eval;
pub use lexer::{tokenize, Lexer};
pub use object::{Environment, Object, ObjectType};
pub use parser::{parse, Parser};
pub use token::{Token, TokenKind};
