use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use crate::ast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    MInt,
    MBool,
    MString,
    MFunction,
    MNull,
    MReturn,
    MError,
    MBuiltin,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub params: Vec<ast::Identifier>,
    pub body: Rc<[ast::Statement]>,
    /// Snapshot of the defining scope, shared by every copy of this value.
    pub env: Environment,
}

#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub handler: fn(&[Object]) -> Object,
    pub arg_types: &'static [ObjectType],
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("handler", &"<function pointer>".to_string())
            .field("arg_types", &self.arg_types)
            .finish()
    }
}

impl Builtin {
    pub fn arity(&self) -> usize {
        self.arg_types.len()
    }

    /// Checks arity and declared argument types before running the handler.
    pub fn call(&self, args: &[Object]) -> Object {
        if args.len() != self.arity() {
            return Object::Error(format!(
                "Incorrect arity in function call: expected {}, found {}",
                self.arity(),
                args.len()
            ));
        }

        for (arg, expected) in args.iter().zip(self.arg_types) {
            if arg.object_type() != *expected {
                return Object::type_error(*expected, arg);
            }
        }

        (self.handler)(args)
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Int(i64),
    Bool(bool),
    Str(String),
    Null,

    ReturnValue(Box<Object>),
    Error(String),
    Function(Function),
    Builtin(Builtin),
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Int(_) => ObjectType::MInt,
            Object::Bool(_) => ObjectType::MBool,
            Object::Str(_) => ObjectType::MString,
            Object::Null => ObjectType::MNull,
            Object::ReturnValue(_) => ObjectType::MReturn,
            Object::Error(_) => ObjectType::MError,
            Object::Function(_) => ObjectType::MFunction,
            Object::Builtin(_) => ObjectType::MBuiltin,
        }
    }

    pub fn type_error(expected: ObjectType, got: &Object) -> Object {
        Object::Error(format!(
            "Type error: expected {}, got {}",
            expected,
            got.object_type()
        ))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Errors and return wrappers stop evaluation of whatever contains them.
    pub fn is_abrupt(&self) -> bool {
        matches!(self, Object::Error(_) | Object::ReturnValue(_))
    }

    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => left == right,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Str(left), Self::Str(right)) => left == right,
            (Self::Null, Self::Null) => true,
            (Self::ReturnValue(left), Self::ReturnValue(right)) => left == right,
            (Self::Error(left), Self::Error(right)) => left == right,
            // functions are never equal
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Int(value) => write!(f, "{}", value),
            Object::Bool(value) => write!(f, "{}", value),
            Object::Str(value) => write!(f, "\"{}\"", value),
            Object::Null => f.write_str("null"),
            Object::ReturnValue(inner) => write!(f, "return {}", inner),
            Object::Error(message) => f.write_str(message),
            Object::Function(fun) => write!(f, "fn/{}", fun.params.len()),
            Object::Builtin(_) => f.write_str("Builtin Operation"),
        }
    }
}

// len(s: MString) -> MInt, counted in grapheme clusters rather than code points
fn builtin_len(args: &[Object]) -> Object {
    match &args[0] {
        Object::Str(string) => Object::Int(string.graphemes(true).count() as i64),
        other => Object::type_error(ObjectType::MString, other),
    }
}

const BUILTINS: &[Builtin] = &[Builtin {
    name: "len",
    handler: builtin_len,
    arg_types: &[ObjectType::MString],
}];

pub fn is_builtin_name(name: &str) -> bool {
    BUILTINS.iter().any(|builtin| builtin.name == name)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvironmentError {
    #[error("Identifier {0} is undefined")]
    Undefined(String),
    #[error("{0} is a reserved built-in name")]
    Reserved(String),
}

/// A name to object store. Cloning the handle aliases the same bindings;
/// [`Environment::shallow_copy`] takes an independent snapshot.
#[derive(Clone)]
pub struct Environment {
    store: Rc<RefCell<HashMap<String, Object>>>,
}

impl Environment {
    pub fn new() -> Self {
        let store = BUILTINS
            .iter()
            .map(|builtin| (builtin.name.to_string(), Object::Builtin(builtin.clone())))
            .collect();

        Environment {
            store: Rc::new(RefCell::new(store)),
        }
    }

    pub fn get(&self, name: &str) -> Result<Object, EnvironmentError> {
        self.store
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| EnvironmentError::Undefined(name.to_string()))
    }

    pub fn set(&self, name: &str, value: Object) -> Result<(), EnvironmentError> {
        if is_builtin_name(name) {
            return Err(EnvironmentError::Reserved(name.to_string()));
        }

        self.store.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.borrow().contains_key(name)
    }

    pub fn shallow_copy(&self) -> Self {
        Environment {
            store: Rc::new(RefCell::new(self.store.borrow().clone())),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// A function may end up bound inside its own captured scope, so printing the
// bindings themselves could recurse forever.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.borrow();
        let mut names = store.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("Environment").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_environment_seeds_builtins() {
        let env = Environment::new();
        assert!(matches!(env.get("len"), Ok(Object::Builtin(_))));
    }

    #[test]
    fn get_undefined_fails() {
        let env = Environment::new();
        assert_eq!(
            env.get("x"),
            Err(EnvironmentError::Undefined("x".to_string()))
        );
    }

    #[test]
    fn builtin_names_cannot_be_bound() {
        let env = Environment::new();
        assert_eq!(
            env.set("len", Object::Int(1)),
            Err(EnvironmentError::Reserved("len".to_string()))
        );
        assert!(matches!(env.get("len"), Ok(Object::Builtin(_))));
    }

    #[test]
    fn set_overwrites() {
        let env = Environment::new();
        env.set("x", Object::Int(1)).unwrap();
        env.set("x", Object::Int(2)).unwrap();
        assert_eq!(env.get("x"), Ok(Object::Int(2)));
    }

    #[test]
    fn shallow_copy_is_a_snapshot() {
        let env = Environment::new();
        env.set("y", Object::Int(4)).unwrap();

        let copy = env.shallow_copy();
        env.set("y", Object::Int(7)).unwrap();
        copy.set("z", Object::Int(1)).unwrap();

        assert_eq!(copy.get("y"), Ok(Object::Int(4)));
        assert!(!env.contains("z"));
    }

    #[test]
    fn cloned_handle_aliases_store() {
        let env = Environment::new();
        let alias = env.clone();
        alias.set("x", Object::Int(3)).unwrap();
        assert_eq!(env.get("x"), Ok(Object::Int(3)));
    }

    #[test]
    fn len_counts_graphemes() {
        let len = match Environment::new().get("len") {
            Ok(Object::Builtin(builtin)) => builtin,
            other => panic!("expected builtin, got {:?}", other),
        };
        assert_eq!(len.call(&[Object::Str("hello".into())]), Object::Int(5));
        assert_eq!(len.call(&[Object::Str("e\u{301}".into())]), Object::Int(1));
        assert_eq!(
            len.call(&[Object::Int(5)]),
            Object::Error("Type error: expected MString, got MInt".into())
        );
        assert_eq!(
            len.call(&[]),
            Object::Error("Incorrect arity in function call: expected 1, found 0".into())
        );
    }

    #[test]
    fn inspect_forms() {
        assert_eq!(Object::Int(-3).inspect(), "-3");
        assert_eq!(Object::Bool(true).inspect(), "true");
        assert_eq!(Object::Str("hi".into()).inspect(), "\"hi\"");
        assert_eq!(Object::Null.inspect(), "null");
        assert_eq!(
            Object::ReturnValue(Box::new(Object::Int(1))).inspect(),
            "return 1"
        );
        assert_eq!(Object::Error("boom".into()).inspect(), "boom");
    }
}
