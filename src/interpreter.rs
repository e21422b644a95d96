use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{self, Expression, Statement},
    object::{is_builtin_name, Environment, Function, Object, ObjectType},
};

/// Evaluates a whole program. A `return` at top level ends the program with
/// the returned value; an `Error` ends it with that error.
#[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
pub fn eval(program: &ast::Program, env: &Environment) -> Object {
    let mut result = Object::Null;

    for stmt in &program.statements {
        result = eval_statement(stmt, env);
        match result {
            Object::ReturnValue(value) => return *value,
            Object::Error(_) => return result,
            _ => {}
        }
    }

    result
}

/// Like [`eval`] but leaves a `ReturnValue` wrapped so enclosing blocks stop too.
fn eval_block(stmts: &[Statement], env: &Environment) -> Object {
    let mut result = Object::Null;

    for stmt in stmts {
        result = eval_statement(stmt, env);
        if result.is_abrupt() {
            return result;
        }
    }

    result
}

fn eval_statement(stmt: &Statement, env: &Environment) -> Object {
    match stmt {
        Statement::Let(let_stmt) => eval_let(let_stmt, env),
        Statement::Return(ret) => {
            let value = eval_expr(&ret.value, env);
            if value.is_abrupt() {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Expression(expr_stmt) => eval_expr(&expr_stmt.value, env),
    }
}

fn eval_let(let_stmt: &ast::LetStatement, env: &Environment) -> Object {
    let value = eval_expr(&let_stmt.value, env);

    match value {
        Object::Error(_) | Object::ReturnValue(_) => value,
        Object::Null => Object::Error("Invalid rvalue: null cannot be an rvalue".to_string()),
        value => match env.set(&let_stmt.name.name, value) {
            Ok(()) => Object::Null,
            Err(_) => Object::Error(format!("Cannot use variable name {}", let_stmt.name)),
        },
    }
}

fn eval_expr(expr: &Expression, env: &Environment) -> Object {
    match expr {
        Expression::Identifier(ident) => match env.get(&ident.name) {
            Ok(value) => value,
            Err(err) => Object::Error(err.to_string()),
        },
        Expression::IntLiteral(lit) => Object::Int(lit.value),
        Expression::BooleanLiteral(lit) => Object::Bool(lit.value),
        Expression::StringLiteral(lit) => Object::Str(lit.value.clone()),
        Expression::Prefix(prefix) => eval_prefix(prefix, env),
        Expression::Infix(infix) => eval_infix(infix, env),
        Expression::If(if_expr) => eval_if(if_expr, env),
        Expression::Function(fun_lit) => eval_function_literal(fun_lit, env),
        Expression::Call(call) => eval_call(call, env),
        Expression::ArrayLiteral(_) | Expression::HashLiteral(_) | Expression::Index(_) => {
            Object::Error(format!("Unsupported expression: {}", expr.node_kind()))
        }
    }
}

fn eval_prefix(prefix: &ast::PrefixOperator, env: &Environment) -> Object {
    let operand = eval_expr(&prefix.operand, env);
    if operand.is_abrupt() {
        return operand;
    }

    match (prefix.op.as_str(), operand) {
        ("!", Object::Bool(value)) => Object::Bool(!value),
        ("-", Object::Int(value)) => match value.checked_neg() {
            Some(negated) => Object::Int(negated),
            None => Object::Error("Integer overflow".to_string()),
        },
        // the failure that produced the null has already been reported
        (_, Object::Null) => Object::Null,
        ("!", operand) => Object::type_error(ObjectType::MBool, &operand),
        ("-", operand) => Object::type_error(ObjectType::MInt, &operand),
        (op, _) => Object::Error(format!("Invalid prefix operator: {}", op)),
    }
}

fn eval_infix(infix: &ast::InfixOperator, env: &Environment) -> Object {
    let lhs = eval_expr(&infix.lhs, env);
    if lhs.is_abrupt() {
        return lhs;
    }
    let rhs = eval_expr(&infix.rhs, env);
    if rhs.is_abrupt() {
        return rhs;
    }

    match infix.op.as_str() {
        "+" => eval_int_op(lhs, rhs, i64::checked_add),
        "-" => eval_int_op(lhs, rhs, i64::checked_sub),
        "*" => eval_int_op(lhs, rhs, i64::checked_mul),
        "/" => {
            if let Object::Int(0) = rhs {
                if let Object::Int(_) = lhs {
                    return Object::Error("Division by zero".to_string());
                }
            }
            eval_int_op(lhs, rhs, i64::checked_div)
        }
        "^" => match (lhs, rhs) {
            (Object::Str(left), Object::Str(right)) => Object::Str(left + &right),
            (lhs, rhs) => operand_mismatch(ObjectType::MString, &lhs, &rhs),
        },
        "==" => eval_equality(&lhs, &rhs),
        "!=" => match eval_equality(&lhs, &rhs) {
            Object::Bool(equal) => Object::Bool(!equal),
            other => other,
        },
        "<" => match (lhs, rhs) {
            (Object::Int(left), Object::Int(right)) => Object::Bool(left < right),
            (Object::Str(left), Object::Str(right)) => Object::Bool(left < right),
            _ => Object::Null,
        },
        ">" => match (lhs, rhs) {
            (Object::Int(left), Object::Int(right)) => Object::Bool(left > right),
            (Object::Str(left), Object::Str(right)) => Object::Bool(left > right),
            _ => Object::Null,
        },
        op => Object::Error(format!("Invalid infix operator: {}", op)),
    }
}

fn eval_int_op(lhs: Object, rhs: Object, op: fn(i64, i64) -> Option<i64>) -> Object {
    match (&lhs, &rhs) {
        (Object::Int(left), Object::Int(right)) => match op(*left, *right) {
            Some(value) => Object::Int(value),
            None => Object::Error("Integer overflow".to_string()),
        },
        _ => operand_mismatch(ObjectType::MInt, &lhs, &rhs),
    }
}

/// A wrong-typed operand is reported, left first. A null operand means an
/// earlier failure was already surfaced, so the result is null.
fn operand_mismatch(expected: ObjectType, lhs: &Object, rhs: &Object) -> Object {
    for operand in [lhs, rhs] {
        let actual = operand.object_type();
        if actual != ObjectType::MNull && actual != expected {
            return Object::type_error(expected, operand);
        }
    }

    Object::Null
}

fn eval_equality(lhs: &Object, rhs: &Object) -> Object {
    Object::Bool(lhs == rhs)
}

fn eval_if(if_expr: &ast::IfExpression, env: &Environment) -> Object {
    let condition = eval_expr(&if_expr.condition, env);

    match condition {
        Object::Bool(true) => eval_block(&if_expr.consequence, env),
        Object::Bool(false) => eval_block(&if_expr.alternative, env),
        Object::Null => Object::Null,
        Object::Error(_) | Object::ReturnValue(_) => condition,
        other => Object::type_error(ObjectType::MBool, &other),
    }
}

fn eval_function_literal(fun_lit: &ast::FunctionLiteral, env: &Environment) -> Object {
    if let Some(param) = fun_lit.params.iter().find(|p| is_builtin_name(&p.name)) {
        return Object::Error(format!("Illegal function argument name: {}", param));
    }

    Object::Function(Function {
        params: fun_lit.params.clone(),
        body: Rc::from(fun_lit.body.as_slice()),
        env: env.shallow_copy(),
    })
}

fn eval_call(call: &ast::Call, env: &Environment) -> Object {
    let callee = eval_expr(&call.callee, env);

    match callee {
        Object::Function(fun) => call_function(&fun, &call.args, env),
        Object::Builtin(builtin) => {
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                let value = eval_expr(arg, env);
                if value.is_abrupt() {
                    return value;
                }
                args.push(value);
            }

            debug!(builtin = builtin.name, args = args.len(), "calling builtin");
            builtin.call(&args)
        }
        Object::Error(_) | Object::ReturnValue(_) => callee,
        other => Object::type_error(ObjectType::MFunction, &other),
    }
}

/// Binds arguments into the function's captured scope and runs the body
/// there. The scope is not fresh per call: every call of the same function
/// value writes into the same bindings.
fn call_function(fun: &Function, args: &[Expression], caller_env: &Environment) -> Object {
    if fun.params.len() != args.len() {
        return Object::Error(format!(
            "Incorrect arity in function call: expected {}, found {}",
            fun.params.len(),
            args.len()
        ));
    }

    debug!(arity = fun.params.len(), "calling function");

    for (param, arg) in fun.params.iter().zip(args) {
        let value = eval_expr(arg, caller_env);
        if value.is_abrupt() {
            return value;
        }

        // binding a function into its own captured scope forms an Rc cycle
        if fun.env.set(&param.name, value).is_err() {
            return Object::Error(format!("Illegal function argument name: {}", param));
        }
    }

    // a `return` in the body stays wrapped and ends the caller's block too
    eval_block(&fun.body, &fun.env)
}
