//! Builders for nodes created by the instrumenter. Everything returned here
//! is tagged [`Origin::Synthesized`].

use crate::parser::ast::*;

const S: Origin = Origin::Synthesized;

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(name.to_string(), S)
}

pub fn undefined() -> Expr {
    ident("undefined")
}

pub fn number(value: f64) -> Expr {
    Expr::Number(value, S)
}

pub fn string(value: &str) -> Expr {
    Expr::String(value.to_string(), S)
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool(value, S)
}

pub fn property(key: &str, value: Expr) -> Property {
    Property::KeyValue {
        key: key.to_string(),
        value,
        shorthand: false,
    }
}

pub fn object(properties: Vec<Property>) -> Expr {
    Expr::Object {
        properties,
        origin: S,
    }
}

pub fn array(elements: Vec<Expr>) -> Expr {
    Expr::Array { elements, origin: S }
}

pub fn member(object: Expr, name: &str) -> Expr {
    Expr::Member {
        object: Box::new(object),
        property: MemberProperty::Named(name.to_string()),
        origin: S,
    }
}

pub fn call(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        arguments,
        origin: S,
    }
}

pub fn spread(argument: Expr) -> Expr {
    Expr::Spread {
        argument: Box::new(argument),
        origin: S,
    }
}

pub fn logical_or(left: Expr, right: Expr) -> Expr {
    Expr::Logical {
        op: LogicalOp::Or,
        left: Box::new(left),
        right: Box::new(right),
        origin: S,
    }
}

pub fn sequence(expressions: Vec<Expr>) -> Expr {
    Expr::Sequence {
        expressions,
        origin: S,
    }
}

/// `name = value`
pub fn assign(name: &str, value: Expr) -> Expr {
    Expr::Assign {
        op: AssignOp::Assign,
        target: Box::new(ident(name)),
        value: Box::new(value),
        origin: S,
    }
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expression { expr, origin: S }
}

pub fn const_decl(name: &str, init: Expr) -> Stmt {
    Stmt::VarDecl {
        kind: VarKind::Const,
        declarators: vec![Declarator {
            name: name.to_string(),
            init: Some(init),
        }],
        origin: S,
    }
}

/// `let name;`
pub fn let_decl(name: &str) -> Stmt {
    Stmt::VarDecl {
        kind: VarKind::Let,
        declarators: vec![Declarator {
            name: name.to_string(),
            init: None,
        }],
        origin: S,
    }
}

pub fn return_stmt(argument: Expr) -> Stmt {
    Stmt::Return {
        argument: Some(argument),
        origin: S,
    }
}

pub fn block(body: Vec<Stmt>) -> Stmt {
    Stmt::Block { body, origin: S }
}

pub fn function(name: Option<&str>, params: Vec<Param>, body: Vec<Stmt>) -> Function {
    Function {
        name: name.map(str::to_string),
        params,
        body: FunctionBody::Block(body),
        is_arrow: false,
        body_origin: S,
        origin: S,
    }
}

pub fn param(name: &str) -> Param {
    Param {
        name: name.to_string(),
        rest: false,
    }
}

pub fn rest_param(name: &str) -> Param {
    Param {
        name: name.to_string(),
        rest: true,
    }
}
