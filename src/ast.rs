use serde_json::Value;

use crate::coerce::Coercion;

pub type Number = f64;

/// One unit of a compiled path, executed left to right.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Root,                              // `$`
    Recurse,                           // `..`
    Member(String),                    // `.name` | `.'name'`
    Wildcard,                          // `.*` | `[*]`
    Index(i64),                        // `[n]`
    Slice(Option<i64>, Option<i64>),   // `[a:b]`
    Union(Vec<Selector>),              // `[n, 'k', ...]`
    Filter(Expr),                      // `[?( expr )]`
    Map(Expr),                         // `[!( expr )]`
    IndexExpr(Expr),                   // `[( expr )]`
    ArrayConstruct(Vec<String>),       // `['a', 'b']`
    ObjectConstruct(Vec<String>),      // `{'a', 'b'}`
    Coerce(Coercion),                  // `<Type>`
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Index(i64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(n) => crate::coerce::number_value(*n).unwrap_or(Value::Null),
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
        }
    }
}

/// Body of a filter, map or index expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Current, // `@`
    Root,    // `$`
    Property(Box<Expr>, String),
    Element(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Method, Vec<Expr>),
    Coerce(Coercion, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    And,
    Or,
}

/// Helpers callable on a value inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    ToLowerCase,
    ToUpperCase,
    Includes,
    IndexOf,
    StartsWith,
    EndsWith,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Method> {
        match name {
            "toLowerCase" => Some(Method::ToLowerCase),
            "toUpperCase" => Some(Method::ToUpperCase),
            "includes" => Some(Method::Includes),
            "indexOf" => Some(Method::IndexOf),
            "startsWith" => Some(Method::StartsWith),
            "endsWith" => Some(Method::EndsWith),
            _ => None,
        }
    }
}
