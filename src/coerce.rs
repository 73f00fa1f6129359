use nom::branch::alt;
use nom::character::complete::{char, digit0, digit1, one_of};
use nom::combinator::{all_consuming, opt, recognize};
use nom::sequence::{pair, tuple};
use nom::IResult;
use serde_json::Value;

use crate::maybe::Maybe;

/// Target of a `<Type>` suffix or a conversion call inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    String, // `String`
    Number, // `Number`
    Float,  // `float`
    Int,    // `int`
}

impl Coercion {
    pub fn from_name(name: &str) -> Option<Coercion> {
        match name {
            "String" => Some(Coercion::String),
            "Number" => Some(Coercion::Number),
            "float" => Some(Coercion::Float),
            "int" => Some(Coercion::Int),
            _ => None,
        }
    }

    /// Converts `value`. `Nothing` stands for a result that is not a number.
    pub fn convert(self, value: &Value) -> Maybe<Value> {
        match self {
            Coercion::String => Maybe::Present(Value::String(to_text(value))),
            Coercion::Number => to_number(value).bind(number_value),
            Coercion::Float => parse_float(value).bind(number_value),
            Coercion::Int => parse_float(value).map(f64::trunc).bind(number_value),
        }
    }

    /// Like [`Coercion::convert`], rendering not-a-number as `null`.
    pub fn apply(self, value: &Value) -> Value {
        self.convert(value).unwrap_or(Value::Null)
    }
}

/// Builds a JSON number, storing integral values as integers.
pub fn number_value(n: f64) -> Maybe<Value> {
    if !n.is_finite() {
        return Maybe::Nothing;
    }
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Maybe::Present(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number).into()
}

fn float_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// Strict numeric view: the whole string must be a number.
pub fn to_number(value: &Value) -> Maybe<f64> {
    match value {
        Value::Null => Maybe::Present(0.0),
        Value::Bool(b) => Maybe::Present(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().into(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Maybe::Present(0.0);
            }
            match all_consuming(float_literal)(s) {
                Ok((_, text)) => text.parse::<f64>().ok().into(),
                Err(_) => Maybe::Nothing,
            }
        }
        Value::Array(_) | Value::Object(_) => Maybe::Nothing,
    }
}

/// Lenient numeric view: the longest numeric prefix of a string.
fn parse_float(value: &Value) -> Maybe<f64> {
    match value {
        Value::Number(n) => n.as_f64().into(),
        Value::String(s) => match float_literal(s.trim_start()) {
            Ok((_, text)) => text.parse::<f64>().ok().into(),
            Err(_) => Maybe::Nothing,
        },
        _ => Maybe::Nothing,
    }
}

/// Shortest round-trip digits, switching to exponent form outside
/// `[1e-6, 1e21)`.
fn float_text(f: f64) -> String {
    let abs = f.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let text = format!("{:e}", f);
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        };
    }
    if f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

/// Text form used by `String` and by `+` concatenation. Arrays join their
/// elements with `,` (`null` as empty); objects are opaque.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), float_text),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                _ => to_text(item),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
