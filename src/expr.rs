use std::borrow::Cow;
use std::cmp::Ordering;
use std::mem::discriminant;

use serde_json::Value;

use crate::access::{element, property, select};
use crate::ast::{BinaryOp, Expr, Method, UnaryOp};
use crate::coerce::{is_truthy, number_value, to_number, to_text};
use crate::maybe::Maybe;

/// Result of evaluating an expression; `Nothing` is both "absent" and
/// "not a number".
pub type Outcome<'s> = Maybe<Cow<'s, Value>>;

/// Evaluates `expr` with `@` bound to `current` and `$` to `root`.
///
/// Never fails: an absent property, a non-numeric operand or an unparseable
/// conversion evaluates to [`Maybe::Nothing`].
pub fn evaluate<'s>(expr: &Expr, current: &'s Value, root: &'s Value) -> Outcome<'s> {
    match expr {
        Expr::Literal(lit) => Maybe::Present(Cow::Owned(lit.to_value())),
        Expr::Current => Maybe::Present(Cow::Borrowed(current)),
        Expr::Root => Maybe::Present(Cow::Borrowed(root)),
        Expr::Property(target, name) => {
            evaluate(target, current, root).bind(|v| select(&v, |v| property(v, name)))
        }
        Expr::Element(target, index) => {
            let index = evaluate(index, current, root);
            evaluate(target, current, root).bind(|v| match index {
                Maybe::Present(key) => lookup(&v, &key),
                Maybe::Nothing => Maybe::Nothing,
            })
        }
        Expr::Call(target, method, args) => {
            let args: Vec<Outcome> = args.iter().map(|a| evaluate(a, current, root)).collect();
            evaluate(target, current, root)
                .bind(|v| call(*method, &v, &args))
                .map(Cow::Owned)
        }
        Expr::Coerce(coercion, arg) => evaluate(arg, current, root)
            .bind(|v| coercion.convert(&v))
            .map(Cow::Owned),
        Expr::Unary(UnaryOp::Neg, operand) => evaluate(operand, current, root)
            .bind(|v| to_number(&v))
            .bind(|n| number_value(-n))
            .map(Cow::Owned),
        Expr::Unary(UnaryOp::Not, operand) => boolean(!truthy(&evaluate(operand, current, root))),
        Expr::Binary(op, lhs, rhs) => binary(*op, lhs, rhs, current, root),
    }
}

/// Truthiness of an outcome; absent is false.
pub fn truthy(outcome: &Outcome) -> bool {
    match outcome {
        Maybe::Present(v) => is_truthy(v),
        Maybe::Nothing => false,
    }
}

/// Reads an outcome as an element index.
pub fn as_index(outcome: Outcome) -> Option<i64> {
    match &*outcome.into_option()? {
        Value::Number(n) => n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64),
        _ => None,
    }
}

fn boolean<'s>(b: bool) -> Outcome<'s> {
    Maybe::Present(Cow::Owned(Value::Bool(b)))
}

fn lookup<'s>(target: &Cow<'s, Value>, key: &Value) -> Outcome<'s> {
    match key {
        Value::String(name) => select(target, |v| property(v, name)),
        Value::Number(_) => match as_index(Maybe::Present(Cow::Borrowed(key))) {
            Some(i) => select(target, |v| element(v, i)),
            None => Maybe::Nothing,
        },
        _ => Maybe::Nothing,
    }
}

fn call(method: Method, target: &Value, args: &[Outcome]) -> Maybe<Value> {
    let arg = match args.first() {
        Some(Maybe::Present(a)) => Some(&**a),
        _ => None,
    };
    let needle = arg.and_then(Value::as_str);
    let found = match (method, target) {
        (Method::ToLowerCase, Value::String(s)) => Some(Value::String(s.to_lowercase())),
        (Method::ToUpperCase, Value::String(s)) => Some(Value::String(s.to_uppercase())),
        (Method::Includes, Value::String(s)) => needle.map(|n| Value::Bool(s.contains(n))),
        (Method::Includes, Value::Array(items)) => {
            arg.map(|a| Value::Bool(items.iter().any(|item| strict_eq(item, a))))
        }
        (Method::IndexOf, Value::String(s)) => needle.map(|n| {
            let at = s.find(n).map_or(-1, |b| s[..b].chars().count() as i64);
            Value::from(at)
        }),
        (Method::IndexOf, Value::Array(items)) => arg.map(|a| {
            let at = items.iter().position(|item| strict_eq(item, a));
            Value::from(at.map_or(-1, |i| i as i64))
        }),
        (Method::StartsWith, Value::String(s)) => needle.map(|n| Value::Bool(s.starts_with(n))),
        (Method::EndsWith, Value::String(s)) => needle.map(|n| Value::Bool(s.ends_with(n))),
        _ => None,
    };
    found.into()
}

fn binary<'s>(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    current: &'s Value,
    root: &'s Value,
) -> Outcome<'s> {
    let eval = |e: &Expr| evaluate(e, current, root);
    match op {
        BinaryOp::And => boolean(truthy(&eval(lhs)) && truthy(&eval(rhs))),
        BinaryOp::Or => boolean(truthy(&eval(lhs)) || truthy(&eval(rhs))),
        BinaryOp::Add => add(eval(lhs), eval(rhs)),
        BinaryOp::Sub => numeric(eval(lhs), eval(rhs), |a, b| a - b),
        BinaryOp::Mul => numeric(eval(lhs), eval(rhs), |a, b| a * b),
        BinaryOp::Div => numeric(eval(lhs), eval(rhs), |a, b| a / b),
        BinaryOp::Equal => boolean(compare(eval(lhs), eval(rhs), loose_eq)),
        BinaryOp::StrictEqual => boolean(compare(eval(lhs), eval(rhs), strict_eq)),
        BinaryOp::NotEqual => boolean(!compare(eval(lhs), eval(rhs), loose_eq)),
        BinaryOp::StrictNotEqual => boolean(!compare(eval(lhs), eval(rhs), strict_eq)),
        BinaryOp::GreaterThan => boolean(compare(eval(lhs), eval(rhs), |a, b| {
            relate(a, b) == Some(Ordering::Greater)
        })),
        BinaryOp::LessThan => boolean(compare(eval(lhs), eval(rhs), |a, b| {
            relate(a, b) == Some(Ordering::Less)
        })),
        BinaryOp::GreaterEqual => boolean(compare(eval(lhs), eval(rhs), |a, b| {
            matches!(relate(a, b), Some(Ordering::Greater | Ordering::Equal))
        })),
        BinaryOp::LessEqual => boolean(compare(eval(lhs), eval(rhs), |a, b| {
            matches!(relate(a, b), Some(Ordering::Less | Ordering::Equal))
        })),
    }
}

fn add<'s>(lhs: Outcome<'s>, rhs: Outcome<'s>) -> Outcome<'s> {
    match (lhs, rhs) {
        (Maybe::Present(l), Maybe::Present(r)) if l.is_string() || r.is_string() => {
            Maybe::Present(Cow::Owned(Value::String(to_text(&l) + &to_text(&r))))
        }
        (l, r) => numeric(l, r, |a, b| a + b),
    }
}

fn numeric<'s, F>(lhs: Outcome<'s>, rhs: Outcome<'s>, f: F) -> Outcome<'s>
where
    F: FnOnce(f64, f64) -> f64,
{
    match (lhs, rhs) {
        (Maybe::Present(l), Maybe::Present(r)) => to_number(&l)
            .bind(|a| to_number(&r).map(|b| f(a, b)))
            .bind(number_value)
            .map(Cow::Owned),
        _ => Maybe::Nothing,
    }
}

fn compare<F>(lhs: Outcome, rhs: Outcome, f: F) -> bool
where
    F: FnOnce(&Value, &Value) -> bool,
{
    match (lhs, rhs) {
        (Maybe::Present(l), Maybe::Present(r)) => f(&*l, &*r),
        _ => false,
    }
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ if discriminant(a) == discriminant(b) => strict_eq(a, b),
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        _ => match (to_number(a), to_number(b)) {
            (Maybe::Present(x), Maybe::Present(y)) => x == y,
            _ => false,
        },
    }
}

/// Strings order lexicographically, everything else numerically.
fn relate(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (to_number(a), to_number(b)) {
            (Maybe::Present(x), Maybe::Present(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::expression;
    use crate::token::Tokens;
    use serde_json::json;

    fn eval(source: &str, current: &Value) -> Maybe<Value> {
        eval_in(source, current, current)
    }

    fn eval_in(source: &str, current: &Value, root: &Value) -> Maybe<Value> {
        let tokens = tokenize(source).unwrap();
        let (_, expr) = expression(Tokens::new(&tokens)).unwrap();
        evaluate(&expr, current, root).map(Cow::into_owned)
    }

    #[test]
    fn property_chains() {
        let book = json!({ "title": "Moby Dick", "meta": { "pages": 635 } });
        assert_eq!(Maybe::Present(json!(635)), eval("@.meta.pages", &book));
        assert_eq!(Maybe::Nothing, eval("@.meta.missing.deeper", &book));
        assert_eq!(Maybe::Present(json!(9)), eval("@.title.length", &book));
        assert_eq!(Maybe::Present(json!("Moby Dick")), eval("@['title']", &book));
    }

    #[test]
    fn root_reference() {
        let root = json!({ "limit": 10, "items": [] });
        let item = json!({ "price": 12 });
        assert_eq!(
            Maybe::Present(json!(true)),
            eval_in("@.price > $.limit", &item, &root)
        );
    }

    #[test]
    fn arithmetic() {
        let books = json!([1, 2, 3, 4]);
        assert_eq!(Maybe::Present(json!(3)), eval("@.length-1", &books));
        assert_eq!(Maybe::Present(json!(7)), eval("1 + 2 * 3", &books));
        assert_eq!(Maybe::Present(json!(2.5)), eval("(1 + 4) / 2", &books));
        assert_eq!(Maybe::Present(json!(-4)), eval("-@.length", &books));
        assert_eq!(Maybe::Present(json!("a1")), eval("'a' + 1", &books));
        assert_eq!(Maybe::Nothing, eval("@.missing + 1", &books));
        assert_eq!(Maybe::Nothing, eval("1 / 0", &books));
        assert_eq!(Maybe::Present(json!(3)), eval("@[@.length-2]", &books));
    }

    #[test]
    fn comparisons() {
        let item = json!({ "n": 5, "name": "abc", "none": null });
        assert_eq!(Maybe::Present(json!(true)), eval("@.n == '5'", &item));
        assert_eq!(Maybe::Present(json!(false)), eval("@.n === '5'", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("@.n === 5.0", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("@.n !== '5'", &item));
        assert_eq!(Maybe::Present(json!(false)), eval("@.name > 3", &item));
        assert_eq!(Maybe::Present(json!(false)), eval("@.name <= 3", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("@.name != 3", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("@.name < 'abd'", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("@.none == null", &item));
        assert_eq!(Maybe::Present(json!(false)), eval("@.missing == null", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("@.n >= 5", &item));
    }

    #[test]
    fn logic() {
        let item = json!({ "a": 1, "b": 0, "c": "" });
        assert_eq!(Maybe::Present(json!(false)), eval("@.a && @.b", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("@.b || @.a", &item));
        assert_eq!(Maybe::Present(json!(true)), eval("!@.c", &item));
        assert_eq!(Maybe::Present(json!(false)), eval("!(@.a)", &item));
    }

    #[test]
    fn string_helpers() {
        let book = json!({ "title": "Sword of Honour", "tags": ["war", "novel"] });
        assert_eq!(
            Maybe::Present(json!(true)),
            eval("@.title.toLowerCase().includes('sword')", &book)
        );
        assert_eq!(
            Maybe::Present(json!("SWORD OF HONOUR")),
            eval("@.title.toUpperCase()", &book)
        );
        assert_eq!(Maybe::Present(json!(true)), eval("@.title.startsWith('Sw')", &book));
        assert_eq!(Maybe::Present(json!(false)), eval("@.title.endsWith('Sw')", &book));
        assert_eq!(Maybe::Present(json!(6)), eval("@.title.indexOf('of')", &book));
        assert_eq!(Maybe::Present(json!(-1)), eval("@.title.indexOf('zz')", &book));
        assert_eq!(Maybe::Present(json!(1)), eval("@.tags.indexOf('novel')", &book));
        assert_eq!(Maybe::Present(json!(true)), eval("@.tags.includes('war')", &book));
        assert_eq!(Maybe::Nothing, eval("@.missing.toLowerCase()", &book));
        assert_eq!(Maybe::Nothing, eval("@.tags.toLowerCase()", &book));
    }

    #[test]
    fn conversions() {
        let item = json!({ "qty": "10.9", "n": 5 });
        assert_eq!(Maybe::Present(json!(10)), eval("int(@.qty)", &item));
        assert_eq!(Maybe::Present(json!(10.9)), eval("float(@.qty)", &item));
        assert_eq!(Maybe::Present(json!("5")), eval("String(@.n)", &item));
        assert_eq!(Maybe::Present(json!(11)), eval("Number('10') + 1", &item));
        assert_eq!(Maybe::Nothing, eval("Number('ten')", &item));
    }

    #[test]
    fn element_index() {
        assert_eq!(Some(3), as_index(Maybe::Present(Cow::Owned(json!(3)))));
        assert_eq!(None, as_index(Maybe::Present(Cow::Owned(json!(2.5)))));
        assert_eq!(None, as_index(Maybe::Present(Cow::Owned(json!("1")))));
        assert_eq!(None, as_index(Maybe::Nothing));
    }
}
