use std::borrow::Cow;

use serde_json::Value;

use crate::maybe::Maybe;
use crate::predicates::{is_object, is_plain_object};

/// Looks up `name` on a value: object members, array elements by numeric
/// key, and `length` of arrays and strings.
pub fn property<'v>(value: &'v Value, name: &str) -> Maybe<Cow<'v, Value>> {
    match value {
        Value::Object(map) => map.get(name).map(Cow::Borrowed).into(),
        Value::Array(items) if name == "length" => {
            Maybe::Present(Cow::Owned(Value::from(items.len())))
        }
        Value::Array(items) => name
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .map(Cow::Borrowed)
            .into(),
        Value::String(s) if name == "length" => {
            Maybe::Present(Cow::Owned(Value::from(s.chars().count())))
        }
        _ => Maybe::Nothing,
    }
}

/// Selects element `index` of an array, or the member named `index` of an
/// object. Negative indices are absent.
pub fn element(value: &Value, index: i64) -> Maybe<Cow<'_, Value>> {
    match value {
        Value::Array(items) => usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .map(Cow::Borrowed)
            .into(),
        _ => property(value, &index.to_string()),
    }
}

/// Own enumerable children in document order.
pub fn children(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        v if is_plain_object(v) => v
            .as_object()
            .map(|map| map.values().collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// The value followed by every array or object below it, in pre-order.
pub fn descendants(value: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    let mut stack = vec![value];
    while let Some(v) = stack.pop() {
        out.push(v);
        let nested = children(v).into_iter().filter(|c| is_object(c));
        let before = stack.len();
        stack.extend(nested);
        stack[before..].reverse();
    }
    out
}

/// Applies a borrowing selector to a match. Results selected out of a derived
/// value are copied so they can outlive it.
pub fn select<'a, F>(value: &Cow<'a, Value>, f: F) -> Maybe<Cow<'a, Value>>
where
    F: for<'v> FnOnce(&'v Value) -> Maybe<Cow<'v, Value>>,
{
    match value {
        Cow::Borrowed(v) => f(*v),
        Cow::Owned(v) => f(v).map(|c| Cow::Owned(c.into_owned())),
    }
}

/// Applies a multi-valued selector to a match, copying out of derived values.
pub fn select_all<'a, F>(value: &Cow<'a, Value>, f: F) -> Vec<Cow<'a, Value>>
where
    F: for<'v> FnOnce(&'v Value) -> Vec<&'v Value>,
{
    match value {
        Cow::Borrowed(v) => f(*v).into_iter().map(Cow::Borrowed).collect(),
        Cow::Owned(v) => f(v).into_iter().cloned().map(Cow::Owned).collect(),
    }
}
