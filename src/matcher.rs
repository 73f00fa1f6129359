use std::borrow::Cow;

use log::trace;
use serde_json::{Map, Value};

use crate::access::{children, descendants, element, property, select, select_all};
use crate::ast::{Selector, Step};
use crate::expr::{as_index, evaluate, truthy};
use crate::maybe::Maybe;

/// How the final match set is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Only dot steps so far: the first match, or `null`.
    Single,
    /// A step fanned out: every match as an array.
    Sequence,
    /// Last fan-in built new values: unwrapped when there is exactly one.
    Constructed,
}

type Matches<'a> = Vec<Cow<'a, Value>>;

/// Executes `steps` against `root`.
///
/// Never fails: selectors that find nothing leave an empty match set.
pub fn execute(steps: &[Step], root: &Value) -> Value {
    let mut matches: Matches = Vec::new();
    let mut shape = Shape::Single;
    for step in steps {
        let (next, reshaped) = apply(step, matches, root);
        matches = next;
        if let Some(s) = reshaped {
            shape = s;
        }
        trace!("{:?} -> {} match(es)", step, matches.len());
    }

    match shape {
        Shape::Sequence => Value::Array(matches.into_iter().map(Cow::into_owned).collect()),
        Shape::Constructed if matches.len() != 1 => {
            Value::Array(matches.into_iter().map(Cow::into_owned).collect())
        }
        _ => matches.into_iter().next().map_or(Value::Null, Cow::into_owned),
    }
}

fn apply<'a>(step: &Step, matches: Matches<'a>, root: &'a Value) -> (Matches<'a>, Option<Shape>) {
    match step {
        Step::Root => (vec![Cow::Borrowed(root)], Some(Shape::Single)),
        Step::Member(name) => {
            let found = matches
                .iter()
                .filter_map(|m| select(m, |v| property(v, name)).into_option())
                .collect();
            (found, None)
        }
        Step::Wildcard => {
            let found = matches.iter().flat_map(|m| select_all(m, children)).collect();
            (found, Some(Shape::Sequence))
        }
        Step::Recurse => {
            let found = matches.iter().flat_map(|m| select_all(m, descendants)).collect();
            (found, Some(Shape::Sequence))
        }
        Step::Index(i) => {
            let found = matches
                .iter()
                .filter_map(|m| select(m, |v| element(v, *i)).into_option())
                .collect();
            (found, Some(Shape::Sequence))
        }
        Step::Slice(start, end) => {
            let found = matches
                .iter()
                .flat_map(|m| select_all(m, |v| slice(v, *start, *end)))
                .collect();
            (found, Some(Shape::Sequence))
        }
        Step::Union(selectors) => {
            let found = selectors
                .iter()
                .flat_map(|s| matches.iter().filter_map(move |m| pick(m, s).into_option()))
                .collect();
            (found, Some(Shape::Sequence))
        }
        Step::Filter(expr) => {
            let found = matches
                .into_iter()
                .flat_map(candidates)
                .filter(|c| truthy(&evaluate(expr, c, root)))
                .collect();
            (found, Some(Shape::Sequence))
        }
        Step::Map(expr) => {
            let spread = matches.iter().any(|m| m.is_array());
            let mapped = matches
                .into_iter()
                .flat_map(candidates)
                .map(|c| {
                    let value = evaluate(expr, &c, root).map(Cow::into_owned);
                    Cow::Owned(value.unwrap_or(Value::Null))
                })
                .collect();
            (mapped, spread.then_some(Shape::Sequence))
        }
        Step::IndexExpr(expr) => {
            let found = matches
                .iter()
                .filter_map(|m| {
                    let i = as_index(evaluate(expr, m, root))?;
                    select(m, |v| element(v, i)).into_option()
                })
                .collect();
            (found, Some(Shape::Sequence))
        }
        Step::ArrayConstruct(keys) => {
            let built = matches
                .iter()
                .filter(|m| has_any(m, keys))
                .map(|m| {
                    let row = keys
                        .iter()
                        .map(|k| property(m, k).map(Cow::into_owned).unwrap_or(Value::Null))
                        .collect();
                    Cow::Owned(Value::Array(row))
                })
                .collect();
            (built, Some(Shape::Constructed))
        }
        Step::ObjectConstruct(keys) => {
            let built = matches
                .iter()
                .filter(|m| has_any(m, keys))
                .map(|m| {
                    let object: Map<String, Value> = keys
                        .iter()
                        .filter_map(|k| {
                            let v = property(m, k).into_option()?;
                            Some((k.clone(), v.into_owned()))
                        })
                        .collect();
                    Cow::Owned(Value::Object(object))
                })
                .collect();
            (built, Some(Shape::Constructed))
        }
        Step::Coerce(coercion) => {
            let converted = matches.iter().map(|m| Cow::Owned(coercion.apply(m))).collect();
            (converted, None)
        }
    }
}

/// Filters and maps look inside arrays; anything else is tested whole.
fn candidates(m: Cow<'_, Value>) -> Matches<'_> {
    if m.is_array() {
        select_all(&m, children)
    } else {
        vec![m]
    }
}

/// Constructs skip matches carrying none of the requested keys.
fn has_any(m: &Value, keys: &[String]) -> bool {
    keys.iter().any(|k| property(m, k).is_present())
}

fn pick<'a>(m: &Cow<'a, Value>, selector: &Selector) -> Maybe<Cow<'a, Value>> {
    match selector {
        Selector::Index(i) => select(m, |v| element(v, *i)),
        Selector::Name(name) => select(m, |v| property(v, name)),
    }
}

/// Elements `start..end` of an array, with negative bounds counted from the
/// end and both bounds clamped to the array.
fn slice(value: &Value, start: Option<i64>, end: Option<i64>) -> Vec<&Value> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Vec::new(),
    };
    let len = items.len() as i64;
    let bound = |b: i64| {
        let b = if b < 0 { len + b } else { b };
        b.clamp(0, len) as usize
    };
    let from = start.map_or(0, bound);
    let to = end.map_or(items.len(), bound);
    if from >= to {
        return Vec::new();
    }
    items[from..to].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use serde_json::json;

    fn run(path: &str, data: &Value) -> Value {
        let tokens = tokenize(path).unwrap();
        let steps = parse(&tokens).unwrap();
        execute(&steps, data)
    }

    #[test]
    fn dot_chains_yield_one_value() {
        let data = json!({ "a": { "b": [1, 2] } });
        assert_eq!(json!([1, 2]), run("$.a.b", &data));
        assert_eq!(Value::Null, run("$.a.missing", &data));
        assert_eq!(Value::Null, run("$.a.b.c.d", &data));
        assert_eq!(data, run("$", &data));
    }

    #[test]
    fn fan_out_yields_arrays() {
        let data = json!({ "a": [10, 20, 30], "o": { "x": 1, "y": 2 } });
        assert_eq!(json!([20]), run("$.a[1]", &data));
        assert_eq!(json!([]), run("$.a[7]", &data));
        assert_eq!(json!([]), run("$.a[-1]", &data));
        assert_eq!(json!([10, 20, 30]), run("$.a[*]", &data));
        assert_eq!(json!([1, 2]), run("$.o.*", &data));
    }

    #[test]
    fn slices() {
        let data = json!([0, 1, 2, 3, 4]);
        assert_eq!(json!([1, 2, 3]), run("$[1:4]", &data));
        assert_eq!(json!([3, 4]), run("$[-2:]", &data));
        assert_eq!(json!([0, 1]), run("$[:2]", &data));
        assert_eq!(json!([0, 1, 2, 3]), run("$[:-1]", &data));
        assert_eq!(json!([]), run("$[3:1]", &data));
        assert_eq!(json!([2, 3, 4]), run("$[2:99]", &data));
    }

    #[test]
    fn unions_are_selector_major() {
        let data = json!([[1, 2], [3, 4]]);
        assert_eq!(json!([1, 3, 2, 4]), run("$[*][0, 1]", &data));
        assert_eq!(json!([[1, 2]]), run("$[0, 5]", &data));
        assert_eq!(
            json!(["zero", "ex"]),
            run("$[0, 'x']", &json!({ "0": "zero", "x": "ex" }))
        );
    }

    #[test]
    fn filters_iterate_arrays() {
        let data = json!({
            "items": [{ "p": 5 }, { "p": 15 }, { "p": 25 }],
            "single": { "p": 30 }
        });
        assert_eq!(json!([{ "p": 15 }, { "p": 25 }]), run("$.items[?(@.p > 10)]", &data));
        assert_eq!(json!([{ "p": 30 }]), run("$.single[?(@.p > 10)]", &data));
        assert_eq!(json!([]), run("$.single[?(@.p > 99)]", &data));
        assert_eq!(json!([15, 25]), run("$.items[?(@.p > 10)].p", &data));
    }

    #[test]
    fn maps() {
        let data = json!({ "items": [{ "p": 5 }, { "q": 1 }, { "p": 25 }], "one": { "p": 2 } });
        assert_eq!(json!([10, null, 50]), run("$.items[!(@.p * 2)]", &data));
        assert_eq!(json!(4), run("$.one[!(@.p * 2)]", &data));
        assert_eq!(Value::Null, run("$.one[!(@.q)]", &data));
    }

    #[test]
    fn maps_keep_one_result_per_element() {
        let data = json!({ "items": [{ "t": "a" }, { "x": 1 }, { "t": "c" }] });
        assert_eq!(json!(["a", null, "c"]), run("$.items[!(@.t)]", &data));
        assert_eq!(json!([null, null, null]), run("$.items[!(Number(@.t))]", &data));
        assert_eq!(json!([null, null]), run("$.items[*].t<Number>", &data));
    }

    #[test]
    fn index_expressions() {
        let data = json!({ "a": ["x", "y", "z"] });
        assert_eq!(json!(["z"]), run("$.a[(@.length-1)]", &data));
        assert_eq!(json!([]), run("$.a[(@.length)]", &data));
    }

    #[test]
    fn recursion_descends_structurally() {
        let data = json!({ "a": { "b": { "c": 1 } }, "d": [{ "c": 2 }] });
        assert_eq!(json!([1, 2]), run("$..c", &data));
        assert_eq!(json!([2]), run("$.d..c", &data));
        assert_eq!(json!([{ "c": 1 }, 1]), run("$.a..*", &data));
    }

    #[test]
    fn constructs() {
        let data = json!({
            "bike": { "color": "red", "price": 19.95 },
            "cars": [{ "make": "a" }, { "make": "b", "year": 1999 }]
        });
        assert_eq!(json!(["red"]), run("$.bike['color']", &data));
        assert_eq!(json!(["red", 19.95]), run("$.bike['color', 'price']", &data));
        assert_eq!(json!({ "color": "red" }), run("$.bike{'color'}", &data));
        assert_eq!(json!([]), run("$.bike{'wheels'}", &data));
        assert_eq!(json!([]), run("$.bike['wheels']", &data));
        assert_eq!(
            json!([["a", null], ["b", 1999]]),
            run("$.cars[*]['make', 'year']", &data)
        );
        assert_eq!(
            json!([{ "make": "a" }, { "make": "b", "year": 1999 }]),
            run("$.cars[*]{'make', 'year'}", &data)
        );
    }

    #[test]
    fn constructs_skip_nodes_without_keys() {
        let data = json!({ "store": { "book": [{ "t": "a" }], "bicycle": { "color": "red" } } });
        assert_eq!(json!(["red"]), run("$..['color']", &data));
        assert_eq!(json!({ "color": "red" }), run("$..{'color'}", &data));
        assert_eq!(
            json!([["a", null], [null, "red"]]),
            run("$..['t', 'color']", &data)
        );
    }

    #[test]
    fn coercions() {
        let data = json!({ "n": "10.25", "items": ["1", "2.5"] });
        assert_eq!(json!(10.25), run("$.n<float>", &data));
        assert_eq!(json!(10), run("$.n<int>", &data));
        assert_eq!(json!([1, 2.5]), run("$.items[*]<Number>", &data));
        assert_eq!(Value::Null, run("$.items<Number>", &data));
        assert_eq!(json!("1,2.5"), run("$.items<String>", &data));
    }

    #[test]
    fn derived_values_keep_flowing() {
        let data = json!({ "rows": [{ "v": "3" }, { "v": "4" }] });
        assert_eq!(json!([3, 4]), run("$.rows[*].v<int>", &data));
        assert_eq!(json!(["a"]), run("${'k'}.k[0]", &json!({ "k": ["a"] })));
    }
}
