use jsonq::{PathError, QueryCache, TokenKind, Value};
use serde_json::json;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn store() -> Value {
    json!({
        "store": {
            "book": [
                {
                    "category": "reference",
                    "author": "Nigel Rees",
                    "title": "Sayings of the Century",
                    "price": 8.95
                },
                {
                    "category": "fiction",
                    "author": "Evelyn Waugh",
                    "title": "Sword of Honour",
                    "price": 12.99
                },
                {
                    "category": "fiction",
                    "author": "Herman Melville",
                    "title": "Moby Dick",
                    "isbn": "0-553-21311-3",
                    "price": 8.99
                },
                {
                    "category": "fiction",
                    "author": "J. R. R. Tolkien",
                    "title": "The Lord of the Rings",
                    "isbn": "0-395-19395-8",
                    "price": 22.99
                }
            ],
            "bicycle": {
                "color": "red",
                "price": 19.95
            }
        }
    })
}

fn query(path: &str) -> Value {
    init_logger();
    QueryCache::new().query(path, &store()).unwrap()
}

#[test]
fn authors() {
    let all = json!(["Nigel Rees", "Evelyn Waugh", "Herman Melville", "J. R. R. Tolkien"]);
    assert_eq!(all, query("$.store.book[*].author"));
    assert_eq!(all, query("$..author"));
}

#[test]
fn prices_below_store() {
    assert_eq!(json!([8.95, 12.99, 8.99, 22.99, 19.95]), query("$.store..price"));
}

#[test]
fn store_children() {
    let data = store();
    assert_eq!(
        json!([data["store"]["book"], data["store"]["bicycle"]]),
        query("$.store.*")
    );
    assert_eq!(27, query("$..*").as_array().map_or(0, Vec::len));
}

#[test]
fn book_positions() {
    let data = store();
    let books = &data["store"]["book"];
    assert_eq!(json!([books[2]]), query("$..book[2]"));
    assert_eq!(json!([books[3]]), query("$..book[(@.length-1)]"));
    assert_eq!(json!([books[3]]), query("$..book[-1:]"));
    assert_eq!(json!([books[0], books[1]]), query("$..book[0,1]"));
    assert_eq!(json!([books[0], books[1]]), query("$..book[:2]"));
    assert_eq!(json!([books[1], books[2], books[3]]), query("$..book[1:4]"));
    assert_eq!(json!([books[1], books[2], books[3]]), query("$..book[1,2,3]"));
    assert_eq!(query("$.store.book[1:4]"), query("$.store.book[1,2,3]"));
}

#[test]
fn book_filters() {
    let data = store();
    let books = &data["store"]["book"];
    assert_eq!(json!([books[3]]), query("$..book[?(@.price > 20)]"));
    assert_eq!(json!([books[2], books[3]]), query("$..book[?(@.isbn)]"));
    assert_eq!(json!([books[0], books[2]]), query("$..book[?(@.price<10)]"));
    assert_eq!(
        json!(["The Lord of the Rings"]),
        query("$.store.book[?(@.price > 20)].title")
    );
    assert_eq!(
        json!(["Moby Dick"]),
        query("$.store.book[?(@.category === 'fiction' && @.price < 10)].title")
    );
    assert_eq!(
        json!(["Evelyn Waugh"]),
        query("$.store.book[?(@.title.toLowerCase().includes('sword'))].author")
    );
}

#[test]
fn constructs_and_coercions() {
    assert_eq!(json!(["red"]), query(r#"$.store.bicycle["color"]"#));
    assert_eq!(json!({ "color": "red" }), query(r#"$.store.bicycle{"color"}"#));
    assert_eq!(json!(["red"]), query("$.store.bicycle['color']"));
    assert_eq!(json!({ "color": "red" }), query("$.store.bicycle{'color'}"));
    assert_eq!(json!(19), query("$.store.bicycle.price<int>"));
    assert_eq!(json!("19.95"), query("$.store.bicycle.price<String>"));
    assert_eq!(
        json!([["Nigel Rees", 8.95], ["Evelyn Waugh", 12.99]]),
        query("$.store.book[:2]['author', 'price']")
    );
}

#[test]
fn maps() {
    assert_eq!(json!([8, 12, 8, 22]), query("$.store.book[!(int(@.price))]"));
    assert_eq!(json!(39.9), query("$.store.bicycle[!(@.price * 2)]"));
    assert_eq!(
        json!([null, null, "0-553-21311-3", "0-395-19395-8"]),
        query("$.store.book[!(@.isbn)]")
    );
}

#[test]
fn root_and_missing_paths() {
    assert_eq!(store(), query("$"));
    assert_eq!(Value::Null, query("$.store.car.wheels"));
    assert_eq!(json!([]), query("$.store.book[?(@.price > 100)]"));
}

#[test]
fn compile_errors() {
    init_logger();
    let cache = QueryCache::new();
    let data = store();

    let err = cache.query("$.store#", &data).unwrap_err();
    assert_eq!(PathError::Lex('#'), err);
    assert_eq!("Found no matching rule: #", err.to_string());

    let err = cache.query("$.store[", &data).unwrap_err();
    assert_eq!(PathError::Parse(TokenKind::Eof), err);
    assert_eq!("Unknown token type: eof", err.to_string());

    let err = cache.query("$.[0]", &data).unwrap_err();
    assert_eq!("Unknown token type: bracket-open", err.to_string());

    assert!(cache.is_empty());
}

#[test]
fn cached_matcher() {
    init_logger();
    let cache = QueryCache::new();
    let titles = cache.matcher("$.store.book[?(@.price < 9)].title").unwrap();
    assert_eq!(json!(["Sayings of the Century", "Moby Dick"]), titles(&store()));
    assert_eq!(json!([]), titles(&json!({ "store": { "book": [] } })));

    let again = cache.compile("$.store.book[?(@.price < 9)].title").unwrap();
    assert_eq!(1, cache.len());
    assert_eq!(titles(&store()), again.evaluate(&store()));
}
