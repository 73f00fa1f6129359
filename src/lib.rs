//! Path queries over JSON documents.
//!
//! A path such as `$..book[?(@.price > 20)].title` is tokenized, parsed into a
//! list of [`Step`]s and executed against a [`serde_json::Value`]. Compiled
//! paths are cached by their text in a [`QueryCache`].
//!
//! ```
//! use jsonq::QueryCache;
//! use serde_json::json;
//!
//! let cache = QueryCache::new();
//! let data = json!({ "store": { "book": [{ "price": 8 }, { "price": 23 }] } });
//! let cheap = cache.query("$.store.book[?(@.price < 10)].price", &data).unwrap();
//! assert_eq!(json!([8]), cheap);
//! ```

mod access;
pub mod ast;
mod cache;
mod coerce;
mod error;
mod expr;
mod lexer;
mod matcher;
mod maybe;
mod parser;
pub mod predicates;
pub mod token;

// --- Public API ---
pub use ast::{BinaryOp, Expr, Literal, Method, Selector, Step, UnaryOp};
pub use cache::{CompiledQuery, QueryCache};
pub use coerce::Coercion;
pub use error::PathError;
pub use expr::{evaluate, Outcome};
pub use lexer::tokenize;
pub use matcher::execute;
pub use maybe::Maybe;
pub use parser::parse;
pub use serde_json::Value;
pub use token::{Token, TokenKind};
