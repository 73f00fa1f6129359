use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};
use serde_json::Value;

use crate::ast::Step;
use crate::error::PathError;
use crate::lexer::tokenize;
use crate::matcher::execute;
use crate::parser::parse;

/// A path compiled into executable steps.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    source: String,
    steps: Vec<Step>,
}

impl CompiledQuery {
    pub fn compile(path: &str) -> Result<CompiledQuery, PathError> {
        let tokens = tokenize(path)?;
        let steps = parse(&tokens)?;
        Ok(CompiledQuery {
            source: path.to_string(),
            steps,
        })
    }

    /// The path text this query was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn evaluate(&self, data: &Value) -> Value {
        execute(&self.steps, data)
    }
}

impl FromStr for CompiledQuery {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompiledQuery::compile(s)
    }
}

/// Compiled queries keyed by their exact path text.
///
/// Entries are never evicted. A path that fails to compile is not stored, so
/// asking again reports the same error.
#[derive(Debug, Default)]
pub struct QueryCache {
    compiled: Mutex<HashMap<String, Arc<CompiledQuery>>>,
}

impl QueryCache {
    pub fn new() -> QueryCache {
        QueryCache::default()
    }

    pub fn with_capacity(capacity: usize) -> QueryCache {
        QueryCache {
            compiled: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Returns the cached query for `path`, compiling it on first use.
    ///
    /// Compilation runs outside the lock; when two threads race on the same
    /// path the first insert wins and both get that entry.
    pub fn compile(&self, path: &str) -> Result<Arc<CompiledQuery>, PathError> {
        if let Some(query) = self.lock().get(path) {
            trace!("query cache hit: {}", path);
            return Ok(Arc::clone(query));
        }

        let query = match CompiledQuery::compile(path) {
            Ok(query) => Arc::new(query),
            Err(err) => {
                debug!("failed to compile {:?}: {}", path, err);
                return Err(err);
            }
        };
        debug!("compiled {:?} into {} steps", path, query.steps.len());

        let mut compiled = self.lock();
        let entry = compiled.entry(path.to_string()).or_insert(query);
        Ok(Arc::clone(entry))
    }

    /// Compiles (or reuses) `path` and runs it against `data`.
    pub fn query(&self, path: &str, data: &Value) -> Result<Value, PathError> {
        Ok(self.compile(path)?.evaluate(data))
    }

    /// Returns a reusable function running `path` against any document.
    pub fn matcher(&self, path: &str) -> Result<impl Fn(&Value) -> Value, PathError> {
        let query = self.compile(path)?;
        Ok(move |data: &Value| query.evaluate(data))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<CompiledQuery>>> {
        self.compiled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
