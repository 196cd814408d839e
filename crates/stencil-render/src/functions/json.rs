//! The `jsonQuery` template function.
//!
//! Queries are evaluated by `jsonpath-rust`. The dotted shorthand common in
//! shell tooling (`.a.b`, `.items[0]`, `.[0]`) is accepted and rewritten to
//! JSONPath before evaluation.

use jsonpath_rust::JsonPathFinder;
use minijinja::{Error, ErrorKind, Value};

/// Rewrites dotted shorthand into a JSONPath expression.
pub(crate) fn to_json_path(query: &str) -> String {
    let query = query.trim();
    if query.starts_with('$') {
        return query.to_string();
    }
    if query.is_empty() || query == "." {
        return "$".to_string();
    }
    let query = query.replace(".[", "[");
    if query.starts_with('.') || query.starts_with('[') {
        format!("${query}")
    } else {
        format!("$.{query}")
    }
}

/// Runs `query` against `document` and returns the matched JSON.
///
/// One match yields that value, several yield a list. Parse failures and
/// empty results are errors.
pub fn query_json(document: &str, query: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str::<serde_json::Value>(document)
        .map_err(|e| format!("invalid json document: {e}"))?;

    let path = to_json_path(query);
    let finder = JsonPathFinder::from_str(document, &path)
        .map_err(|e| format!("invalid query {query:?}: {e}"))?;

    match finder.find() {
        serde_json::Value::Array(mut found) => match found.len() {
            0 => Err(format!("no match for query {query:?}")),
            1 => Ok(found.remove(0)),
            _ => Ok(serde_json::Value::Array(found)),
        },
        serde_json::Value::Null => Err(format!("no match for query {query:?}")),
        other => Ok(other),
    }
}

/// `jsonQuery(document, query)`.
pub fn json_query(document: &str, query_str: &str) -> Result<Value, Error> {
    query_json(document, query_str)
        .map(|found| Value::from_serialize(&found))
        .map_err(|msg| Error::new(ErrorKind::InvalidOperation, msg))
}
