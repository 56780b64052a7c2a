//! Snapshot fixtures.

use unum_node::{Snapshot, Value};

/// Builds a snapshot from literal pairs.
pub fn snapshot(pairs: &[(&str, Value)]) -> Snapshot {
    Snapshot::of(pairs.iter().map(|(k, v)| (*k, v.clone())))
}

/// A todo item in the shape the collection proxies expect.
pub fn todo_item(text: &str, completed: bool) -> Snapshot {
    snapshot(&[
        ("text", Value::from(text)),
        ("completed", Value::from(completed)),
    ])
}

/// Parses a snapshot from a JSON object literal.
///
/// Panics on malformed input; fixtures are test-only.
pub fn from_json(json: &str) -> Snapshot {
    serde_json::from_str(json).expect("fixture JSON should parse as a snapshot")
}
