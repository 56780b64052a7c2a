//! Node snapshots: flat maps from keys to scalar values.

use crate::value::{Value, META_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A snapshot of one node's state: string keys mapped to scalar values.
///
/// Snapshots may carry the store's reserved metadata key ([`META_KEY`]);
/// the filtering helpers here are how that key is kept out of application
/// data. Enumeration order is unspecified and not stable across runs —
/// callers must not depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: HashMap<String, Value>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a snapshot from key-value pairs.
    pub fn of<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Inserts a value, returning the previous one if present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Returns the value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Returns true when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries, metadata included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates all entries, metadata included.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Iterates application data keys: every key except [`META_KEY`].
    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str).filter(|k| *k != META_KEY)
    }

    /// True when the snapshot holds no keys besides [`META_KEY`].
    ///
    /// This is the emptiness test used by default-data seeding: a node
    /// carrying only store bookkeeping counts as empty.
    pub fn is_empty_data(&self) -> bool {
        self.data_keys().next().is_none()
    }

    /// Returns a copy with [`META_KEY`] removed.
    pub fn without_meta(&self) -> Snapshot {
        Snapshot {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != META_KEY)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Shallow merge: keys of `other` overwrite, all other keys are kept.
    pub fn merge(&mut self, other: &Snapshot) {
        for (key, value) in other.iter() {
            self.entries.insert(key.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = (String, Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_keys_exclude_metadata() {
        let snap = Snapshot::of([
            ("name", Value::from("alice")),
            (META_KEY, Value::from("bookkeeping")),
        ]);
        let keys: Vec<&str> = snap.data_keys().collect();
        assert_eq!(keys, vec!["name"]);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn emptiness_ignores_metadata() {
        let mut snap = Snapshot::new();
        assert!(snap.is_empty_data());

        snap.insert(META_KEY, Value::from("soul"));
        assert!(snap.is_empty_data());
        assert!(!snap.is_empty());

        snap.insert("text", Value::from("x"));
        assert!(!snap.is_empty_data());
    }

    #[test]
    fn without_meta_strips_only_metadata() {
        let snap = Snapshot::of([
            ("a", Value::from(1i64)),
            (META_KEY, Value::Null),
            ("b", Value::from(2i64)),
        ]);
        let clean = snap.without_meta();
        assert_eq!(clean.len(), 2);
        assert!(!clean.contains_key(META_KEY));
        assert_eq!(clean.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn merge_overwrites_given_keys_only() {
        let mut base = Snapshot::of([("a", Value::from(1i64)), ("b", Value::from(2i64))]);
        base.merge(&Snapshot::of([("b", Value::from(20i64)), ("c", Value::from(3i64))]));

        assert_eq!(base.get("a"), Some(&Value::Int(1)));
        assert_eq!(base.get("b"), Some(&Value::Int(20)));
        assert_eq!(base.get("c"), Some(&Value::Int(3)));
    }

    #[test]
    fn json_round_trip() {
        let snap = Snapshot::of([("text", Value::from("buy milk")), ("done", Value::from(false))]);
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
