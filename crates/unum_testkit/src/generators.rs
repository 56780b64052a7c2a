//! Property-based test generators using proptest.
//!
//! Strategies honor the invariants the proxies rely on: data keys are
//! never the metadata key, floats are finite so snapshot equality is
//! meaningful across a round trip.

use proptest::prelude::*;
use unum_node::{Snapshot, Value, META_KEY};

/// Strategy for scalar node values.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9..1.0e9f64).prop_map(Value::Float),
        prop::string::string_regex("[a-zA-Z0-9 ]{0,16}")
            .expect("Invalid regex")
            .prop_map(Value::Text),
    ]
}

/// Strategy for application data keys (never the metadata key).
pub fn data_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for snapshots of application data only.
pub fn snapshot_strategy(max_entries: usize) -> impl Strategy<Value = Snapshot> {
    prop::collection::hash_map(data_key_strategy(), value_strategy(), 0..max_entries)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Strategy for snapshots that also carry the store's metadata key.
pub fn snapshot_with_meta_strategy(max_entries: usize) -> impl Strategy<Value = Snapshot> {
    (snapshot_strategy(max_entries), value_strategy()).prop_map(|(mut snap, meta)| {
        snap.insert(META_KEY, meta);
        snap
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
