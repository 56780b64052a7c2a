//! No-op node for running without a store.

use crate::handle::{NodeCallback, NodeHandle, NodeSet, OnceCallback, Subscription};
use crate::snapshot::Snapshot;
use std::sync::Arc;

/// A node handle with no store behind it.
///
/// Writes are dropped (with a debug log), listeners never fire, and
/// `once` never calls back — the indefinite-pending case of the contract.
/// Proxies built over a detached node keep working locally: their mirrors
/// accept writes and notify observers, nothing ever reaches a remote.
#[derive(Debug, Default)]
pub struct DetachedNode {
    key: String,
}

impl DetachedNode {
    /// Creates a detached root node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node carrying `key` as its own key.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl NodeHandle for DetachedNode {
    fn key(&self) -> &str {
        &self.key
    }

    fn child(&self, key: &str) -> Arc<dyn NodeHandle> {
        Arc::new(DetachedNode::with_key(key))
    }

    fn put(&self, value: Option<Snapshot>) {
        tracing::debug!(
            key = %self.key,
            tombstone = value.is_none(),
            "detached node dropped a write"
        );
    }

    fn on(&self, _callback: NodeCallback) -> Subscription {
        Subscription::noop()
    }

    fn once(&self, _callback: OnceCallback) {
        // Never fires: a detached store has no value to produce.
    }

    fn map(&self) -> Arc<dyn NodeSet> {
        Arc::new(DetachedNodeSet)
    }
}

struct DetachedNodeSet;

impl NodeSet for DetachedNodeSet {
    fn on(&self, _callback: NodeCallback) -> Subscription {
        Subscription::noop()
    }

    fn once(&self, _callback: NodeCallback) {}
}
