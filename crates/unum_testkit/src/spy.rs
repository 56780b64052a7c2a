//! Recording spy for node traffic.

use parking_lot::Mutex;
use std::sync::Arc;
use unum_node::{NodeCallback, NodeHandle, NodeSet, OnceCallback, Snapshot, Subscription};

/// One recorded `put`.
///
/// `path` is relative to the wrapped root: a put on the root itself has
/// an empty path, a put on child `"abc"` has path `["abc"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRecord {
    /// Path segments below the wrapped root.
    pub path: Vec<String>,
    /// The written payload; `None` is a tombstone.
    pub payload: Option<Snapshot>,
}

/// Shared log of recorded puts, cloneable across the test.
#[derive(Debug, Clone, Default)]
pub struct PutLog {
    records: Arc<Mutex<Vec<PutRecord>>>,
}

impl PutLog {
    /// All records so far, in order.
    pub fn records(&self) -> Vec<PutRecord> {
        self.records.lock().clone()
    }

    /// Number of recorded puts.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Payloads written at the given dot-separated relative path.
    pub fn puts_at(&self, path: &str) -> Vec<Option<Snapshot>> {
        let segments: Vec<&str> = unum_node::segments(path);
        self.records
            .lock()
            .iter()
            .filter(|r| r.path.iter().map(String::as_str).eq(segments.iter().copied()))
            .map(|r| r.payload.clone())
            .collect()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, record: PutRecord) {
        self.records.lock().push(record);
    }
}

/// A node handle wrapper that records every `put` before forwarding it.
///
/// Reads and subscriptions pass straight through, so a proxy built over a
/// `RecordingNode` behaves exactly as one built over the wrapped handle —
/// with the write traffic observable in the [`PutLog`].
pub struct RecordingNode {
    inner: Arc<dyn NodeHandle>,
    path: Vec<String>,
    key: String,
    log: PutLog,
}

impl RecordingNode {
    /// Wraps `inner`, returning the spy node and its log.
    pub fn wrap(inner: Arc<dyn NodeHandle>) -> (Arc<Self>, PutLog) {
        let log = PutLog::default();
        let key = inner.key().to_string();
        let node = Arc::new(Self {
            inner,
            path: Vec::new(),
            key,
            log: log.clone(),
        });
        (node, log)
    }
}

impl NodeHandle for RecordingNode {
    fn key(&self) -> &str {
        &self.key
    }

    fn child(&self, key: &str) -> Arc<dyn NodeHandle> {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Arc::new(RecordingNode {
            inner: self.inner.child(key),
            path,
            key: key.to_string(),
            log: self.log.clone(),
        })
    }

    fn put(&self, value: Option<Snapshot>) {
        self.log.push(PutRecord {
            path: self.path.clone(),
            payload: value.clone(),
        });
        self.inner.put(value);
    }

    fn on(&self, callback: NodeCallback) -> Subscription {
        self.inner.on(callback)
    }

    fn once(&self, callback: OnceCallback) {
        self.inner.once(callback)
    }

    fn map(&self) -> Arc<dyn NodeSet> {
        self.inner.map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unum_node::{MemoryGraph, Value};

    #[test]
    fn records_puts_with_relative_paths() {
        let graph = MemoryGraph::new();
        let (node, log) = RecordingNode::wrap(graph.node("todos"));

        node.put(Some(Snapshot::of([("meta", Value::from("root"))])));
        node.child("abc")
            .put(Some(Snapshot::of([("text", Value::from("hi"))])));
        node.child("abc").put(None);

        let records = log.records();
        assert_eq!(records.len(), 3);
        assert!(records[0].path.is_empty());
        assert_eq!(records[1].path, vec!["abc".to_string()]);
        assert!(records[2].payload.is_none());

        assert_eq!(log.puts_at("abc").len(), 2);
        assert_eq!(log.puts_at("").len(), 1);
    }

    #[test]
    fn traffic_still_reaches_the_store() {
        let graph = MemoryGraph::new();
        let (node, _log) = RecordingNode::wrap(graph.node("doc"));

        node.put(Some(Snapshot::of([("x", Value::from(1i64))])));
        assert_eq!(graph.read("doc").unwrap().get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn subscriptions_pass_through() {
        let graph = MemoryGraph::new();
        let (node, log) = RecordingNode::wrap(graph.node("doc"));

        let seen = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&seen);
        let _sub = node.on(Arc::new(move |_, _| {
            *sink.lock() += 1;
        }));

        graph
            .node("doc")
            .put(Some(Snapshot::of([("x", Value::from(1i64))])));
        assert_eq!(*seen.lock(), 1);
        // The foreign write went straight to the graph, not through the spy.
        assert!(log.is_empty());
    }

    #[test]
    fn clear_resets_the_log() {
        let graph = MemoryGraph::new();
        let (node, log) = RecordingNode::wrap(graph.node("doc"));
        node.put(None);
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
