//! In-process graph store implementing the node contract.
//!
//! `MemoryGraph` is the reference collaborator for tests and demos. It
//! honors the contract the way a real peer-synchronized store does, scaled
//! down to one process:
//! - `put` merges per field (last write wins per key); `None` writes the
//!   tombstone
//! - listeners receive echoes of the caller's own writes, synchronously
//! - a node's parent tracks a link entry per child (`true` while the child
//!   holds data, `Null` once tombstoned), so the parent's snapshot answers
//!   the "does this collection have any entries" question the same way the
//!   remote store answers it
//! - `once` always fires, immediately, with `None` for a path that has
//!   never been written
//!
//! Delivery happens with no internal lock held, so callbacks may re-enter
//! the graph (put, subscribe) freely.

use crate::handle::{NodeCallback, NodeHandle, NodeSet, OnceCallback, Subscription};
use crate::path;
use crate::snapshot::Snapshot;
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Which subscriber table a registration lives in.
#[derive(Debug, Clone, Copy)]
enum SubKind {
    Node,
    Children,
}

#[derive(Default)]
struct GraphState {
    /// Node payloads by path. A present key holding `None` is a tombstone;
    /// an absent key has never been written.
    records: Mutex<HashMap<Vec<String>, Option<Snapshot>>>,
    /// Persistent listeners per node path.
    node_subs: Mutex<HashMap<Vec<String>, Vec<(u64, NodeCallback)>>>,
    /// Per-child listeners, keyed by the parent path.
    child_subs: Mutex<HashMap<Vec<String>, Vec<(u64, NodeCallback)>>>,
    next_sub_id: AtomicU64,
}

impl GraphState {
    fn write(&self, node_path: &[String], payload: Option<Snapshot>) {
        let key = node_path.last().cloned().unwrap_or_default();
        let mut parent_changed = None;
        let merged;
        {
            let mut records = self.records.lock();
            let entry = records.entry(node_path.to_vec()).or_insert(None);
            merged = match payload {
                Some(snap) => match entry.as_mut() {
                    Some(current) => {
                        current.merge(&snap);
                        Some(current.clone())
                    }
                    None => {
                        *entry = Some(snap.clone());
                        Some(snap)
                    }
                },
                None => {
                    *entry = None;
                    None
                }
            };

            // Maintain the parent's link entry for this child.
            if !node_path.is_empty() {
                let parent_path = node_path[..node_path.len() - 1].to_vec();
                let marker = if merged.is_some() {
                    Value::Bool(true)
                } else {
                    Value::Null
                };
                let parent_entry = records.entry(parent_path).or_insert(None);
                let links = parent_entry.get_or_insert_with(Snapshot::new);
                if links.get(&key) != Some(&marker) {
                    links.insert(key.clone(), marker);
                    parent_changed = Some(links.clone());
                }
            }
        }

        self.notify(SubKind::Node, node_path, merged.as_ref(), &key);
        if !node_path.is_empty() {
            let parent = &node_path[..node_path.len() - 1];
            self.notify(SubKind::Children, parent, merged.as_ref(), &key);
            if let Some(links) = parent_changed {
                let parent_key = parent.last().cloned().unwrap_or_default();
                self.notify(SubKind::Node, parent, Some(&links), &parent_key);
            }
        }
    }

    fn read(&self, node_path: &[String]) -> Option<Snapshot> {
        self.records.lock().get(node_path).cloned().flatten()
    }

    fn children(&self, parent: &[String]) -> Vec<(String, Option<Snapshot>)> {
        let records = self.records.lock();
        records
            .iter()
            .filter(|(p, _)| p.len() == parent.len() + 1 && p.starts_with(parent))
            .map(|(p, v)| (p.last().cloned().unwrap_or_default(), v.clone()))
            .collect()
    }

    /// Clones the matching callbacks out and invokes them lock-free.
    fn notify(&self, kind: SubKind, at: &[String], snapshot: Option<&Snapshot>, key: &str) {
        let table = match kind {
            SubKind::Node => &self.node_subs,
            SubKind::Children => &self.child_subs,
        };
        let callbacks: Vec<NodeCallback> = {
            let subs = table.lock();
            subs.get(at)
                .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(snapshot, key);
        }
    }

    fn register(
        state: &Arc<GraphState>,
        kind: SubKind,
        at: Vec<String>,
        callback: &NodeCallback,
    ) -> Subscription {
        let id = state.next_sub_id.fetch_add(1, Ordering::SeqCst);
        let table = match kind {
            SubKind::Node => &state.node_subs,
            SubKind::Children => &state.child_subs,
        };
        table
            .lock()
            .entry(at.clone())
            .or_default()
            .push((id, Arc::clone(callback)));

        let weak = Arc::downgrade(state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.remove_sub(kind, &at, id);
            }
        })
    }

    fn remove_sub(&self, kind: SubKind, at: &[String], id: u64) {
        let table = match kind {
            SubKind::Node => &self.node_subs,
            SubKind::Children => &self.child_subs,
        };
        let mut subs = table.lock();
        if let Some(list) = subs.get_mut(at) {
            list.retain(|(sub_id, _)| *sub_id != id);
            if list.is_empty() {
                subs.remove(at);
            }
        }
    }
}

/// An in-memory graph store.
///
/// Cloning is cheap and shares the same state; hand clones to as many
/// "connections" as the test or demo needs.
#[derive(Clone, Default)]
pub struct MemoryGraph {
    state: Arc<GraphState>,
}

impl MemoryGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the root node.
    pub fn root(&self) -> Arc<dyn NodeHandle> {
        Arc::new(MemoryNode {
            state: Arc::clone(&self.state),
            path: Vec::new(),
            key: String::new(),
        })
    }

    /// Resolves a dot-separated path from the root.
    pub fn node(&self, node_path: &str) -> Arc<dyn NodeHandle> {
        path::resolve(&self.root(), node_path)
    }

    /// Reads the current snapshot at a dot-separated path. Test/debug
    /// convenience; goes straight to storage, no subscription involved.
    pub fn read(&self, node_path: &str) -> Option<Snapshot> {
        let segments: Vec<String> = path::segments(node_path)
            .into_iter()
            .map(String::from)
            .collect();
        self.state.read(&segments)
    }
}

struct MemoryNode {
    state: Arc<GraphState>,
    path: Vec<String>,
    key: String,
}

impl NodeHandle for MemoryNode {
    fn key(&self) -> &str {
        &self.key
    }

    fn child(&self, key: &str) -> Arc<dyn NodeHandle> {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Arc::new(MemoryNode {
            state: Arc::clone(&self.state),
            path,
            key: key.to_string(),
        })
    }

    fn put(&self, value: Option<Snapshot>) {
        tracing::debug!(
            path = %self.path.join("."),
            tombstone = value.is_none(),
            "memory graph put"
        );
        self.state.write(&self.path, value);
    }

    fn on(&self, callback: NodeCallback) -> Subscription {
        let sub = GraphState::register(
            &self.state,
            SubKind::Node,
            self.path.clone(),
            &callback,
        );
        if let Some(current) = self.state.read(&self.path) {
            callback(Some(&current), &self.key);
        }
        sub
    }

    fn once(&self, callback: OnceCallback) {
        let current = self.state.read(&self.path);
        callback(current.as_ref(), &self.key);
    }

    fn map(&self) -> Arc<dyn NodeSet> {
        Arc::new(MemoryNodeSet {
            state: Arc::clone(&self.state),
            path: self.path.clone(),
        })
    }
}

struct MemoryNodeSet {
    state: Arc<GraphState>,
    path: Vec<String>,
}

impl NodeSet for MemoryNodeSet {
    fn on(&self, callback: NodeCallback) -> Subscription {
        let sub = GraphState::register(
            &self.state,
            SubKind::Children,
            self.path.clone(),
            &callback,
        );
        for (key, snapshot) in self.state.children(&self.path) {
            if let Some(snapshot) = snapshot {
                callback(Some(&snapshot), &key);
            }
        }
        sub
    }

    fn once(&self, callback: NodeCallback) {
        for (key, snapshot) in self.state.children(&self.path) {
            if let Some(snapshot) = snapshot {
                callback(Some(&snapshot), &key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Seen = Arc<Mutex<Vec<(Option<Snapshot>, String)>>>;

    fn recorder() -> (Seen, NodeCallback) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: NodeCallback = Arc::new(move |snap, key| {
            sink.lock().push((snap.cloned(), key.to_string()));
        });
        (seen, callback)
    }

    #[test]
    fn put_then_read() {
        let graph = MemoryGraph::new();
        graph
            .node("users.alice")
            .put(Some(Snapshot::of([("name", Value::from("alice"))])));

        let snap = graph.read("users.alice").unwrap();
        assert_eq!(snap.get("name"), Some(&Value::Text("alice".into())));
    }

    #[test]
    fn put_merges_per_field() {
        let graph = MemoryGraph::new();
        let node = graph.node("doc");

        node.put(Some(Snapshot::of([("a", Value::from(1i64))])));
        node.put(Some(Snapshot::of([("b", Value::from(2i64))])));
        node.put(Some(Snapshot::of([("a", Value::from(9i64))])));

        let snap = graph.read("doc").unwrap();
        assert_eq!(snap.get("a"), Some(&Value::Int(9)));
        assert_eq!(snap.get("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn on_echoes_writers_own_put() {
        let graph = MemoryGraph::new();
        let node = graph.node("doc");
        let (seen, callback) = recorder();
        let _sub = node.on(callback);

        node.put(Some(Snapshot::of([("x", Value::from(1i64))])));

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1, "doc");
        assert_eq!(
            events[0].0.as_ref().unwrap().get("x"),
            Some(&Value::Int(1))
        );
    }

    #[test]
    fn on_fires_immediately_when_value_exists() {
        let graph = MemoryGraph::new();
        graph.node("doc").put(Some(Snapshot::of([("x", Value::from(1i64))])));

        let (seen, callback) = recorder();
        let _sub = graph.node("doc").on(callback);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn tombstone_delivers_none() {
        let graph = MemoryGraph::new();
        let node = graph.node("doc");
        node.put(Some(Snapshot::of([("x", Value::from(1i64))])));

        let (seen, callback) = recorder();
        let _sub = node.on(callback);
        node.put(None);

        let events = seen.lock();
        // Initial value, then the tombstone.
        assert_eq!(events.len(), 2);
        assert!(events[1].0.is_none());
        assert!(graph.read("doc").is_none());
    }

    #[test]
    fn once_fires_with_none_when_absent() {
        let graph = MemoryGraph::new();
        let (seen, _) = recorder();
        let sink = Arc::clone(&seen);
        graph.node("missing").once(Box::new(move |snap, key| {
            sink.lock().push((snap.cloned(), key.to_string()));
        }));

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert!(events[0].0.is_none());
    }

    #[test]
    fn children_enumeration_existing_then_live() {
        let graph = MemoryGraph::new();
        graph.node("todos.a").put(Some(Snapshot::of([("text", Value::from("one"))])));
        graph.node("todos.b").put(Some(Snapshot::of([("text", Value::from("two"))])));

        let (seen, callback) = recorder();
        let _sub = graph.node("todos").map().on(callback);
        assert_eq!(seen.lock().len(), 2);

        graph.node("todos.c").put(Some(Snapshot::of([("text", Value::from("three"))])));
        graph.node("todos.a").put(None);

        let events = seen.lock();
        assert_eq!(events.len(), 4);
        assert_eq!(events[2].1, "c");
        assert_eq!(events[3].1, "a");
        assert!(events[3].0.is_none());
    }

    #[test]
    fn map_once_delivers_each_existing_child() {
        let graph = MemoryGraph::new();
        graph.node("todos.a").put(Some(Snapshot::of([("text", Value::from("one"))])));
        graph.node("todos.b").put(None);

        let (seen, callback) = recorder();
        graph.node("todos").map().once(callback);

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1, "a");
    }

    #[test]
    fn parent_tracks_child_links() {
        let graph = MemoryGraph::new();
        graph.node("todos.a").put(Some(Snapshot::of([("text", Value::from("one"))])));

        let links = graph.read("todos").unwrap();
        assert_eq!(links.get("a"), Some(&Value::Bool(true)));
        assert!(!links.is_empty_data());

        graph.node("todos.a").put(None);
        let links = graph.read("todos").unwrap();
        assert_eq!(links.get("a"), Some(&Value::Null));
    }

    #[test]
    fn cancelled_subscription_stops_delivery() {
        let graph = MemoryGraph::new();
        let node = graph.node("doc");
        let (seen, callback) = recorder();

        let sub = node.on(callback);
        node.put(Some(Snapshot::of([("x", Value::from(1i64))])));
        assert_eq!(seen.lock().len(), 1);

        sub.cancel();
        node.put(Some(Snapshot::of([("x", Value::from(2i64))])));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn callback_may_reenter_the_graph() {
        let graph = MemoryGraph::new();
        let mirror = graph.clone();
        let callback: NodeCallback = Arc::new(move |snap, _key| {
            if let Some(snap) = snap {
                // Re-entrant put from inside delivery.
                if snap.contains_key("ping") {
                    mirror.node("pong").put(Some(Snapshot::of([("ok", Value::from(true))])));
                }
            }
        });
        let _sub = graph.node("ping-target").on(callback);

        graph.node("ping-target").put(Some(Snapshot::of([("ping", Value::from(true))])));
        assert!(graph.read("pong").is_some());
    }
}
