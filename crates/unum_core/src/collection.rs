//! Collection sync proxy.
//!
//! Maintains a local mirror mapping item id → item for a collection
//! rooted at one remote node. The store side is driven by per-child
//! enumeration (`map().on`), one callback per child change; deletion by
//! foreign writers is observed solely through child tombstones.

use crate::config::CollectionConfig;
use crate::error::{BindError, BindResult};
use crate::observers::{Observer, Observers};
use crate::seed;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use unum_node::{NodeHandle, Snapshot, Subscription, Value, META_KEY};

/// Field carrying an item's own id (the collection key).
pub const ID_FIELD: &str = "id";

/// Field carrying an item's display text, by domain convention.
pub const TEXT_FIELD: &str = "text";

/// A bidirectional sync proxy for a keyed collection.
///
/// Items always carry [`ID_FIELD`] (their key) and a [`TEXT_FIELD`];
/// items arriving without usable text get a fallback per configuration.
/// Enumeration order of [`list`](CollectionProxy::list) is unspecified
/// and not stable across runs.
pub struct CollectionProxy {
    node: Arc<dyn NodeHandle>,
    shared: Arc<CollectionShared>,
    subscription: Mutex<Option<Subscription>>,
}

struct CollectionShared {
    items: RwLock<HashMap<String, Snapshot>>,
    observers: Arc<Observers<HashMap<String, Snapshot>>>,
    applying_remote: AtomicBool,
    destroyed: AtomicBool,
    synthesize_text: bool,
}

impl CollectionShared {
    /// Applies one remote-origin child callback.
    fn apply_child(&self, snapshot: Option<&Snapshot>, key: &str) {
        if key == META_KEY || self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        self.applying_remote.store(true, Ordering::SeqCst);
        let current = {
            let mut items = self.items.write();
            match snapshot {
                Some(item) => {
                    items.insert(
                        key.to_string(),
                        normalize_item(item, key, self.synthesize_text),
                    );
                }
                // Tombstone: the only way foreign deletions are observed.
                None => {
                    items.remove(key);
                }
            }
            items.clone()
        };
        self.observers.notify(&current);
        self.applying_remote.store(false, Ordering::SeqCst);
    }
}

impl CollectionProxy {
    /// Creates a collection proxy over `node`.
    ///
    /// Configured seed items are written child-by-child, only when the
    /// node is empty at the one-shot seeding read. The persistent
    /// enumeration subscription then keeps the mirror convergent.
    pub fn new(node: Arc<dyn NodeHandle>, config: CollectionConfig) -> Self {
        let shared = Arc::new(CollectionShared {
            items: RwLock::new(HashMap::new()),
            observers: Observers::new(),
            applying_remote: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            synthesize_text: config.synthesize_text,
        });

        if !config.seed_items.is_empty() {
            let target = Arc::clone(&node);
            let items = config.seed_items;
            seed::when_empty(&node, move || {
                tracing::debug!(
                    key = %target.key(),
                    count = items.len(),
                    "seeding empty collection"
                );
                for item in &items {
                    let (id, stored) = prepare_item(item);
                    target.child(&id).put(Some(stored));
                }
            });
        }

        let state = Arc::clone(&shared);
        let sub = node.map().on(Arc::new(move |snapshot, key| {
            state.apply_child(snapshot, key);
        }));

        Self {
            node,
            shared,
            subscription: Mutex::new(Some(sub)),
        }
    }

    /// Adds an item and returns its id.
    ///
    /// The id comes from the item's own [`ID_FIELD`] when present, else a
    /// fresh UUID v4. A [`TEXT_FIELD`] is ensured (empty string default).
    /// One `put` goes to the child path; the mirror is updated
    /// optimistically ahead of the echo. Returns `None` when the write
    /// was dropped (destroyed proxy, or the echo-suppression window).
    pub fn add(&self, item: Snapshot) -> Option<String> {
        if !self.can_write() {
            return None;
        }
        let (id, mut stored) = prepare_item(&item);
        self.node.child(&id).put(Some(stored.clone()));

        let current = {
            let mut items = self.shared.items.write();
            stored.insert(ID_FIELD, Value::from(id.as_str()));
            items.insert(id.clone(), stored);
            items.clone()
        };
        self.shared.observers.notify(&current);
        Some(id)
    }

    /// Updates an item by computing changes from its current state.
    ///
    /// The updater's result is shallow-merged into the item; the merged
    /// whole is written to the child path.
    pub fn update(
        &self,
        id: &str,
        updater: impl FnOnce(&Snapshot) -> Snapshot,
    ) -> BindResult<()> {
        if !self.can_write() {
            return Ok(());
        }
        let current = self.shared.items.read().get(id).cloned();
        let Some(current) = current else {
            return Err(BindError::UnknownItem(id.to_string()));
        };
        let changes = updater(&current);
        self.apply_update(id, current, changes);
        Ok(())
    }

    /// Updates an item by shallow-merging `changes` directly.
    pub fn update_with(&self, id: &str, changes: Snapshot) -> BindResult<()> {
        self.update(id, move |_| changes)
    }

    /// Removes an item: a tombstone `put` at the child path, with the
    /// mirror entry dropped optimistically ahead of the echo.
    pub fn remove(&self, id: &str) {
        if !self.can_write() {
            return;
        }
        self.node.child(id).put(None);
        let current = {
            let mut items = self.shared.items.write();
            items.remove(id);
            items.clone()
        };
        self.shared.observers.notify(&current);
    }

    /// Current items, in unspecified order.
    pub fn list(&self) -> Vec<Snapshot> {
        self.shared.items.read().values().cloned().collect()
    }

    /// One item by id.
    pub fn get(&self, id: &str) -> Option<Snapshot> {
        self.shared.items.read().get(id).cloned()
    }

    /// Number of items in the mirror.
    pub fn len(&self) -> usize {
        self.shared.items.read().len()
    }

    /// True when the mirror holds no items.
    pub fn is_empty(&self) -> bool {
        self.shared.items.read().is_empty()
    }

    /// Registers an observer over the whole id → item map. Fires
    /// immediately with the current state, then on every change.
    pub fn subscribe(
        &self,
        callback: impl Fn(&HashMap<String, Snapshot>) + Send + Sync + 'static,
    ) -> Subscription {
        let observer: Observer<HashMap<String, Snapshot>> = Arc::new(callback);
        let current = self.shared.items.read().clone();
        observer(&current);
        Observers::register(&self.shared.observers, observer)
    }

    /// Releases the enumeration subscription and drops all observers.
    /// Idempotent; mutations arriving afterwards are no-ops.
    pub fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(sub) = self.subscription.lock().take() {
            sub.cancel();
        }
        self.shared.observers.clear();
        tracing::debug!(key = %self.node.key(), "collection proxy destroyed");
    }

    /// True until `destroy` has run.
    pub fn is_live(&self) -> bool {
        !self.shared.destroyed.load(Ordering::SeqCst)
    }

    fn apply_update(&self, id: &str, mut current: Snapshot, changes: Snapshot) {
        current.merge(&changes.without_meta());
        current.insert(ID_FIELD, Value::from(id));
        self.node.child(id).put(Some(current.clone()));

        let snapshot = {
            let mut items = self.shared.items.write();
            items.insert(id.to_string(), current);
            items.clone()
        };
        self.shared.observers.notify(&snapshot);
    }

    fn can_write(&self) -> bool {
        if self.shared.destroyed.load(Ordering::SeqCst) {
            tracing::debug!(key = %self.node.key(), "collection write after destroy ignored");
            return false;
        }
        if self.shared.applying_remote.load(Ordering::SeqCst) {
            tracing::debug!(
                key = %self.node.key(),
                "collection write suppressed during remote apply"
            );
            return false;
        }
        true
    }
}

/// Derives the id and the stored form of an outgoing item: text ensured,
/// id taken from the item or freshly generated.
fn prepare_item(item: &Snapshot) -> (String, Snapshot) {
    let mut stored = item.without_meta();
    if !matches!(stored.get(TEXT_FIELD), Some(Value::Text(_))) {
        stored.insert(TEXT_FIELD, Value::Text(String::new()));
    }
    let id = match stored.get(ID_FIELD).and_then(Value::as_str) {
        Some(existing) if !existing.is_empty() => existing.to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    };
    (id, stored)
}

/// Normalizes an incoming item: metadata stripped, id field pinned to the
/// child key, text fallback applied when the remote item lacks usable
/// text.
fn normalize_item(raw: &Snapshot, id: &str, synthesize: bool) -> Snapshot {
    let mut item = raw.without_meta();
    item.insert(ID_FIELD, Value::from(id));
    let usable = item.get(TEXT_FIELD).map(Value::is_usable_text).unwrap_or(false);
    if !usable {
        item.insert(TEXT_FIELD, text_fallback(id, synthesize));
    }
    item
}

fn text_fallback(id: &str, synthesize: bool) -> Value {
    if synthesize {
        let prefix: String = id.chars().take(6).collect();
        Value::Text(format!("Item {prefix}"))
    } else {
        Value::Text(String::new())
    }
}
