//! Object-variant sync proxy.
//!
//! One `SyncProxy` keeps one local mirror object convergent with one
//! remote node. Control flow in both directions:
//!
//! - local write → mirror merge → observers → one `put` of the whole
//!   merged object at the node's own path
//! - remote callback (including the echo of the put above) → metadata
//!   filtered → echo flag set → mirror overwritten → observers → echo
//!   flag cleared
//!
//! The echo flag closes the loop: while a remote-origin update is being
//! applied, local writes are dropped, so the echo of a write can never
//! fan out into another write. The drop is silent and lossy by contract;
//! re-entrant writes are not queued.

use crate::config::ProxyConfig;
use crate::observers::{Observer, Observers};
use crate::seed;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use unum_node::{NodeHandle, Snapshot, Subscription, Value};

/// A bidirectional sync proxy for a single object.
///
/// Created against a node handle; holds one persistent store subscription
/// until [`destroy`](SyncProxy::destroy) releases it. Dropping the proxy
/// releases the subscription too, but collections of observers handed out
/// via [`subscribe`](SyncProxy::subscribe) keep their guards.
pub struct SyncProxy {
    node: Arc<dyn NodeHandle>,
    shared: Arc<MirrorShared>,
    subscription: Mutex<Option<Subscription>>,
}

struct MirrorShared {
    mirror: RwLock<Snapshot>,
    observers: Arc<Observers<Snapshot>>,
    applying_remote: AtomicBool,
    destroyed: AtomicBool,
}

impl MirrorShared {
    /// Applies a remote-origin snapshot: filter metadata, set the echo
    /// flag, overwrite the mirror, notify, clear the flag. A tombstone
    /// resets the mirror to empty.
    fn apply_remote(&self, snapshot: Option<&Snapshot>) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        self.applying_remote.store(true, Ordering::SeqCst);
        let clean = snapshot.map(Snapshot::without_meta).unwrap_or_default();
        *self.mirror.write() = clean.clone();
        self.observers.notify(&clean);
        self.applying_remote.store(false, Ordering::SeqCst);
    }
}

impl SyncProxy {
    /// Creates a proxy over `node`.
    ///
    /// The mirror starts from the configured seed (empty without one).
    /// One `once` read performs the seeding check; the persistent
    /// subscription then keeps the mirror convergent with the node.
    pub fn new(node: Arc<dyn NodeHandle>, config: ProxyConfig) -> Self {
        let shared = Arc::new(MirrorShared {
            mirror: RwLock::new(config.seed.clone().unwrap_or_default()),
            observers: Observers::new(),
            applying_remote: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        });

        if let Some(defaults) = config.seed {
            seed::seed_if_empty(&node, defaults);
        }

        let state = Arc::clone(&shared);
        let sub = node.on(Arc::new(move |snapshot, _key| {
            state.apply_remote(snapshot);
        }));

        Self {
            node,
            shared,
            subscription: Mutex::new(Some(sub)),
        }
    }

    /// Shallow-merges `partial` into the mirror, notifies observers, and
    /// puts the whole merged object at the node's path.
    ///
    /// No-op while a remote update is being applied (echo suppression)
    /// and after `destroy`. Fire-and-forget: propagation happens through
    /// the store with no delivery guarantee surfaced here.
    pub fn write(&self, partial: Snapshot) {
        if !self.can_write() {
            return;
        }
        let merged = {
            let mut mirror = self.shared.mirror.write();
            mirror.merge(&partial.without_meta());
            mirror.clone()
        };
        self.shared.observers.notify(&merged);
        self.node.put(Some(merged));
    }

    /// Writes a single field: `write` of a one-entry snapshot.
    pub fn write_field(&self, field: &str, value: Value) {
        self.write(Snapshot::of([(field, value)]));
    }

    /// Replaces the whole mirror and puts the result.
    pub fn replace(&self, full: Snapshot) {
        if !self.can_write() {
            return;
        }
        let clean = full.without_meta();
        *self.shared.mirror.write() = clean.clone();
        self.shared.observers.notify(&clean);
        self.node.put(Some(clean));
    }

    /// Computes a new state from the current mirror and replaces it.
    pub fn update(&self, updater: impl FnOnce(&Snapshot) -> Snapshot) {
        if !self.can_write() {
            return;
        }
        let current = self.shared.mirror.read().clone();
        self.replace(updater(&current));
    }

    /// Current mirror contents.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.mirror.read().clone()
    }

    /// One field of the mirror.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.shared.mirror.read().get(key).cloned()
    }

    /// Registers an observer. The callback fires immediately with the
    /// current mirror, then on every change from either direction.
    pub fn subscribe(
        &self,
        callback: impl Fn(&Snapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let observer: Observer<Snapshot> = Arc::new(callback);
        observer(&self.snapshot());
        Observers::register(&self.shared.observers, observer)
    }

    /// Splits the proxy into a reader/writer handle pair, the
    /// minimal-ceremony form of the binding.
    pub fn split(self) -> (MirrorReader, MirrorWriter) {
        let proxy = Arc::new(self);
        (
            MirrorReader {
                proxy: Arc::clone(&proxy),
            },
            MirrorWriter { proxy },
        )
    }

    /// Releases the store subscription and drops all observers.
    /// Idempotent; writes arriving afterwards are no-ops.
    pub fn destroy(&self) {
        if self.shared.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(sub) = self.subscription.lock().take() {
            sub.cancel();
        }
        self.shared.observers.clear();
        tracing::debug!(key = %self.node.key(), "sync proxy destroyed");
    }

    /// True until `destroy` has run.
    pub fn is_live(&self) -> bool {
        !self.shared.destroyed.load(Ordering::SeqCst)
    }

    fn can_write(&self) -> bool {
        if self.shared.destroyed.load(Ordering::SeqCst) {
            tracing::debug!(key = %self.node.key(), "write after destroy ignored");
            return false;
        }
        if self.shared.applying_remote.load(Ordering::SeqCst) {
            tracing::debug!(key = %self.node.key(), "local write suppressed during remote apply");
            return false;
        }
        true
    }
}

/// Read side of a split proxy.
#[derive(Clone)]
pub struct MirrorReader {
    proxy: Arc<SyncProxy>,
}

impl MirrorReader {
    /// Current mirror contents.
    pub fn snapshot(&self) -> Snapshot {
        self.proxy.snapshot()
    }

    /// One field of the mirror.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.proxy.get(key)
    }

    /// Registers an observer; see [`SyncProxy::subscribe`].
    pub fn subscribe(
        &self,
        callback: impl Fn(&Snapshot) + Send + Sync + 'static,
    ) -> Subscription {
        self.proxy.subscribe(callback)
    }
}

/// Write side of a split proxy.
#[derive(Clone)]
pub struct MirrorWriter {
    proxy: Arc<SyncProxy>,
}

impl MirrorWriter {
    /// See [`SyncProxy::write`].
    pub fn write(&self, partial: Snapshot) {
        self.proxy.write(partial);
    }

    /// See [`SyncProxy::write_field`].
    pub fn write_field(&self, field: &str, value: Value) {
        self.proxy.write_field(field, value);
    }

    /// See [`SyncProxy::replace`].
    pub fn replace(&self, full: Snapshot) {
        self.proxy.replace(full);
    }

    /// See [`SyncProxy::update`].
    pub fn update(&self, updater: impl FnOnce(&Snapshot) -> Snapshot) {
        self.proxy.update(updater);
    }

    /// Tears the underlying proxy down; see [`SyncProxy::destroy`].
    pub fn destroy(&self) {
        self.proxy.destroy();
    }
}
