//! The capability set a remote node must expose.

use crate::snapshot::Snapshot;
use std::sync::Arc;

/// Persistent listener callback.
///
/// Receives the node's current snapshot (`None` is the tombstone: the node
/// was deleted or has never held a value) and the key of the node the
/// change belongs to. Fired for every change, **including echoes of writes
/// made through this same process** — echo suppression is the caller's
/// concern, not the store's.
pub type NodeCallback = Arc<dyn Fn(Option<&Snapshot>, &str) + Send + Sync>;

/// One-shot read callback. See [`NodeHandle::once`].
pub type OnceCallback = Box<dyn FnOnce(Option<&Snapshot>, &str) + Send>;

/// A handle to one node of a remote, eventually-consistent graph store.
///
/// Implementations are cheap to clone via `Arc` and purely navigational:
/// holding a handle performs no I/O until `put`/`on`/`once` is called.
pub trait NodeHandle: Send + Sync {
    /// The node's own key (its last path segment; empty for the root).
    fn key(&self) -> &str;

    /// Returns a handle to the child node under `key`. Pure navigation.
    fn child(&self, key: &str) -> Arc<dyn NodeHandle>;

    /// Writes `value` at this node's path, asynchronously and
    /// fire-and-forget: no acknowledgement is observable through this
    /// contract. `None` writes the store's deletion tombstone. Stores
    /// merge `Some` payloads per field (last write wins per key).
    fn put(&self, value: Option<Snapshot>);

    /// Registers a persistent listener.
    ///
    /// The callback fires on every subsequent change and, if the node
    /// already holds a value, once immediately with that value. Dropping
    /// (or cancelling) the returned [`Subscription`] stops future
    /// deliveries; it cannot recall a callback already in flight.
    fn on(&self, callback: NodeCallback) -> Subscription;

    /// Registers a one-shot read of the current value.
    ///
    /// Fires at most once. An implementation that has no value to produce
    /// may never fire it; callers must tolerate indefinite pending.
    fn once(&self, callback: OnceCallback);

    /// Returns the child-enumeration handle for this node.
    fn map(&self) -> Arc<dyn NodeSet>;
}

/// Child enumeration over one node, the `map()` side of the contract.
///
/// Callbacks receive one child at a time as `(snapshot, child_key)`.
pub trait NodeSet: Send + Sync {
    /// Persistent per-child listener: existing children are delivered
    /// first, then every subsequent child change (including tombstones).
    fn on(&self, callback: NodeCallback) -> Subscription;

    /// Delivers each currently existing child once. Nothing is retained;
    /// an empty node produces no calls.
    fn once(&self, callback: NodeCallback);
}

/// Guard for a registered listener.
///
/// Cancelling — explicitly via [`Subscription::cancel`] or implicitly by
/// dropping the guard — releases the listener on the store. Holding the
/// guard is what keeps the subscription alive.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Creates a subscription that runs `release` on cancellation.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Cancels the subscription now.
    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
