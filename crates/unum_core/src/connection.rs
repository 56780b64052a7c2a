//! Store connection lifecycle.

use crate::collection::CollectionProxy;
use crate::config::{CollectionConfig, ProxyConfig};
use crate::error::{BindError, BindResult};
use crate::proxy::SyncProxy;
use parking_lot::RwLock;
use std::sync::Arc;
use unum_node::{resolve, segments, DetachedNode, NodeHandle};

/// An explicitly constructed handle to a store.
///
/// A `Connection` is built from a root [`NodeHandle`] and passed to
/// whatever needs proxies — there is no ambient global instance. Closing
/// it (or constructing it [`detached`](Connection::detached)) degrades
/// every subsequently created node to a no-op: proxies keep working
/// locally, writes never reach a remote, and nothing panics.
pub struct Connection {
    root: RwLock<Option<Arc<dyn NodeHandle>>>,
}

impl Connection {
    /// Opens a connection over the given store root.
    pub fn open(root: Arc<dyn NodeHandle>) -> Self {
        tracing::debug!("store connection opened");
        Self {
            root: RwLock::new(Some(root)),
        }
    }

    /// Creates a connection with no store behind it. Everything built on
    /// it runs in the local-only degraded mode.
    pub fn detached() -> Self {
        tracing::warn!("store connection running detached; writes stay local");
        Self {
            root: RwLock::new(None),
        }
    }

    /// True while the connection holds a store root.
    pub fn is_open(&self) -> bool {
        self.root.read().is_some()
    }

    /// Releases the store root. Idempotent. Existing proxies keep their
    /// subscriptions; only new node handles are affected.
    pub fn close(&self) {
        if self.root.write().take().is_some() {
            tracing::debug!("store connection closed");
        }
    }

    /// Resolves a dot-separated path to a node handle.
    ///
    /// On a closed or detached connection this logs a warning and hands
    /// out a [`DetachedNode`] instead of failing — the degraded-mode
    /// policy. Use [`try_node`](Connection::try_node) to observe the
    /// closed state.
    pub fn node(&self, path: &str) -> Arc<dyn NodeHandle> {
        match self.try_node(path) {
            Ok(node) => node,
            Err(_) => {
                tracing::warn!(path, "connection has no store; handing out a detached node");
                let key = segments(path).last().copied().unwrap_or("");
                Arc::new(DetachedNode::with_key(key))
            }
        }
    }

    /// Resolves a path, or reports that the connection is closed.
    pub fn try_node(&self, path: &str) -> BindResult<Arc<dyn NodeHandle>> {
        match self.root.read().as_ref() {
            Some(root) => Ok(resolve(root, path)),
            None => Err(BindError::ConnectionClosed),
        }
    }

    /// Creates an object-variant proxy at `path`.
    pub fn proxy(&self, path: &str, config: ProxyConfig) -> SyncProxy {
        SyncProxy::new(self.node(path), config)
    }

    /// Creates a collection proxy at `path`.
    pub fn collection(&self, path: &str, config: CollectionConfig) -> CollectionProxy {
        CollectionProxy::new(self.node(path), config)
    }
}
