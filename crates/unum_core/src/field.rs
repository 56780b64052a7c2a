//! Two-way binding to a single field.

use crate::observers::{Observer, Observers};
use crate::proxy::SyncProxy;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use unum_node::{Subscription, Value};

/// Presents one field of a [`SyncProxy`] mirror as a readable/writable
/// scalar, suitable for two-way input binding.
///
/// Upstream changes arrive through a direct subscription on the owning
/// proxy; downstream writes forward to the proxy's
/// [`write_field`](SyncProxy::write_field). An absent field reads as the
/// empty string.
pub struct FieldBinding {
    proxy: Arc<SyncProxy>,
    field: String,
    current: Arc<RwLock<Value>>,
    observers: Arc<Observers<Value>>,
    subscription: Mutex<Option<Subscription>>,
}

impl FieldBinding {
    /// Binds `field` of the given proxy.
    pub fn new(proxy: &Arc<SyncProxy>, field: impl Into<String>) -> Self {
        let field = field.into();
        let current = Arc::new(RwLock::new(
            proxy.get(&field).unwrap_or_else(|| Value::Text(String::new())),
        ));
        let observers = Observers::new();

        let cache = Arc::clone(&current);
        let fanout = Arc::clone(&observers);
        let watched = field.clone();
        let sub = proxy.subscribe(move |snapshot| {
            let next = snapshot
                .get(&watched)
                .cloned()
                .unwrap_or_else(|| Value::Text(String::new()));
            let changed = {
                let mut value = cache.write();
                if *value != next {
                    *value = next.clone();
                    true
                } else {
                    false
                }
            };
            // Only actual field changes fan out.
            if changed {
                fanout.notify(&next);
            }
        });

        Self {
            proxy: Arc::clone(proxy),
            field,
            current,
            observers,
            subscription: Mutex::new(Some(sub)),
        }
    }

    /// The bound field's name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Current field value.
    pub fn value(&self) -> Value {
        self.current.read().clone()
    }

    /// Sets the field: updates the local cache for immediate feedback,
    /// then forwards to the owning proxy. Subject to the proxy's echo
    /// suppression and destroy state.
    pub fn set(&self, value: Value) {
        *self.current.write() = value.clone();
        self.observers.notify(&value);
        self.proxy.write_field(&self.field, value);
    }

    /// Registers an observer for this field only. Fires immediately with
    /// the current value, then on changes.
    pub fn subscribe(&self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Subscription {
        let observer: Observer<Value> = Arc::new(callback);
        observer(&self.value());
        Observers::register(&self.observers, observer)
    }

    /// Releases the proxy subscription. The owning proxy is untouched.
    pub fn destroy(&self) {
        if let Some(sub) = self.subscription.lock().take() {
            sub.cancel();
        }
        self.observers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use unum_node::{MemoryGraph, Snapshot};

    fn profile_proxy(graph: &MemoryGraph) -> Arc<SyncProxy> {
        Arc::new(SyncProxy::new(
            graph.node("profile"),
            ProxyConfig::new().with_seed(Snapshot::of([("name", Value::from("alice"))])),
        ))
    }

    #[test]
    fn reads_current_value_and_defaults_to_empty() {
        let graph = MemoryGraph::new();
        let proxy = profile_proxy(&graph);

        let name = FieldBinding::new(&proxy, "name");
        assert_eq!(name.value(), Value::Text("alice".into()));

        let missing = FieldBinding::new(&proxy, "nickname");
        assert_eq!(missing.value(), Value::Text(String::new()));
    }

    #[test]
    fn set_forwards_to_the_store() {
        let graph = MemoryGraph::new();
        let proxy = profile_proxy(&graph);
        let name = FieldBinding::new(&proxy, "name");

        name.set(Value::from("bob"));

        assert_eq!(proxy.get("name"), Some(Value::Text("bob".into())));
        assert_eq!(
            graph.read("profile").unwrap().get("name"),
            Some(&Value::Text("bob".into()))
        );
    }

    #[test]
    fn upstream_changes_propagate_without_polling() {
        let graph = MemoryGraph::new();
        let proxy = profile_proxy(&graph);
        let name = FieldBinding::new(&proxy, "name");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = name.subscribe(move |value| {
            sink.lock().push(value.clone());
        });

        // A foreign writer changes the field remotely.
        graph
            .node("profile")
            .put(Some(Snapshot::of([("name", Value::from("carol"))])));

        assert_eq!(name.value(), Value::Text("carol".into()));
        let values = seen.lock();
        assert!(values.contains(&Value::Text("carol".into())));
    }

    #[test]
    fn unrelated_field_changes_do_not_notify() {
        let graph = MemoryGraph::new();
        let proxy = profile_proxy(&graph);
        let name = FieldBinding::new(&proxy, "name");

        let count = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&count);
        let _sub = name.subscribe(move |_| {
            *sink.lock() += 1;
        });
        let initial = *count.lock();

        proxy.write_field("age", Value::from(30i64));
        assert_eq!(*count.lock(), initial);
    }

    #[test]
    fn destroy_stops_field_updates() {
        let graph = MemoryGraph::new();
        let proxy = profile_proxy(&graph);
        let name = FieldBinding::new(&proxy, "name");

        name.destroy();
        graph
            .node("profile")
            .put(Some(Snapshot::of([("name", Value::from("dave"))])));

        assert_eq!(name.value(), Value::Text("alice".into()));
    }
}
