//! Derived read-only views over a collection.

use crate::collection::CollectionProxy;
use crate::observers::{Observer, Observers};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use unum_node::{Snapshot, Subscription};

/// A read-only projection of a [`CollectionProxy`], recomputed on every
/// collection change through a direct subscription.
///
/// The transform receives the item list in unspecified order; sort inside
/// the transform when order matters.
pub struct DerivedView<T> {
    current: Arc<RwLock<T>>,
    observers: Arc<Observers<T>>,
    subscription: Mutex<Option<Subscription>>,
}

impl<T: Clone + Send + Sync + 'static> DerivedView<T> {
    /// Creates a view computing `transform` over the collection's items.
    pub fn new(
        collection: &CollectionProxy,
        transform: impl Fn(&[Snapshot]) -> T + Send + Sync + 'static,
    ) -> Self {
        let current = Arc::new(RwLock::new(transform(&collection.list())));
        let observers = Observers::new();

        let cache = Arc::clone(&current);
        let fanout = Arc::clone(&observers);
        let sub = collection.subscribe(move |items| {
            let list: Vec<Snapshot> = items.values().cloned().collect();
            let next = transform(&list);
            *cache.write() = next.clone();
            fanout.notify(&next);
        });

        Self {
            current,
            observers,
            subscription: Mutex::new(Some(sub)),
        }
    }

    /// Current projection.
    pub fn get(&self) -> T {
        self.current.read().clone()
    }

    /// Registers an observer. Fires immediately with the current
    /// projection, then on every recompute.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let observer: Observer<T> = Arc::new(callback);
        observer(&self.get());
        Observers::register(&self.observers, observer)
    }

    /// Releases the collection subscription. The collection is untouched.
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
    use crate::config::CollectionConfig;
    use unum_node::{MemoryGraph, Value};

    fn completed_count(items: &[Snapshot]) -> usize {
        items
            .iter()
            .filter(|item| {
                item.get("completed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .count()
    }

    #[test]
    fn recomputes_on_collection_changes() {
        let graph = MemoryGraph::new();
        let todos = CollectionProxy::new(graph.node("todos"), CollectionConfig::default());
        let done = DerivedView::new(&todos, completed_count);
        assert_eq!(done.get(), 0);

        let id = todos
            .add(Snapshot::of([
                ("text", Value::from("a")),
                ("completed", Value::from(true)),
            ]))
            .unwrap();
        assert_eq!(done.get(), 1);

        todos.remove(&id);
        assert_eq!(done.get(), 0);
    }

    #[test]
    fn observers_see_recomputes() {
        let graph = MemoryGraph::new();
        let todos = CollectionProxy::new(graph.node("todos"), CollectionConfig::default());
        let texts = DerivedView::new(&todos, |items| {
            let mut out: Vec<String> = items
                .iter()
                .filter_map(|i| i.get("text").and_then(|v| v.as_str().map(String::from)))
                .collect();
            out.sort();
            out
        });

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = texts.subscribe(move |list| {
            sink.lock().push(list.clone());
        });

        todos.add(Snapshot::of([("text", Value::from("zeta"))]));
        todos.add(Snapshot::of([("text", Value::from("alpha"))]));

        let last = seen.lock().last().cloned().unwrap();
        assert_eq!(last, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn destroy_freezes_the_view() {
        let graph = MemoryGraph::new();
        let todos = CollectionProxy::new(graph.node("todos"), CollectionConfig::default());
        let count = DerivedView::new(&todos, |items| items.len());

        count.destroy();
        todos.add(Snapshot::of([("text", Value::from("late"))]));
        assert_eq!(count.get(), 0);
    }
}
