//! Internal observer registry shared by the proxy family.
//!
//! Register, notify with no lock held, prune on unsubscribe. Observers are
//! cloned out before invocation so a callback may subscribe, unsubscribe,
//! or write back into its proxy without deadlocking.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use unum_node::Subscription;

pub(crate) type Observer<A> = Arc<dyn Fn(&A) + Send + Sync>;

pub(crate) struct Observers<A> {
    callbacks: RwLock<Vec<(u64, Observer<A>)>>,
    next_id: AtomicU64,
}

impl<A: 'static> Observers<A> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            callbacks: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        })
    }

    /// Registers an observer; the guard unregisters it again.
    pub fn register(registry: &Arc<Self>, callback: Observer<A>) -> Subscription {
        let id = registry.next_id.fetch_add(1, Ordering::SeqCst);
        registry.callbacks.write().push((id, callback));

        let weak = Arc::downgrade(registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry
                    .callbacks
                    .write()
                    .retain(|(observer_id, _)| *observer_id != id);
            }
        })
    }

    /// Invokes every observer with `value`, outside the registry lock.
    pub fn notify(&self, value: &A) {
        let observers: Vec<Observer<A>> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(value);
        }
    }

    pub fn clear(&self) {
        self.callbacks.write().clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn notify_reaches_all_observers() {
        let observers: Arc<Observers<u32>> = Observers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s1 = Arc::clone(&seen);
        let _a = Observers::register(&observers, Arc::new(move |v| s1.lock().push(*v)));
        let s2 = Arc::clone(&seen);
        let _b = Observers::register(&observers, Arc::new(move |v| s2.lock().push(*v * 10)));

        observers.notify(&3);
        let mut got = seen.lock().clone();
        got.sort_unstable();
        assert_eq!(got, vec![3, 30]);
    }

    #[test]
    fn dropping_guard_unregisters() {
        let observers: Arc<Observers<u32>> = Observers::new();
        let seen = Arc::new(Mutex::new(0u32));

        let sink = Arc::clone(&seen);
        let sub = Observers::register(&observers, Arc::new(move |_| *sink.lock() += 1));
        assert_eq!(observers.len(), 1);

        observers.notify(&1);
        drop(sub);
        assert_eq!(observers.len(), 0);

        observers.notify(&2);
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn observer_may_unsubscribe_itself_during_notify() {
        let observers: Arc<Observers<u32>> = Observers::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let held = Arc::clone(&slot);
        let sub = Observers::register(
            &observers,
            Arc::new(move |_| {
                // Take and drop our own guard from inside delivery.
                held.lock().take();
            }),
        );
        *slot.lock() = Some(sub);

        observers.notify(&1);
        assert_eq!(observers.len(), 0);
    }
}
