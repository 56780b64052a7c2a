//! Default-data seeding.
//!
//! First bind to a path wins the right to initialize it: if the remote
//! node holds no application data (nothing, or only the store's metadata
//! key), the defaults are written. Seeding never overwrites existing data.
//!
//! The check is optimistic: two parties seeding the same empty path
//! concurrently both pass it and both write, and the store's last put
//! wins. That race is a documented correctness gap of this layer, not an
//! error — resolving it would need a store-side compare-and-set the node
//! contract does not offer. A `once` that never fires (detached store)
//! leaves the defaults unwritten.

use std::sync::Arc;
use unum_node::{NodeHandle, Snapshot};

/// Runs `action` once if the node currently holds no application data.
///
/// "No application data" means the one-shot read returned nothing, or a
/// snapshot whose only key is the store's metadata key.
pub fn when_empty(node: &Arc<dyn NodeHandle>, action: impl FnOnce() + Send + 'static) {
    node.once(Box::new(move |snapshot, _key| {
        let empty = snapshot.map(Snapshot::is_empty_data).unwrap_or(true);
        if empty {
            action();
        }
    }));
}

/// Writes `defaults` to the node if it is empty at read time.
pub fn seed_if_empty(node: &Arc<dyn NodeHandle>, defaults: Snapshot) {
    let target = Arc::clone(node);
    when_empty(node, move || {
        tracing::debug!(key = %target.key(), "seeding empty node with default data");
        target.put(Some(defaults));
    });
}
