//! Dot-separated path navigation.

use crate::handle::NodeHandle;
use std::sync::Arc;

/// Splits a dot-separated path into its segments, dropping empty ones
/// (`"a..b."` navigates the same as `"a.b"`).
pub fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// Resolves a dot-separated path to a node handle by descending from
/// `root` one child per segment. An empty path returns `root` itself.
pub fn resolve(root: &Arc<dyn NodeHandle>, path: &str) -> Arc<dyn NodeHandle> {
    let mut node = Arc::clone(root);
    for segment in segments(path) {
        node = node.child(segment);
    }
    node
}
