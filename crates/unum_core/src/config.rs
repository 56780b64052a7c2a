//! Configuration for sync proxies.

use unum_node::Snapshot;

/// Configuration for an object-variant [`SyncProxy`](crate::SyncProxy).
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Default data, written to the remote node only when it is empty at
    /// construction time. Also the mirror's initial local value, so a
    /// detached proxy starts from the same state.
    pub seed: Option<Snapshot>,
}

impl ProxyConfig {
    /// Creates an empty configuration (no seed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default data.
    pub fn with_seed(mut self, seed: Snapshot) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Configuration for a [`CollectionProxy`](crate::CollectionProxy).
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Items written to an empty collection at construction time, one
    /// child put per item.
    pub seed_items: Vec<Snapshot>,
    /// When an incoming item has no usable `text`, synthesize an
    /// id-derived label (`"Item abc123"`) instead of the empty string.
    pub synthesize_text: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            seed_items: Vec::new(),
            synthesize_text: true,
        }
    }
}

impl CollectionConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed items.
    pub fn with_seed_items(mut self, items: Vec<Snapshot>) -> Self {
        self.seed_items = items;
        self
    }

    /// Enables or disables id-derived `text` synthesis.
    pub fn with_synthesize_text(mut self, synthesize: bool) -> Self {
        self.synthesize_text = synthesize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unum_node::Value;

    #[test]
    fn proxy_config_builder() {
        let config = ProxyConfig::new().with_seed(Snapshot::of([("count", Value::from(0i64))]));
        assert!(config.seed.is_some());
        assert!(ProxyConfig::default().seed.is_none());
    }

    #[test]
    fn collection_config_defaults() {
        let config = CollectionConfig::default();
        assert!(config.seed_items.is_empty());
        assert!(config.synthesize_text);

        let config = CollectionConfig::new()
            .with_seed_items(vec![Snapshot::of([("text", Value::from("hi"))])])
            .with_synthesize_text(false);
        assert_eq!(config.seed_items.len(), 1);
        assert!(!config.synthesize_text);
    }
}
