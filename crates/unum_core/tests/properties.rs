//! Property tests for mirror convergence and metadata filtering.

use proptest::prelude::*;
use unum_core::{ProxyConfig, SyncProxy};
use unum_node::{MemoryGraph, META_KEY};
use unum_testkit::{snapshot_strategy, snapshot_with_meta_strategy, PropTestConfig};

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn write_then_echo_converges_to_the_written_data(data in snapshot_strategy(8)) {
        let graph = MemoryGraph::new();
        let proxy = SyncProxy::new(graph.node("doc"), ProxyConfig::default());

        proxy.write(data.clone());

        // The store echoes synchronously; the mirror must equal the write.
        prop_assert_eq!(proxy.snapshot(), data);
    }

    #[test]
    fn mirror_never_contains_the_metadata_key(data in snapshot_with_meta_strategy(8)) {
        let graph = MemoryGraph::new();
        let proxy = SyncProxy::new(graph.node("doc"), ProxyConfig::default());

        graph.node("doc").put(Some(data.clone()));

        let mirror = proxy.snapshot();
        prop_assert!(!mirror.contains_key(META_KEY));
        prop_assert_eq!(mirror, data.without_meta());
    }

    #[test]
    fn mirror_tracks_per_field_merge_of_foreign_writes(
        first in snapshot_strategy(6),
        second in snapshot_strategy(6),
    ) {
        let graph = MemoryGraph::new();
        let proxy = SyncProxy::new(graph.node("doc"), ProxyConfig::default());

        graph.node("doc").put(Some(first.clone()));
        graph.node("doc").put(Some(second.clone()));

        let mut expected = first;
        expected.merge(&second);
        prop_assert_eq!(proxy.snapshot(), expected);
    }
}
