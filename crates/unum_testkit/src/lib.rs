//! # unum Testkit
//!
//! Test utilities for the unum workspace.
//!
//! This crate provides:
//! - [`RecordingNode`] / [`PutLog`]: a spy wrapper around any node handle
//!   that records every `put` with its path
//! - snapshot fixtures (`snapshot`, `todo_item`, `from_json`)
//! - proptest strategies for values, data keys, and snapshots

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fixtures;
mod generators;
mod spy;

pub use fixtures::{from_json, snapshot, todo_item};
pub use generators::{
    data_key_strategy, snapshot_strategy, snapshot_with_meta_strategy, value_strategy,
    PropTestConfig,
};
pub use spy::{PutLog, PutRecord, RecordingNode};
