//! # unum Node
//!
//! The remote-node contract for unum, plus the value model it carries.
//!
//! This crate provides:
//! - `Value` and `Snapshot`: the scalar value model of a graph-store node,
//!   with metadata-key filtering
//! - `NodeHandle` / `NodeSet`: the capability set a store must expose
//!   (child navigation, put, persistent and one-shot listeners, child
//!   enumeration)
//! - `Subscription`: cancel-on-drop listener guard
//! - `MemoryGraph`: an in-process store implementing the contract, used by
//!   tests and demos
//! - `DetachedNode`: a no-op node for running without a store
//!
//! The store behind the contract is eventually consistent: `put` is
//! fire-and-forget, listeners observe echoes of the caller's own writes,
//! and delivery order across writers is whatever the store produces.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod detached;
mod handle;
mod memory;
mod path;
mod snapshot;
mod value;

pub use detached::DetachedNode;
pub use handle::{NodeCallback, NodeHandle, NodeSet, OnceCallback, Subscription};
pub use memory::MemoryGraph;
pub use path::{resolve, segments};
pub use snapshot::Snapshot;
pub use value::{Value, META_KEY};
