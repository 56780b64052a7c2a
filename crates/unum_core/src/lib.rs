//! # unum Core
//!
//! Bidirectional synchronization proxies between in-process reactive state
//! and a remote, eventually-consistent graph store.
//!
//! This crate provides:
//! - [`Connection`]: explicitly constructed store handle with
//!   `open`/`close` lifecycle and dot-path navigation
//! - [`SyncProxy`]: one local mirror object kept convergent with one
//!   remote node, with echo suppression and default-data seeding
//! - [`CollectionProxy`]: a keyed collection (add/update/remove) driven by
//!   per-child enumeration callbacks
//! - [`FieldBinding`]: one field of a proxy as a readable/writable scalar
//!   for two-way input binding
//! - [`DerivedView`]: a read-only transformed projection of a collection
//!
//! ## Key invariants
//!
//! - While a proxy applies a remote-origin update, local writes are
//!   silently dropped (echo suppression; lossy by contract)
//! - The store's reserved metadata key never reaches a local mirror
//! - Seeding never overwrites existing remote data
//! - After `destroy()`, remote callbacks no longer mutate the mirror and
//!   writes are no-ops
//!
//! Failures on the store side are absorbed and logged; the mirror keeps
//! its last-known-good value. Availability wins over strictness, matching
//! the store's own eventually-consistent philosophy.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod connection;
mod derived;
mod error;
mod field;
mod observers;
mod proxy;
mod seed;

pub use collection::{CollectionProxy, ID_FIELD, TEXT_FIELD};
pub use config::{CollectionConfig, ProxyConfig};
pub use connection::Connection;
pub use derived::DerivedView;
pub use error::{BindError, BindResult};
pub use field::FieldBinding;
pub use proxy::{MirrorReader, MirrorWriter, SyncProxy};
pub use seed::{seed_if_empty, when_empty};
