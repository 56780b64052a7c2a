//! Error types for the binding layer.

use thiserror::Error;

/// Result type for binding operations.
pub type BindResult<T> = Result<T, BindError>;

/// Errors surfaced by the binding layer.
///
/// Store-side failures never appear here: per the availability-first
/// policy they are absorbed and logged, and the local mirror keeps its
/// last-known-good value. What remains are local, synchronous conditions
/// a caller can act on.
#[derive(Error, Debug)]
pub enum BindError {
    /// The connection has been closed (or was never opened).
    #[error("store connection is closed")]
    ConnectionClosed,

    /// A collection operation referenced an id the local mirror does not
    /// hold. Advisory: a concurrent remote writer may add the id at any
    /// time.
    #[error("unknown collection item: {0}")]
    UnknownItem(String),
}
