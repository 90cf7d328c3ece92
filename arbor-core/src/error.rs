//! Error types for arbor-core

use thiserror::Error;

use crate::ident::Ident;
use crate::store::StoreKind;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
///
/// Absence ("no such child") is never an error: lookups return `Option`.
/// These variants cover contract violations and structural failures only,
/// and every mutating operation that returns one leaves the store in its
/// pre-call state.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A handle referred to a slot that has since been freed or reused
    #[error("stale handle: {0}")]
    StaleHandle(String),

    /// Record is not reachable from the root (no owning store chain)
    #[error("detached record: {0}")]
    Detached(String),

    /// Insert would create a second child with the same identifier
    #[error("duplicate name in dictionary store: {0}")]
    DuplicateName(Ident),

    /// Insert would create an exact duplicate under the store comparator
    #[error("duplicate entry under comparator")]
    DuplicateEntry,

    /// Mutation attempted on a sealed store
    #[error("store is sealed")]
    Sealed,

    /// Auto-id counter moved backwards or past the reserved maximum
    #[error("auto-id violation: {0}")]
    AutoId(String),

    /// Operation not supported by this back-end
    #[error("{op} not supported by {kind} store")]
    Unsupported {
        kind: StoreKind,
        op: &'static str,
    },

    /// Record has no child store
    #[error("record has no child store: {0}")]
    NoChildStore(String),

    /// Record is already owned by a store
    #[error("record already attached: {0}")]
    AlreadyAttached(String),

    /// Record is not owned by the expected store
    #[error("record not attached: {0}")]
    NotAttached(String),

    /// Identifier text rejected by the codec
    #[error("invalid identifier: {0}")]
    InvalidIdent(String),

    /// Store configured inconsistently (missing comparator, bad kind/discipline pairing)
    #[error("store configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a stale-handle error
    pub fn stale(msg: impl Into<String>) -> Self {
        Error::StaleHandle(msg.into())
    }

    /// Create a detached-record error
    pub fn detached(msg: impl Into<String>) -> Self {
        Error::Detached(msg.into())
    }

    /// Create an auto-id violation error
    pub fn auto_id(msg: impl Into<String>) -> Self {
        Error::AutoId(msg.into())
    }

    /// Create a no-child-store error
    pub fn no_child_store(msg: impl Into<String>) -> Self {
        Error::NoChildStore(msg.into())
    }

    /// Create an already-attached error
    pub fn already_attached(msg: impl Into<String>) -> Self {
        Error::AlreadyAttached(msg.into())
    }

    /// Create a not-attached error
    pub fn not_attached(msg: impl Into<String>) -> Self {
        Error::NotAttached(msg.into())
    }

    /// Create an invalid-identifier error
    pub fn invalid_ident(msg: impl Into<String>) -> Self {
        Error::InvalidIdent(msg.into())
    }
}
