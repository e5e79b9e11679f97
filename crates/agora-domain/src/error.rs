//! Shared error taxonomy for the core engine
//!
//! Propagation policy: `Unauthorized`, `Forbidden`, `NotFound` and
//! `Validation` abort the operation and surface to the caller verbatim.
//! `Dependency` failures from the notification fan-out are swallowed (logged
//! only) by the fan-out itself and never reach this type from that path;
//! `Dependency` failures from asset upload abort content creation after
//! compensating cleanup.

use thiserror::Error;

/// Errors surfaced by the vote / acceptance / reputation core
#[derive(Error, Debug)]
pub enum CoreError {
    /// No actor, or the actor could not be resolved
    #[error("Unauthorized")]
    Unauthorized,

    /// The actor was identified but lacks rights for this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The target item or account does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, e.g. content below the minimum length
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Reserved; vote toggling absorbs what would otherwise conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An external collaborator (upload, notification, email) failed
    #[error("Dependency failure: {0}")]
    Dependency(String),

    /// The backing store failed
    #[error("Store error: {0}")]
    Store(String),
}

impl CoreError {
    /// Wrap a store-layer error, preserving its message
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        CoreError::Store(err.to_string())
    }

    /// Wrap an external-collaborator error, preserving its message
    pub fn dependency<E: std::fmt::Display>(err: E) -> Self {
        CoreError::Dependency(err.to_string())
    }

    /// A `Forbidden` with the given reason
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden(reason.into())
    }

    /// A `NotFound` naming the missing target
    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }
}
