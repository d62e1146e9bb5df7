//! Error types for the nuages module.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by [`NuagesApi`](crate::NuagesApi).
#[derive(Debug, Error)]
pub enum NuagesError {
    /// No record exists with this id.
    #[error("nuage not found: {id}")]
    NotFound { id: Uuid },

    /// A record with this name already exists.
    #[error("a nuage named '{name}' already exists")]
    Conflict { name: String },

    /// The request violated the module's limits.
    #[error("validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    /// A call to the cluster API failed.
    #[error("cluster unavailable during {operation}: {message}")]
    UpstreamUnavailable { operation: String, message: String },

    /// The record store failed.
    #[error("store error")]
    Store,
}

impl NuagesError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
