use nuages_sdk::NuagesError;
use uuid::Uuid;

use super::cluster::ClusterError;
use super::repo::RepositoryError;

/// Domain-level errors for the nuages coordinator.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("nuage not found: {id}")]
    NotFound { id: Uuid },

    #[error("a nuage named '{name}' already exists")]
    NameConflict { name: String },

    #[error("validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("cluster unavailable during {operation}: {message}")]
    UpstreamUnavailable {
        operation: &'static str,
        message: String,
    },

    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    #[must_use]
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    #[must_use]
    pub fn upstream(operation: &'static str, err: &ClusterError) -> Self {
        Self::UpstreamUnavailable {
            operation,
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for DomainError {
    fn from(e: RepositoryError) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<DomainError> for NuagesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { id } => Self::NotFound { id },
            DomainError::NameConflict { name } => Self::Conflict { name },
            DomainError::Validation { field, message } => Self::Validation { field, message },
            DomainError::UpstreamUnavailable { operation, message } => Self::UpstreamUnavailable {
                operation: operation.to_owned(),
                message,
            },
            DomainError::Store(_) => Self::Store,
        }
    }
}
