//! Domain-specific error types and error handling.

mod types;

pub use types::VerificationError;

use thiserror::Error;

use crate::domain::entities::AuditStatus;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed input or configuration
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Store, gateway or lookup failure
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl DomainError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Audit status recording this error's precise kind
    pub fn audit_status(&self) -> AuditStatus {
        match self {
            Self::Validation { .. } => AuditStatus::ValidationError,
            Self::Internal { .. } => AuditStatus::InfrastructureError,
            Self::Verification(err) => err.audit_status(),
        }
    }

    /// The verification outcome, if this is one
    pub fn as_verification(&self) -> Option<&VerificationError> {
        match self {
            Self::Verification(err) => Some(err),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
