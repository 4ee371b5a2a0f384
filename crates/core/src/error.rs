//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only. Storage and transport failures are
/// modelled by the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or incomplete input, rejected before any store access.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A transfer whose units are not all present at the claimed source.
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    /// An identifier was invalid (e.g. blank or non-positive).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The requested unit is not live in any warehouse.
    #[error("not found")]
    NotFound,

    /// The operation would break a uniqueness rule (e.g. unit already in stock).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_transfer(msg: impl Into<String>) -> Self {
        Self::InvalidTransfer(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
