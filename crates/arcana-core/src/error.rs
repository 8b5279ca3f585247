//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A session was not found in the store.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure error (poisoned lock, wiring failure).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
