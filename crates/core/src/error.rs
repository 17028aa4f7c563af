//! Domain error taxonomy.
//!
//! Every fallible domain operation returns a [`CoreError`]. The API layer
//! maps these onto HTTP statuses; the variants are chosen so that the
//! mapping is unambiguous (bad input, throttled, stale state, unknown id,
//! unreachable upstream).

use crate::types::DbId;

/// Domain-level error shared across all crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed shape/size/type validation. Names the offending field.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// No entity with the given id exists.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A state transition was attempted against a stale or incompatible
    /// current state. The caller must re-fetch and decide.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The client exceeded its request budget for the current window.
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The object store or external content store is unreachable or failed.
    /// Eligible for caller-initiated retry; the sync adapter is idempotent.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invariant violation or unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] with a formatted message.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_names_the_field() {
        let err = CoreError::validation("rating", "must be between 1 and 5");
        assert_eq!(err.to_string(), "Invalid rating: must be between 1 and 5");
    }

    #[test]
    fn rate_limited_display_includes_retry_after() {
        let err = CoreError::RateLimited {
            retry_after_secs: 42,
        };
        assert!(err.to_string().contains("42"));
    }
}
