//! Error types for port operations.

/// Entity-store failures with enough context to act on.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Backing store failed; `operation` names the call for tracing.
    #[error("Store error in {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn store(operation: &'static str, message: impl ToString) -> Self {
        Self::Store {
            operation,
            message: message.to_string(),
        }
    }

    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Reverse-geocoding failures. Callers degrade to a coordinate-named location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),
    #[error("Geocoding timed out")]
    Timeout,
    #[error("Geocoder returned no data for this point")]
    NoData,
    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),
}
