//! Unified error types for the domain layer
//!
//! Date parsing never surfaces through this type: parse failures are carried
//! as data on `ParsedDate` so a single bad event cannot abort a whole pass.

use thiserror::Error;

use crate::ids::LocationId;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Reparenting would make a location its own ancestor
    #[error("Circular reference: location {location_id} cannot be moved under {new_parent_id}")]
    CircularReference {
        location_id: LocationId,
        new_parent_id: LocationId,
    },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if name.trim().is_empty() {
    ///     return Err(DomainError::validation("Event name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create a circular reference error
    pub fn circular_reference(location_id: LocationId, new_parent_id: LocationId) -> Self {
        Self::CircularReference {
            location_id,
            new_parent_id,
        }
    }

    /// Check if this is a circular reference error.
    pub fn is_circular_reference(&self) -> bool {
        matches!(self, Self::CircularReference { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("name cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: name cannot be empty");
    }

    #[test]
    fn test_circular_reference_error() {
        let a = LocationId::new();
        let b = LocationId::new();
        let err = DomainError::circular_reference(a, b);
        assert!(err.is_circular_reference());
        assert!(err.to_string().contains(&a.to_string()));
        assert!(err.to_string().contains(&b.to_string()));
    }
}
