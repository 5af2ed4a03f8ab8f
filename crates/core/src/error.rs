//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, unresolvable references). Infrastructure concerns belong elsewhere.
///
/// "No qualifying discount" is never an error; it is a zero amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A discount tier was created without a usable threshold or percent.
    #[error("invalid discount tier: {0}")]
    InvalidTier(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced invoice, merchant, item or line item could not be resolved.
    #[error("{entity} not found: {id}")]
    MissingInput { entity: &'static str, id: String },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_tier(msg: impl Into<String>) -> Self {
        Self::InvalidTier(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn missing(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::MissingInput {
            entity,
            id: id.to_string(),
        }
    }

    /// True for unresolvable references (invoice, merchant, line item, ...).
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_names_entity_and_id() {
        let err = DomainError::missing("invoice", 42);
        assert!(err.is_missing_input());
        assert_eq!(err.to_string(), "invoice not found: 42");
    }

    #[test]
    fn invalid_tier_is_not_missing_input() {
        let err = DomainError::invalid_tier("percent must be in (0, 100]");
        assert!(!err.is_missing_input());
        assert_eq!(
            err.to_string(),
            "invalid discount tier: percent must be in (0, 100]"
        );
    }
}
