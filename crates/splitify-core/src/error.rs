//! # Error Types
//!
//! Domain-specific error types for splitify-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  splitify-core errors (this file)                                      │
//! │  ├── CoreError        - Event rejected by the engine                   │
//! │  └── ValidationError  - Input shape failures                           │
//! │                                                                         │
//! │  splitify-store errors (separate crate)                                │
//! │  └── StoreError       - Unknown ids, foreign keys, rejected movements  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → CLI                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check is local, synchronous and non-retryable: an error means the
//! input is malformed, never that something transient failed.

use thiserror::Error;

use crate::money::Money;
use crate::types::ParticipantId;

// =============================================================================
// Core Error
// =============================================================================

/// Reasons an event is not admitted to the ledger.
///
/// There is no partial success: an event either produces shares and a
/// settlement, or it produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The declared total differs from the sum of the contributions.
    ///
    /// ## When This Occurs
    /// ```text
    /// total = 1000
    /// contributions = [(P1, 600), (P2, 300)]   → sum 900
    ///      │
    ///      ▼
    /// AmountMismatch { declared: 1000, contributed: 900 }
    /// ```
    /// Raised before any share is computed.
    #[error("Event total {declared} does not match the sum of contributions {contributed}")]
    AmountMismatch { declared: Money, contributed: Money },

    /// The computed shares do not sum to zero.
    ///
    /// ## When This Occurs
    /// - The total does not divide evenly among the participants and the
    ///   remainder policy is `Reject`
    /// - Upstream data corruption
    ///
    /// Admitting such an event would corrupt every downstream total.
    #[error("Shares do not sum to zero (residual {residual})")]
    SharesNotZeroSum { residual: Money },

    /// A sum of amounts does not fit in the money range.
    ///
    /// Raised instead of wrapping around, for example when contributions
    /// add up past `i64::MAX` minor units or when accumulated balances
    /// leave the range.
    #[error("Amounts exceed the representable range")]
    AmountOverflow,

    /// An expense event without contributions cannot be split.
    #[error("Event has no contributions")]
    EmptyContributions,

    /// The same participant contributes twice to one event.
    #[error("Participant {participant} contributes more than once")]
    DuplicateParticipant { participant: ParticipantId },

    /// A transfer whose giver and receiver are the same participant.
    #[error("Participant {participant} cannot transfer to themselves")]
    SelfTransfer { participant: ParticipantId },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation of names and amounts before any business logic
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AmountMismatch {
            declared: Money::from_minor(1000),
            contributed: Money::from_minor(900),
        };
        assert_eq!(
            err.to_string(),
            "Event total 10.00 does not match the sum of contributions 9.00"
        );

        let err = CoreError::SharesNotZeroSum {
            residual: Money::from_minor(-1),
        };
        assert_eq!(err.to_string(), "Shares do not sum to zero (residual -0.01)");

        let err = CoreError::DuplicateParticipant {
            participant: ParticipantId::new(3),
        };
        assert_eq!(err.to_string(), "Participant 3 contributes more than once");

        assert_eq!(
            CoreError::AmountOverflow.to_string(),
            "Amounts exceed the representable range"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "concept".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "concept must be at most 200 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
