//! # Store Error Types
//!
//! Error types for storage and ledger service operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError ──► CoreError (engine rejected the event)             │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  StoreError (this module) ← adds entity / membership context           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CliError (in the binary) ← printed to the user                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use splitify_core::{CoreError, MovementId, ValidationError};
use thiserror::Error;

/// Store and service errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - Unknown group, participant or movement id
    /// - Movement already removed
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A row references something it may not reference.
    ///
    /// ## When This Occurs
    /// - Contribution from a participant of another group
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored movement could not be settled when computing balances.
    ///
    /// The whole balance query fails; nothing is partially accumulated.
    #[error("Movement {movement_id} cannot be settled: {source}")]
    RejectedMovement {
        movement_id: MovementId,
        source: CoreError,
    },

    /// The engine rejected an event at admission.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a ForeignKeyViolation error.
    pub fn foreign_key(message: impl Into<String>) -> Self {
        StoreError::ForeignKeyViolation {
            message: message.into(),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Core(err.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use splitify_core::Money;

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreError::not_found("Group", 7).to_string(),
            "Group not found: 7"
        );

        let rejected = StoreError::RejectedMovement {
            movement_id: MovementId::new(3),
            source: CoreError::SharesNotZeroSum {
                residual: Money::from_minor(1),
            },
        };
        assert_eq!(
            rejected.to_string(),
            "Movement 3 cannot be settled: Shares do not sum to zero (residual 0.01)"
        );
    }

    #[test]
    fn test_validation_converts_through_core() {
        let err: StoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }
}
