//! # Validation Module
//!
//! Invariant checks guarding the engine, plus input validators for names.
//!
//! ## Where the Checks Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Event Admission                                    │
//! │                                                                         │
//! │  contributions + declared total                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ensure_contributions_not_empty      → EmptyContributions              │
//! │  ensure_distinct_participants        → DuplicateParticipant            │
//! │  ensure_amount_matches_contributions → AmountMismatch                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Share Calculator                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ensure_shares_sum_to_zero           → SharesNotZeroSum                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Settlement Matcher                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use crate::error::{CoreError, CoreResult, ValidationError, ValidationResult};
use crate::money::Money;
use crate::share::ShareMap;
use crate::types::Contribution;

/// Maximum length of group and participant names.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a movement concept.
pub const MAX_CONCEPT_LEN: usize = 200;

// =============================================================================
// Invariant Checks
// =============================================================================

/// Rejects an event without contributions.
///
/// Must run before the Share Calculator, which divides by the number of
/// contributions.
pub fn ensure_contributions_not_empty(contributions: &[Contribution]) -> CoreResult<()> {
    if contributions.is_empty() {
        return Err(CoreError::EmptyContributions);
    }
    Ok(())
}

/// Rejects an event where a participant contributes more than once.
pub fn ensure_distinct_participants(contributions: &[Contribution]) -> CoreResult<()> {
    let mut seen = BTreeSet::new();
    for contribution in contributions {
        if !seen.insert(contribution.participant) {
            return Err(CoreError::DuplicateParticipant {
                participant: contribution.participant,
            });
        }
    }
    Ok(())
}

/// Contribution-sum validator.
///
/// Fails with `AmountMismatch` when the contributions do not add up to the
/// declared total, and with `AmountOverflow` when their sum is not
/// representable at all.
///
/// ## Example
/// ```rust
/// use splitify_core::validation::ensure_amount_matches_contributions;
/// use splitify_core::{Contribution, Money, ParticipantId};
///
/// let contributions = [
///     Contribution::new(ParticipantId::new(1), Money::from_minor(800)),
///     Contribution::new(ParticipantId::new(2), Money::from_minor(200)),
/// ];
/// assert!(ensure_amount_matches_contributions(Money::from_minor(1000), &contributions).is_ok());
/// assert!(ensure_amount_matches_contributions(Money::from_minor(999), &contributions).is_err());
/// ```
pub fn ensure_amount_matches_contributions(
    declared: Money,
    contributions: &[Contribution],
) -> CoreResult<()> {
    let contributed = Money::checked_sum(contributions.iter().map(|c| c.amount))
        .ok_or(CoreError::AmountOverflow)?;
    if contributed != declared {
        return Err(CoreError::AmountMismatch {
            declared,
            contributed,
        });
    }
    Ok(())
}

/// Zero-sum validator.
///
/// Fails with `SharesNotZeroSum` carrying the residual when the shares do not
/// cancel out, or `AmountOverflow` when the residual itself is out of range. Must run after share computation and before settlement.
pub fn ensure_shares_sum_to_zero(shares: &ShareMap) -> CoreResult<()> {
    let residual = shares.total()?;
    if !residual.is_zero() {
        return Err(CoreError::SharesNotZeroSum { residual });
    }
    Ok(())
}

// =============================================================================
// Input Validators
// =============================================================================

/// Validates an amount that may be zero but not negative.
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a group or participant name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a movement concept. Empty concepts are allowed.
pub fn validate_concept(concept: &str) -> ValidationResult<String> {
    let concept = concept.trim();

    if concept.chars().count() > MAX_CONCEPT_LEN {
        return Err(ValidationError::TooLong {
            field: "concept".to_string(),
            max: MAX_CONCEPT_LEN,
        });
    }

    Ok(concept.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
