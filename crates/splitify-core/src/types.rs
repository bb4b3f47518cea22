//! # Domain Types
//!
//! Identities, events and stored entities used throughout Splitify.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Group       │   │   Participant   │   │    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  group_id (FK)  │   │  group_id (FK)  │       │
//! │  │  name           │   │  name           │   │  amount, kind   │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │                 │
//! │                                          ┌────────────▼────────────┐   │
//! │                                          │  ParticipantMovement    │   │
//! │                                          │  movement_id (FK)       │   │
//! │                                          │  participant_id (FK)    │   │
//! │                                          │  amount                 │   │
//! │                                          └─────────────────────────┘   │
//! │                                                                         │
//! │  Engine input (validated, immutable):                                   │
//! │    ExpenseEvent { total, contributions }   TransferEvent { from, to }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are assigned by the store, sequentially from 1. The engine treats them
//! as opaque tokens whose only property is a total order, which the
//! settlement matcher uses to break ties deterministically.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation;

// =============================================================================
// Identities
// =============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[serde(transparent)]
        #[ts(export)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw id.
            #[inline]
            pub const fn new(raw: u64) -> Self {
                $name(raw)
            }

            /// Returns the raw id.
            #[inline]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies a group of people sharing expenses.
    GroupId
);
entity_id!(
    /// Identifies a participant, unique within the whole store.
    ParticipantId
);
entity_id!(
    /// Identifies a stored movement (expense or transfer).
    MovementId
);
entity_id!(
    /// Identifies one stored contribution to a movement.
    ParticipantMovementId
);

// =============================================================================
// Contribution
// =============================================================================

/// What one participant put into an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Contribution {
    pub participant: ParticipantId,
    pub amount: Money,
}

impl Contribution {
    pub fn new(participant: ParticipantId, amount: Money) -> Self {
        Contribution {
            participant,
            amount,
        }
    }
}

// =============================================================================
// Expense Event
// =============================================================================

/// An expense split equally among its contributors.
///
/// ## Invariants (checked by [`ExpenseEvent::new`])
/// - at least one contribution
/// - no negative total or contributed amount
/// - each participant contributes at most once
/// - sum of contributions == total
///
/// Contribution order is kept as given: the settlement matcher visits
/// debtors in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ExpenseEvent {
    total: Money,
    contributions: Vec<Contribution>,
}

impl ExpenseEvent {
    /// Validates and builds an expense event.
    ///
    /// ## Example
    /// ```rust
    /// use splitify_core::{Contribution, CoreError, ExpenseEvent, Money, ParticipantId};
    ///
    /// let p1 = ParticipantId::new(1);
    /// let p2 = ParticipantId::new(2);
    ///
    /// let ok = ExpenseEvent::new(
    ///     Money::from_minor(1000),
    ///     vec![Contribution::new(p1, Money::from_minor(1000)), Contribution::new(p2, Money::ZERO)],
    /// );
    /// assert!(ok.is_ok());
    ///
    /// let short = ExpenseEvent::new(
    ///     Money::from_minor(1000),
    ///     vec![Contribution::new(p1, Money::from_minor(900)), Contribution::new(p2, Money::ZERO)],
    /// );
    /// assert!(matches!(short, Err(CoreError::AmountMismatch { .. })));
    /// ```
    pub fn new(total: Money, contributions: Vec<Contribution>) -> CoreResult<Self> {
        validation::ensure_contributions_not_empty(&contributions)?;
        validation::validate_non_negative("total", total)?;
        for contribution in &contributions {
            validation::validate_non_negative("contribution", contribution.amount)?;
        }
        validation::ensure_distinct_participants(&contributions)?;
        validation::ensure_amount_matches_contributions(total, &contributions)?;

        Ok(ExpenseEvent {
            total,
            contributions,
        })
    }

    /// The declared total.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Contributions in the order they were given.
    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Participants of this event, ascending.
    pub fn participants(&self) -> BTreeSet<ParticipantId> {
        self.contributions.iter().map(|c| c.participant).collect()
    }
}

// =============================================================================
// Transfer Event
// =============================================================================

/// One participant gives a fixed amount directly to another.
///
/// No splitting happens: the giver is owed the full amount back and the
/// receiver owes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TransferEvent {
    amount: Money,
    from: ParticipantId,
    to: ParticipantId,
}

impl TransferEvent {
    /// Validates and builds a transfer event.
    ///
    /// ## Rules
    /// - amount must be positive
    /// - `from` and `to` must differ
    pub fn new(amount: Money, from: ParticipantId, to: ParticipantId) -> CoreResult<Self> {
        if !amount.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }
        if from == to {
            return Err(CoreError::SelfTransfer { participant: from });
        }

        Ok(TransferEvent { amount, from, to })
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn from(&self) -> ParticipantId {
        self.from
    }

    pub fn to(&self) -> ParticipantId {
        self.to
    }

    /// The transfer seen as an expense: the giver contributes everything,
    /// the receiver nothing.
    pub fn contributions(&self) -> [Contribution; 2] {
        [
            Contribution::new(self.from, self.amount),
            Contribution::new(self.to, Money::ZERO),
        ]
    }
}

// =============================================================================
// Event
// =============================================================================

/// Any event the engine can settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Expense(ExpenseEvent),
    Transfer(TransferEvent),
}

impl Event {
    /// Contributions in settlement order.
    pub fn contributions(&self) -> Cow<'_, [Contribution]> {
        match self {
            Event::Expense(expense) => Cow::Borrowed(expense.contributions()),
            Event::Transfer(transfer) => Cow::Owned(transfer.contributions().to_vec()),
        }
    }

    /// Total money moved by the event.
    pub fn total(&self) -> Money {
        match self {
            Event::Expense(expense) => expense.total(),
            Event::Transfer(transfer) => transfer.amount(),
        }
    }
}

impl From<ExpenseEvent> for Event {
    fn from(event: ExpenseEvent) -> Self {
        Event::Expense(event)
    }
}

impl From<TransferEvent> for Event {
    fn from(event: TransferEvent) -> Self {
        Event::Transfer(event)
    }
}

// =============================================================================
// Stored Entities
// =============================================================================

/// A set of participants sharing expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// A member of exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Participant {
    pub id: ParticipantId,
    pub group_id: GroupId,
    pub name: String,
}

/// How a stored movement is turned back into an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum MovementKind {
    /// Split equally among the movement's participant movements.
    Expense,
    /// Direct transfer between two participants.
    Transfer {
        from: ParticipantId,
        to: ParticipantId,
    },
}

/// A stored expense or transfer of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Movement {
    pub id: MovementId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub amount: Money,
    pub concept: String,
    pub kind: MovementKind,
}

/// A stored contribution of one participant to one movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParticipantMovement {
    pub id: ParticipantMovementId,
    pub movement_id: MovementId,
    pub participant_id: ParticipantId,
    pub amount: Money,
}

impl ParticipantMovement {
    /// The engine's view of this row.
    pub fn contribution(&self) -> Contribution {
        Contribution::new(self.participant_id, self.amount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
