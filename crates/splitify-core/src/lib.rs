//! # splitify-core: Pure Settlement Engine for Splitify
//!
//! This crate decides who owes whom. Given events (shared expenses and
//! direct transfers) it computes each participant's net position and a
//! debtor → creditor map, then folds many events into one balance report.
//! It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Splitify Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    splitify CLI (apps/cli)                      │   │
//! │  │    ledger file ──► service calls ──► text / json report         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                splitify-store (Ledger Service)                  │   │
//! │  │     groups, participants, movements, in-memory repositories     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ splitify-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   share   │  │ settlement│  │   ledger   │  │ validation│  │   │
//! │  │   │  ShareMap │  │ DebitCred │  │  Engine    │  │ zero-sum  │  │   │
//! │  │   │ equal/xfer│  │ netting   │  │  Report    │  │ amounts   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO LOGGING • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ids, contributions, events and stored entities
//! - [`money`] - Money type with integer arithmetic
//! - [`share`] - Share Calculator and the share map
//! - [`settlement`] - Settlement Matcher and the debit/credit map
//! - [`ledger`] - Settlement engine and balance reports
//! - [`validation`] - Invariant checks and input validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use splitify_core::{Contribution, CoreError, ExpenseEvent, Money, ParticipantId, SettlementEngine};
//!
//! let p1 = ParticipantId::new(1);
//! let p2 = ParticipantId::new(2);
//! let p3 = ParticipantId::new(3);
//!
//! // P1 pays 700 and P2 pays 200 of a 900 dinner; P3 pays nothing.
//! let dinner = ExpenseEvent::new(
//!     Money::from_minor(900),
//!     vec![
//!         Contribution::new(p1, Money::from_minor(700)),
//!         Contribution::new(p2, Money::from_minor(200)),
//!         Contribution::new(p3, Money::ZERO),
//!     ],
//! )
//! .unwrap();
//!
//! let settlement = SettlementEngine::new().settle_expense(&dinner).unwrap();
//! assert_eq!(settlement.debit_credit.amount_owed(p2, p1), Some(Money::from_minor(100)));
//! assert_eq!(settlement.debit_credit.amount_owed(p3, p1), Some(Money::from_minor(300)));
//!
//! // Contributions must add up to the declared total.
//! let bad = ExpenseEvent::new(Money::from_minor(900), vec![Contribution::new(p1, Money::from_minor(800))]);
//! assert!(matches!(bad, Err(CoreError::AmountMismatch { .. })));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod settlement;
pub mod share;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationResult};
pub use ledger::{BalanceReport, ParsePolicyError, RemainderPolicy, Settlement, SettlementEngine};
pub use money::Money;
pub use settlement::{DebitCreditMap, Obligation};
pub use share::ShareMap;
pub use types::*;
