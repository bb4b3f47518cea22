//! # Ledger
//!
//! Ties the Share Calculator, the invariant checks and the Settlement Matcher
//! together, and folds per-event results into a running balance.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Event ──► validate ──► shares ──► zero-sum? ──► netting ──► Settlement │
//! │              │                        │                        │        │
//! │              ▼                        ▼                        ▼        │
//! │        AmountMismatch         SharesNotZeroSum         BalanceReport    │
//! │        (rejected)             (rejected)               .absorb(...)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use splitify_core::{Contribution, ExpenseEvent, Money, ParticipantId, SettlementEngine};
//!
//! let p1 = ParticipantId::new(1);
//! let p2 = ParticipantId::new(2);
//! let engine = SettlementEngine::new();
//!
//! let lunch = ExpenseEvent::new(
//!     Money::from_minor(1000),
//!     vec![Contribution::new(p1, Money::from_minor(1000)), Contribution::new(p2, Money::ZERO)],
//! )
//! .unwrap();
//! let dinner = ExpenseEvent::new(
//!     Money::from_minor(1000),
//!     vec![Contribution::new(p1, Money::from_minor(800)), Contribution::new(p2, Money::from_minor(200))],
//! )
//! .unwrap();
//!
//! let report = engine.report([&lunch.into(), &dinner.into()]).unwrap();
//! assert_eq!(report.debit_credit.amount_owed(p2, p1), Some(Money::from_minor(800)));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::settlement::{build_debit_credit_map, DebitCreditMap};
use crate::share::{compute_equal_shares, compute_transfer_shares, ShareMap};
use crate::types::{Contribution, Event, ExpenseEvent, TransferEvent};
use crate::validation;

// =============================================================================
// Remainder Policy
// =============================================================================

/// What to do with the remainder an equal split leaves behind.
///
/// ```text
/// total 1000 among 3 → 333 each, 1 unit unassigned
///
///   Reject            → SharesNotZeroSum { residual: 1 }, event not admitted
///   AssignToLowestId  → lowest participant id absorbs the 1 unit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RemainderPolicy {
    /// Fail the zero-sum check.
    #[default]
    Reject,

    /// Subtract the residual from the lowest participant id's share.
    AssignToLowestId,
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainderPolicy::Reject => write!(f, "reject"),
            RemainderPolicy::AssignToLowestId => write!(f, "assign_to_lowest_id"),
        }
    }
}

/// Error returned when parsing an unknown remainder policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown remainder policy: '{0}'. Valid options: reject, assign_to_lowest_id")]
pub struct ParsePolicyError(String);

impl FromStr for RemainderPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reject" | "strict" => Ok(RemainderPolicy::Reject),
            "assign_to_lowest_id" | "lowest_id" => Ok(RemainderPolicy::AssignToLowestId),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// Result of settling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Settlement {
    /// Net position of each participant.
    pub shares: ShareMap,
    /// Who owes whom for this event alone.
    pub debit_credit: DebitCreditMap,
}

// =============================================================================
// Balance Report
// =============================================================================

/// Running totals over many settled events.
///
/// Built by absorbing [`Settlement`]s one at a time; the order does not
/// change the result since both merges are associative and commutative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct BalanceReport {
    /// Sum of every event's shares.
    pub shares: ShareMap,
    /// Sum of every event's independently settled obligations.
    pub debit_credit: DebitCreditMap,
    /// Number of events folded in.
    pub events: usize,
}

impl BalanceReport {
    /// An empty report.
    pub fn new() -> Self {
        BalanceReport::default()
    }

    /// Folds one more settled event into the totals.
    ///
    /// On `AmountOverflow` the report is left as it was.
    pub fn absorb(&mut self, settlement: &Settlement) -> CoreResult<()> {
        let shares = self.shares.merge(&settlement.shares)?;
        let debit_credit = self.debit_credit.merge(&settlement.debit_credit)?;
        self.shares = shares;
        self.debit_credit = debit_credit;
        self.events += 1;
        Ok(())
    }

    /// Combines two partial reports.
    pub fn merge(&self, other: &BalanceReport) -> CoreResult<BalanceReport> {
        Ok(BalanceReport {
            shares: self.shares.merge(&other.shares)?,
            debit_credit: self.debit_credit.merge(&other.debit_credit)?,
            events: self.events + other.events,
        })
    }

    /// Settles the accumulated shares in one pass instead of summing the
    /// per-event settlements.
    ///
    /// Debtors are visited in ascending id order. This generally yields
    /// fewer obligations than [`BalanceReport::debit_credit`], and the two
    /// are not guaranteed to be equal.
    pub fn consolidated(&self) -> DebitCreditMap {
        let order: Vec<Contribution> = self
            .shares
            .participants()
            .map(|participant| Contribution::new(participant, self.shares.share_of(participant)))
            .collect();
        build_debit_credit_map(&order, &self.shares)
    }
}

// =============================================================================
// Settlement Engine
// =============================================================================

/// Stateless settlement engine.
///
/// Holds only configuration; every method is a pure function of its
/// arguments, so one engine can be shared freely between callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementEngine {
    remainder_policy: RemainderPolicy,
}

impl SettlementEngine {
    /// Engine with the default `Reject` remainder policy.
    pub fn new() -> Self {
        SettlementEngine::default()
    }

    /// Sets the remainder policy.
    pub fn remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.remainder_policy = policy;
        self
    }

    /// The configured remainder policy.
    pub fn policy(&self) -> RemainderPolicy {
        self.remainder_policy
    }

    /// Computes the zero-sum shares of an expense.
    ///
    /// Runs the contribution-sum validator first and the zero-sum validator
    /// last, with the remainder policy applied in between.
    pub fn expense_shares(&self, event: &ExpenseEvent) -> CoreResult<ShareMap> {
        validation::ensure_amount_matches_contributions(event.total(), event.contributions())?;

        let mut shares = compute_equal_shares(event.total(), event.contributions())?;
        if self.remainder_policy == RemainderPolicy::AssignToLowestId {
            shares.assign_residual_to_lowest_id()?;
        }

        validation::ensure_shares_sum_to_zero(&shares)?;
        Ok(shares)
    }

    /// Settles an expense split equally among its contributors.
    pub fn settle_expense(&self, event: &ExpenseEvent) -> CoreResult<Settlement> {
        let shares = self.expense_shares(event)?;
        let debit_credit = build_debit_credit_map(event.contributions(), &shares);
        Ok(Settlement {
            shares,
            debit_credit,
        })
    }

    /// Settles a direct transfer.
    pub fn settle_transfer(&self, event: &TransferEvent) -> CoreResult<Settlement> {
        let shares = compute_transfer_shares(event.amount(), event.from(), event.to());
        validation::ensure_shares_sum_to_zero(&shares)?;
        let debit_credit = build_debit_credit_map(&event.contributions(), &shares);
        Ok(Settlement {
            shares,
            debit_credit,
        })
    }

    /// Settles any event.
    pub fn settle(&self, event: &Event) -> CoreResult<Settlement> {
        match event {
            Event::Expense(expense) => self.settle_expense(expense),
            Event::Transfer(transfer) => self.settle_transfer(transfer),
        }
    }

    /// Settles every event in order and folds the results.
    ///
    /// All or nothing: the first rejected event, or a running total that
    /// leaves the money range, aborts the report.
    pub fn report<'a, I>(&self, events: I) -> CoreResult<BalanceReport>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut report = BalanceReport::new();
        for event in events {
            report.absorb(&self.settle(event)?)?;
        }
        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
