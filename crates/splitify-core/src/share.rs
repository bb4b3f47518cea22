//! # Share Calculator
//!
//! Turns an event's contributions into each participant's net position.
//!
//! ## Sign Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  share > 0  → the participant is OWED money (paid more than their part) │
//! │  share < 0  → the participant OWES money (paid less than their part)    │
//! │  share = 0  → settled                                                   │
//! │                                                                         │
//! │  Example: total 1000, four participants → equal share 250               │
//! │                                                                         │
//! │    P1 paid 400 → +150                                                   │
//! │    P2 paid 400 → +150                                                   │
//! │    P3 paid   0 → -250                                                   │
//! │    P4 paid 200 →  -50                                                   │
//! │                  ─────                                                  │
//! │                     0   (conservation)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Contribution, ParticipantId};

// =============================================================================
// Share Map
// =============================================================================

/// Signed net amount per participant.
///
/// Backed by a `BTreeMap`, so iteration is always in ascending participant
/// id order. For a single well-formed event (and for any sum of such
/// events) the values add up to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ShareMap(BTreeMap<ParticipantId, Money>);

impl ShareMap {
    /// Creates an empty share map.
    pub fn new() -> Self {
        ShareMap(BTreeMap::new())
    }

    /// Share of one participant, `None` if they are not part of the map.
    pub fn get(&self, participant: ParticipantId) -> Option<Money> {
        self.0.get(&participant).copied()
    }

    /// Share of one participant, zero if absent.
    pub fn share_of(&self, participant: ParticipantId) -> Money {
        self.get(participant).unwrap_or(Money::ZERO)
    }

    /// Sets the share of a participant, returning the previous one.
    pub fn insert(&mut self, participant: ParticipantId, share: Money) -> Option<Money> {
        self.0.insert(participant, share)
    }

    /// Number of participants in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all shares. Zero for a well-formed map.
    ///
    /// `AmountOverflow` if the sum is out of range.
    pub fn total(&self) -> CoreResult<Money> {
        Money::checked_sum(self.0.values().copied()).ok_or(CoreError::AmountOverflow)
    }

    /// Participants in ascending id order.
    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.0.keys().copied()
    }

    /// `(participant, share)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, Money)> + '_ {
        self.0.iter().map(|(participant, share)| (*participant, *share))
    }

    /// Participants with a positive share, ascending.
    pub fn creditors(&self) -> impl Iterator<Item = (ParticipantId, Money)> + '_ {
        self.iter().filter(|(_, share)| share.is_positive())
    }

    /// Participants with a negative share, ascending.
    pub fn debtors(&self) -> impl Iterator<Item = (ParticipantId, Money)> + '_ {
        self.iter().filter(|(_, share)| share.is_negative())
    }

    /// Adds every share of `other` into this map.
    ///
    /// Participants present in only one map keep their share; participants in
    /// both get the sum. Zero shares are kept so the map still lists everyone
    /// who took part.
    ///
    /// On `AmountOverflow` the map is left as it was.
    pub fn absorb(&mut self, other: &ShareMap) -> CoreResult<()> {
        let updated = other
            .iter()
            .map(|(participant, share)| {
                self.share_of(participant)
                    .checked_add(share)
                    .map(|sum| (participant, sum))
                    .ok_or(CoreError::AmountOverflow)
            })
            .collect::<CoreResult<Vec<_>>>()?;
        self.0.extend(updated);
        Ok(())
    }

    /// Merges two share maps into a new one.
    ///
    /// Associative and commutative, with the empty map as identity.
    ///
    /// ## Example
    /// ```rust
    /// use splitify_core::{Money, ParticipantId, ShareMap};
    ///
    /// let p1 = ParticipantId::new(1);
    /// let p2 = ParticipantId::new(2);
    ///
    /// let a: ShareMap = [(p1, Money::from_minor(500)), (p2, Money::from_minor(-500))].into_iter().collect();
    /// let b: ShareMap = [(p1, Money::from_minor(300)), (p2, Money::from_minor(-300))].into_iter().collect();
    ///
    /// let merged = a.merge(&b).unwrap();
    /// assert_eq!(merged.share_of(p1), Money::from_minor(800));
    /// assert_eq!(merged.share_of(p2), Money::from_minor(-800));
    /// ```
    pub fn merge(&self, other: &ShareMap) -> CoreResult<ShareMap> {
        let mut merged = self.clone();
        merged.absorb(other)?;
        Ok(merged)
    }

    /// Moves the truncation residual onto the lowest participant id so the
    /// map sums to zero. Returns the residual that was absorbed.
    ///
    /// ```text
    /// total 1000, three participants → equal share 333
    ///   P1 paid 1000 → +667
    ///   P2 paid    0 → -333
    ///   P3 paid    0 → -333
    ///   residual     =   +1  → P1 becomes +666
    /// ```
    pub fn assign_residual_to_lowest_id(&mut self) -> CoreResult<Money> {
        let residual = self.total()?;
        if residual.is_zero() {
            return Ok(residual);
        }
        if let Some(share) = self.0.values_mut().next() {
            *share = share.checked_sub(residual).ok_or(CoreError::AmountOverflow)?;
        }
        Ok(residual)
    }
}

impl FromIterator<(ParticipantId, Money)> for ShareMap {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, Money)>>(iter: I) -> Self {
        ShareMap(iter.into_iter().collect())
    }
}

impl IntoIterator for ShareMap {
    type Item = (ParticipantId, Money);
    type IntoIter = btree_map::IntoIter<ParticipantId, Money>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Share Computation
// =============================================================================

/// Computes shares for an equally split expense.
///
/// `equal_share = total / len(contributions)` with truncating division, then
/// `share[p] = contributed[p] - equal_share`.
///
/// ## Truncation Residual
/// When `total` does not divide evenly the result does not sum to zero: up
/// to `len - 1` units are missing. This function does NOT compensate; the
/// zero-sum validator reports the residual.
///
/// ## Errors
/// `EmptyContributions` when there is nothing to divide by, `AmountOverflow`
/// when a share is out of range (only possible for unvalidated input).
///
/// ## Example
/// ```rust
/// use splitify_core::share::compute_equal_shares;
/// use splitify_core::{Contribution, Money, ParticipantId};
///
/// let p1 = ParticipantId::new(1);
/// let p2 = ParticipantId::new(2);
/// let shares = compute_equal_shares(
///     Money::from_minor(1000),
///     &[Contribution::new(p1, Money::from_minor(800)), Contribution::new(p2, Money::from_minor(200))],
/// )
/// .unwrap();
///
/// assert_eq!(shares.share_of(p1), Money::from_minor(300));
/// assert_eq!(shares.share_of(p2), Money::from_minor(-300));
/// ```
pub fn compute_equal_shares(total: Money, contributions: &[Contribution]) -> CoreResult<ShareMap> {
    let equal_share = total
        .split_evenly(contributions.len())
        .ok_or(CoreError::EmptyContributions)?;

    contributions
        .iter()
        .map(|contribution| {
            contribution
                .amount
                .checked_sub(equal_share)
                .map(|share| (contribution.participant, share))
                .ok_or(CoreError::AmountOverflow)
        })
        .collect()
}

/// Computes shares for a direct transfer.
///
/// The giver is owed the full amount back; the receiver owes it. Always
/// zero-sum since nothing is divided. `amount` is positive, so negating it
/// cannot overflow.
pub fn compute_transfer_shares(amount: Money, from: ParticipantId, to: ParticipantId) -> ShareMap {
    let mut shares = ShareMap::new();
    shares.insert(from, amount);
    shares.insert(to, -amount);
    shares
}

// =============================================================================
// Unit Tests
// =============================================================================
