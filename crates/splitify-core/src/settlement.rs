//! # Settlement Matcher
//!
//! Converts one event's net positions into pairwise "who owes whom"
//! obligations.
//!
//! ## Algorithm: First-Fit Greedy Netting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shares  {P1:+150, P2:+150, P3:-250, P4:-50}                            │
//! │  creditor scan order: ascending id  [P1, P2, P3, P4]                    │
//! │  debtor visit order:  contribution order                                │
//! │                                                                         │
//! │  P3 owes 250                                                            │
//! │    P1 (+150): 150 - 250 < 0 → P3→P1 150, P1 = 0, P3 = -100, continue    │
//! │    P2 (+150): 150 - 100 ≥ 0 → P3→P2 100, P2 = 50, P3 = 0, stop          │
//! │  P4 owes 50                                                             │
//! │    P1 (0): skip                                                         │
//! │    P2 (+50):   50 - 50 ≥ 0 → P4→P2 50, done                             │
//! │                                                                         │
//! │  result {P3:{P1:150, P2:100}, P4:{P2:50}}                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The output depends on the order creditors are visited, so the scan always
//! runs over participant ids sorted ascending, never over a hash map's
//! iteration order. Lowest id wins when several creditors could absorb a
//! debt; callers rely on this.
//!
//! This is not a minimum-transaction solver. Each event is settled on its own
//! and per-event results are summed with [`DebitCreditMap::merge`].

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::share::ShareMap;
use crate::types::{Contribution, ParticipantId};

// =============================================================================
// Debit/Credit Map
// =============================================================================

/// Pairwise obligations: `debtor → creditor → amount`.
///
/// ## Invariants
/// - no entry with debtor == creditor
/// - every stored amount is strictly positive (zero obligations are omitted)
/// - no debtor maps to an empty set of creditors
///
/// Every way of building one goes through [`DebitCreditMap::record`] or the
/// matcher, so the type is serialize-only:
///
/// ```rust,compile_fail
/// let map: splitify_core::DebitCreditMap = serde_json::from_str(r#"{"1":{"1":5}}"#).unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct DebitCreditMap(BTreeMap<ParticipantId, BTreeMap<ParticipantId, Money>>);

/// One flattened entry of a [`DebitCreditMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Obligation {
    pub debtor: ParticipantId,
    pub creditor: ParticipantId,
    pub amount: Money,
}

impl DebitCreditMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        DebitCreditMap(BTreeMap::new())
    }

    /// Adds `amount` to what `debtor` owes `creditor`.
    ///
    /// Self-debts and non-positive amounts are ignored, which keeps the
    /// invariants intact for every sequence of calls. Fails with
    /// `AmountOverflow`, leaving the map unchanged, if the pair's total would
    /// leave the money range.
    pub fn record(
        &mut self,
        debtor: ParticipantId,
        creditor: ParticipantId,
        amount: Money,
    ) -> CoreResult<()> {
        if debtor == creditor || !amount.is_positive() {
            return Ok(());
        }
        let owed = self
            .amount_owed(debtor, creditor)
            .unwrap_or(Money::ZERO)
            .checked_add(amount)
            .ok_or(CoreError::AmountOverflow)?;
        self.set(debtor, creditor, owed);
        Ok(())
    }

    /// Builds a map from obligations, summing repeated pairs.
    pub fn try_from_obligations<I>(obligations: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = Obligation>,
    {
        let mut map = DebitCreditMap::new();
        for obligation in obligations {
            map.record(obligation.debtor, obligation.creditor, obligation.amount)?;
        }
        Ok(map)
    }

    /// Overwrites one pair. `amount` must be positive and the pair distinct.
    fn set(&mut self, debtor: ParticipantId, creditor: ParticipantId, amount: Money) {
        self.0.entry(debtor).or_default().insert(creditor, amount);
    }

    /// What `debtor` owes `creditor`, `None` if nothing.
    pub fn amount_owed(&self, debtor: ParticipantId, creditor: ParticipantId) -> Option<Money> {
        self.0
            .get(&debtor)
            .and_then(|credits| credits.get(&creditor))
            .copied()
    }

    /// Creditors of one debtor with the owed amounts, ascending by id.
    pub fn creditors_of(
        &self,
        debtor: ParticipantId,
    ) -> impl Iterator<Item = (ParticipantId, Money)> + '_ {
        self.0
            .get(&debtor)
            .into_iter()
            .flat_map(|credits| credits.iter().map(|(creditor, amount)| (*creditor, *amount)))
    }

    /// Everything one participant owes to others.
    pub fn total_owed_by(&self, participant: ParticipantId) -> CoreResult<Money> {
        Money::checked_sum(self.creditors_of(participant).map(|(_, amount)| amount))
            .ok_or(CoreError::AmountOverflow)
    }

    /// Everything others owe to one participant.
    pub fn total_owed_to(&self, participant: ParticipantId) -> CoreResult<Money> {
        Money::checked_sum(
            self.0
                .values()
                .filter_map(|credits| credits.get(&participant).copied()),
        )
        .ok_or(CoreError::AmountOverflow)
    }

    /// `total_owed_to - total_owed_by`. For a matcher output this equals the
    /// participant's share.
    pub fn net_position(&self, participant: ParticipantId) -> CoreResult<Money> {
        self.total_owed_to(participant)?
            .checked_sub(self.total_owed_by(participant)?)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Net position of every participant appearing in the map.
    pub fn net_positions(&self) -> CoreResult<ShareMap> {
        let mut participants: Vec<ParticipantId> = self.debtors().collect();
        participants.extend(self.0.values().flat_map(|credits| credits.keys().copied()));
        participants.sort();
        participants.dedup();

        participants
            .into_iter()
            .map(|participant| {
                self.net_position(participant)
                    .map(|position| (participant, position))
            })
            .collect()
    }

    /// Flattened obligations in ascending `(debtor, creditor)` order.
    pub fn obligations(&self) -> impl Iterator<Item = Obligation> + '_ {
        self.0.iter().flat_map(|(debtor, credits)| {
            credits.iter().map(move |(creditor, amount)| Obligation {
                debtor: *debtor,
                creditor: *creditor,
                amount: *amount,
            })
        })
    }

    /// Debtors in ascending id order.
    pub fn debtors(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.0.keys().copied()
    }

    /// Number of `(debtor, creditor)` pairs.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds every obligation of `other` into this map.
    ///
    /// On `AmountOverflow` the map is left as it was.
    pub fn absorb(&mut self, other: &DebitCreditMap) -> CoreResult<()> {
        let updated = other
            .obligations()
            .map(|obligation| {
                self.amount_owed(obligation.debtor, obligation.creditor)
                    .unwrap_or(Money::ZERO)
                    .checked_add(obligation.amount)
                    .map(|owed| (obligation.debtor, obligation.creditor, owed))
                    .ok_or(CoreError::AmountOverflow)
            })
            .collect::<CoreResult<Vec<_>>>()?;
        for (debtor, creditor, owed) in updated {
            self.set(debtor, creditor, owed);
        }
        Ok(())
    }

    /// Sums two maps pair by pair, missing entries counting as zero.
    ///
    /// Associative and commutative, with the empty map as identity.
    pub fn merge(&self, other: &DebitCreditMap) -> CoreResult<DebitCreditMap> {
        let mut merged = self.clone();
        merged.absorb(other)?;
        Ok(merged)
    }
}

impl<'a> IntoIterator for &'a DebitCreditMap {
    type Item = (&'a ParticipantId, &'a BTreeMap<ParticipantId, Money>);
    type IntoIter = btree_map::Iter<'a, ParticipantId, BTreeMap<ParticipantId, Money>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Settles a single event.
///
/// ## Preconditions
/// `shares` is the validated, zero-sum share map of the event whose
/// contributions are given. The caller's map is never modified: netting runs
/// on a private working copy.
///
/// ## Steps
/// 1. Sort the participants of `shares` ascending.
/// 2. Visit contributions in the given order; a participant whose working
///    share is negative is a debtor.
/// 3. For each debtor scan the other participants in sorted order. A
///    creditor that can absorb the whole remaining debt takes it and the scan
///    stops; otherwise the creditor is paid in full and the scan continues.
///
/// Every step adds a positive and a negative share, or negates a debt no
/// larger than some creditor's share, so nothing here can overflow.
///
/// ## Example
/// ```rust
/// use splitify_core::settlement::build_debit_credit_map;
/// use splitify_core::share::compute_equal_shares;
/// use splitify_core::{Contribution, Money, ParticipantId};
///
/// let p1 = ParticipantId::new(1);
/// let p2 = ParticipantId::new(2);
/// let contributions = [
///     Contribution::new(p1, Money::from_minor(1000)),
///     Contribution::new(p2, Money::ZERO),
/// ];
/// let shares = compute_equal_shares(Money::from_minor(1000), &contributions).unwrap();
///
/// let debts = build_debit_credit_map(&contributions, &shares);
/// assert_eq!(debts.amount_owed(p2, p1), Some(Money::from_minor(500)));
/// assert_eq!(debts.len(), 1);
/// ```
pub fn build_debit_credit_map(contributions: &[Contribution], shares: &ShareMap) -> DebitCreditMap {
    let ordered: Vec<ParticipantId> = shares.participants().collect();
    let mut working = shares.clone();
    let mut debts = DebitCreditMap::new();

    for contribution in contributions {
        let debtor = contribution.participant;
        let mut debtor_share = working.share_of(debtor);
        if !debtor_share.is_negative() {
            continue;
        }

        for &creditor in &ordered {
            if creditor == debtor {
                continue;
            }
            let creditor_share = working.share_of(creditor);
            if !creditor_share.is_positive() {
                continue;
            }

            // A debtor leaves the scan settled or with every creditor
            // exhausted, so a pair is written at most once.
            let remaining = creditor_share + debtor_share;
            if !remaining.is_negative() {
                debts.set(debtor, creditor, -debtor_share);
                working.insert(debtor, Money::ZERO);
                working.insert(creditor, remaining);
                break;
            }

            debts.set(debtor, creditor, creditor_share);
            working.insert(debtor, remaining);
            working.insert(creditor, Money::ZERO);
            debtor_share = remaining;
        }
    }

    debts
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::{compute_equal_shares, compute_transfer_shares};
    use rstest::rstest;

    fn p(id: u64) -> ParticipantId {
        ParticipantId::new(id)
    }

    fn contributions(entries: &[(u64, i64)]) -> Vec<Contribution> {
        entries
            .iter()
            .map(|&(id, amount)| Contribution::new(p(id), Money::from_minor(amount)))
            .collect()
    }

    fn debts(entries: &[(u64, u64, i64)]) -> DebitCreditMap {
        DebitCreditMap::try_from_obligations(entries.iter().map(|&(debtor, creditor, amount)| {
            Obligation {
                debtor: p(debtor),
                creditor: p(creditor),
                amount: Money::from_minor(amount),
            }
        }))
        .unwrap()
    }

    #[rstest]
    #[case::first_pays_everything(1000, &[(1, 1000), (2, 0)], &[(2, 1, 500)])]
    #[case::second_pays_everything(1000, &[(1, 0), (2, 1000)], &[(1, 2, 500)])]
    #[case::equal_split_no_debts(1000, &[(1, 500), (2, 500)], &[])]
    #[case::partial_split(1000, &[(1, 800), (2, 200)], &[(2, 1, 300)])]
    #[case::one_payer_two_debtors(900, &[(1, 900), (2, 0), (3, 0)], &[(2, 1, 300), (3, 1, 300)])]
    #[case::uneven_debtors(900, &[(1, 700), (2, 200), (3, 0)], &[(2, 1, 100), (3, 1, 300)])]
    #[case::two_creditors_two_debtors(
        1000,
        &[(1, 400), (2, 400), (3, 0), (4, 200)],
        &[(3, 1, 150), (3, 2, 100), (4, 2, 50)]
    )]
    #[case::two_creditors_two_debtors_other_order(
        1000,
        &[(1, 400), (2, 400), (3, 200), (4, 0)],
        &[(3, 1, 50), (4, 1, 100), (4, 2, 150)]
    )]
    fn test_equal_split_settlement(
        #[case] total: i64,
        #[case] given: &[(u64, i64)],
        #[case] expected: &[(u64, u64, i64)],
    ) {
        let given = contributions(given);
        let shares = compute_equal_shares(Money::from_minor(total), &given).unwrap();
        assert_eq!(build_debit_credit_map(&given, &shares), debts(expected));
    }

    #[test]
    fn test_transfer_settlement() {
        let shares = compute_transfer_shares(Money::from_minor(1000), p(1), p(2));
        let given = contributions(&[(1, 1000), (2, 0)]);
        assert_eq!(build_debit_credit_map(&given, &shares), debts(&[(2, 1, 1000)]));
    }

    #[test]
    fn test_lowest_creditor_id_wins_tie() {
        // P2 and P5 are both owed 75. P5 contributed first, but P9's debt
        // still goes to P2 before P5.
        let given = contributions(&[(5, 200), (9, 0), (2, 200), (7, 100)]);
        let shares = compute_equal_shares(Money::from_minor(500), &given).unwrap();
        assert_eq!(shares.share_of(p(2)), Money::from_minor(75));
        assert_eq!(shares.share_of(p(5)), Money::from_minor(75));
        let result = build_debit_credit_map(&given, &shares);
        assert_eq!(result, debts(&[(7, 5, 25), (9, 2, 75), (9, 5, 50)]));
    }

    #[test]
    fn test_debtors_visited_in_contribution_order() {
        let shares: ShareMap = [
            (p(1), Money::from_minor(100)),
            (p(2), Money::from_minor(100)),
            (p(3), Money::from_minor(-100)),
            (p(4), Money::from_minor(-100)),
        ]
        .into_iter()
        .collect();

        let forward = build_debit_credit_map(&contributions(&[(3, 0), (4, 0)]), &shares);
        assert_eq!(forward, debts(&[(3, 1, 100), (4, 2, 100)]));

        let backward = build_debit_credit_map(&contributions(&[(4, 0), (3, 0)]), &shares);
        assert_eq!(backward, debts(&[(3, 2, 100), (4, 1, 100)]));
    }

    #[test]
    fn test_input_shares_untouched() {
        let given = contributions(&[(1, 400), (2, 400), (3, 0), (4, 200)]);
        let shares = compute_equal_shares(Money::from_minor(1000), &given).unwrap();
        let snapshot = shares.clone();
        let _ = build_debit_credit_map(&given, &shares);
        assert_eq!(shares, snapshot);
    }

    #[test]
    fn test_no_empty_debtor_entries() {
        // A debtor with nobody to pay leaves no trace in the map.
        let shares: ShareMap = [(p(1), Money::from_minor(-10))].into_iter().collect();
        let result = build_debit_credit_map(&contributions(&[(1, 0)]), &shares);
        assert!(result.is_empty());
        assert_eq!(result.debtors().count(), 0);
    }

    #[test]
    fn test_read_helpers() {
        let map = debts(&[(3, 1, 150), (3, 2, 100), (4, 2, 50)]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.amount_owed(p(3), p(2)), Some(Money::from_minor(100)));
        assert_eq!(map.amount_owed(p(2), p(3)), None);
        assert_eq!(map.total_owed_by(p(3)), Ok(Money::from_minor(250)));
        assert_eq!(map.total_owed_to(p(2)), Ok(Money::from_minor(150)));
        assert_eq!(map.net_position(p(2)), Ok(Money::from_minor(150)));
        assert_eq!(map.net_position(p(4)), Ok(Money::from_minor(-50)));
        assert_eq!(map.net_position(p(8)), Ok(Money::ZERO));

        let positions = map.net_positions().unwrap();
        assert_eq!(positions.len(), 4);
        assert_eq!(positions.share_of(p(1)), Money::from_minor(150));
        assert_eq!(positions.share_of(p(3)), Money::from_minor(-250));
        assert_eq!(positions.total(), Ok(Money::ZERO));
    }

    #[test]
    fn test_record_ignores_self_and_non_positive() {
        let mut map = DebitCreditMap::new();
        map.record(p(1), p(1), Money::from_minor(10)).unwrap();
        map.record(p(1), p(2), Money::ZERO).unwrap();
        map.record(p(1), p(2), Money::from_minor(-5)).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_built_maps_keep_invariants() {
        let obligations = [(1, 1, 5), (1, 2, 0), (3, 2, -4), (3, 2, 6)].map(|(debtor, creditor, amount)| {
            Obligation {
                debtor: p(debtor),
                creditor: p(creditor),
                amount: Money::from_minor(amount),
            }
        });
        let map = DebitCreditMap::try_from_obligations(obligations).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.debtors().collect::<Vec<_>>(), vec![p(3)]);
        assert_eq!(map.amount_owed(p(3), p(2)), Some(Money::from_minor(6)));
    }

    #[test]
    fn test_record_rejects_overflowing_pair() {
        let mut map = debts(&[(2, 1, i64::MAX)]);
        assert_eq!(
            map.record(p(2), p(1), Money::from_minor(1)),
            Err(CoreError::AmountOverflow)
        );
        assert_eq!(map.amount_owed(p(2), p(1)), Some(Money::from_minor(i64::MAX)));

        let merged = map.merge(&debts(&[(3, 1, 1), (2, 1, 1)]));
        assert_eq!(merged, Err(CoreError::AmountOverflow));
        assert_eq!(map, debts(&[(2, 1, i64::MAX)]));
    }

    #[test]
    fn test_totals_past_the_limit_are_errors() {
        let map = debts(&[(2, 1, i64::MAX), (3, 1, i64::MAX)]);
        assert_eq!(map.total_owed_by(p(2)), Ok(Money::from_minor(i64::MAX)));
        assert_eq!(map.total_owed_to(p(1)), Err(CoreError::AmountOverflow));
        assert_eq!(map.net_positions(), Err(CoreError::AmountOverflow));
    }

    #[test]
    fn test_settles_shares_at_the_limit() {
        let given = contributions(&[(1, i64::MAX - 1), (2, 0)]);
        let shares = compute_equal_shares(Money::from_minor(i64::MAX - 1), &given).unwrap();
        let result = build_debit_credit_map(&given, &shares);
        assert_eq!(result, debts(&[(2, 1, i64::MAX / 2)]));
    }

    #[test]
    fn test_merge_sums_pairs() {
        let first = debts(&[(2, 1, 500)]);
        let second = debts(&[(2, 1, 300)]);
        assert_eq!(first.merge(&second), Ok(debts(&[(2, 1, 800)])));

        let third = debts(&[(3, 1, 40), (2, 4, 7)]);
        assert_eq!(
            first.merge(&third),
            Ok(debts(&[(2, 1, 500), (2, 4, 7), (3, 1, 40)]))
        );
        assert_eq!(first.merge(&DebitCreditMap::new()), Ok(first.clone()));
        assert_eq!(DebitCreditMap::new().merge(&first), Ok(first.clone()));
    }

    #[test]
    fn test_obligations_are_ordered() {
        let map = debts(&[(4, 2, 50), (3, 2, 100), (3, 1, 150)]);
        let pairs: Vec<(u64, u64)> = map
            .obligations()
            .map(|o| (o.debtor.get(), o.creditor.get()))
            .collect();
        assert_eq!(pairs, vec![(3, 1), (3, 2), (4, 2)]);
    }

    #[test]
    fn test_serializes_as_nested_object() {
        let json = serde_json::to_string(&debts(&[(3, 1, 150), (3, 2, 100), (4, 2, 50)])).unwrap();
        assert_eq!(json, r#"{"3":{"1":150,"2":100},"4":{"2":50}}"#);
    }
}
