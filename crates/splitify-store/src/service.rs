//! # Ledger Service
//!
//! Caller of the settlement engine: checks membership, admits movements and
//! answers balance queries.
//!
//! ## Admission
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_movement(group, amount, concept, contributions)                    │
//! │       │                                                                 │
//! │       ▼   (write lock held from here)                                   │
//! │  group exists?                 → NotFound                               │
//! │  each participant exists?      → NotFound                               │
//! │  each participant in group?    → ForeignKeyViolation                    │
//! │  ExpenseEvent::new(...)        → AmountMismatch, DuplicateParticipant.. │
//! │  engine.settle(...)            → SharesNotZeroSum                       │
//! │       │                                                                 │
//! │       ▼   nothing written before this point                             │
//! │  save movement, then its participant movements in contribution order   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Balances
//! Movements of a group are read back oldest first, rebuilt into events and
//! folded into a [`BalanceReport`]. A movement that no longer settles aborts
//! the query with [`StoreError::RejectedMovement`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use splitify_core::validation::{self, ensure_amount_matches_contributions};
use splitify_core::{
    BalanceReport, Contribution, CoreResult, Event, ExpenseEvent, Group, GroupId, Money, Movement,
    MovementId, MovementKind, Participant, ParticipantId, ParticipantMovement, Settlement,
    SettlementEngine, TransferEvent,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::NewMovement;
use crate::store::Store;

/// A stored movement together with its own settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementSettlement {
    pub movement: Movement,
    pub contributions: Vec<Contribution>,
    pub settlement: Settlement,
}

/// Ledger operations over a [`Store`].
///
/// Writes are serialized by a service-wide lock; reads share it, so a balance
/// query never sees a movement without its participant movements.
///
/// ## Usage
/// ```rust,ignore
/// let service = LedgerService::new(Store::new());
/// let trip = service.create_group("Trip").await?;
/// let ana = service.add_participant(trip.id, "Ana").await?;
/// let bea = service.add_participant(trip.id, "Bea").await?;
///
/// service
///     .add_movement(trip.id, Money::from_minor(1000), "Lunch", vec![
///         Contribution::new(ana.id, Money::from_minor(1000)),
///         Contribution::new(bea.id, Money::ZERO),
///     ])
///     .await?;
///
/// let report = service.calculate_balances(trip.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LedgerService {
    store: Store,
    engine: SettlementEngine,
    gate: Arc<RwLock<()>>,
}

impl LedgerService {
    /// Service with the default engine (`Reject` remainder policy).
    pub fn new(store: Store) -> Self {
        LedgerService::with_engine(store, SettlementEngine::new())
    }

    pub fn with_engine(store: Store, engine: SettlementEngine) -> Self {
        LedgerService {
            store,
            engine,
            gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn engine(&self) -> SettlementEngine {
        self.engine
    }

    // =========================================================================
    // Groups and Participants
    // =========================================================================

    pub async fn create_group(&self, name: &str) -> StoreResult<Group> {
        let name = validation::validate_name("name", name)?;
        let _guard = self.gate.write().await;

        let group = self.store.groups().insert(name).await;
        info!(group_id = %group.id, name = %group.name, "Group created");
        Ok(group)
    }

    /// Adds a participant to an existing group.
    pub async fn add_participant(&self, group_id: GroupId, name: &str) -> StoreResult<Participant> {
        let name = validation::validate_name("name", name)?;
        let _guard = self.gate.write().await;

        self.store.groups().get_by_id(group_id).await?;
        let participant = self.store.participants().insert(group_id, name).await;
        info!(
            group_id = %group_id,
            participant_id = %participant.id,
            name = %participant.name,
            "Participant added"
        );
        Ok(participant)
    }

    pub async fn group(&self, group_id: GroupId) -> StoreResult<Group> {
        self.store.groups().get_by_id(group_id).await
    }

    /// Participants of an existing group, in creation order.
    pub async fn participants(&self, group_id: GroupId) -> StoreResult<Vec<Participant>> {
        let _guard = self.gate.read().await;
        self.store.groups().get_by_id(group_id).await?;
        Ok(self.store.participants().get_by_group_id(group_id).await)
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Movements of an existing group, oldest first.
    pub async fn movements(&self, group_id: GroupId) -> StoreResult<Vec<Movement>> {
        let _guard = self.gate.read().await;
        self.store.groups().get_by_id(group_id).await?;
        Ok(self.store.movements().get_by_group_id(group_id).await)
    }

    /// Records an expense split equally among its contributors.
    ///
    /// The event is settled once before anything is written, so a movement
    /// is stored completely or not at all.
    pub async fn add_movement(
        &self,
        group_id: GroupId,
        amount: Money,
        concept: &str,
        contributions: Vec<Contribution>,
    ) -> StoreResult<MovementSettlement> {
        let concept = validation::validate_concept(concept)?;
        let _guard = self.gate.write().await;

        self.store.groups().get_by_id(group_id).await?;
        for contribution in &contributions {
            self.ensure_member(group_id, contribution.participant).await?;
        }

        let event = ExpenseEvent::new(amount, contributions)
            .and_then(|event| Ok((self.engine.settle_expense(&event)?, event)));
        let (settlement, event) = match event {
            Ok(admitted) => admitted,
            Err(err) => {
                warn!(group_id = %group_id, concept = %concept, error = %err, "Expense rejected");
                return Err(err.into());
            }
        };

        let movement = self
            .store
            .movements()
            .insert(NewMovement::now(group_id, amount, concept, MovementKind::Expense))
            .await;
        self.store
            .participant_movements()
            .insert_all(movement.id, event.contributions())
            .await;

        info!(
            group_id = %group_id,
            movement_id = %movement.id,
            amount = %amount,
            participants = event.contributions().len(),
            "Expense recorded"
        );
        Ok(MovementSettlement {
            movement,
            contributions: event.contributions().to_vec(),
            settlement,
        })
    }

    /// Records a direct transfer from one participant to another.
    pub async fn add_transfer(
        &self,
        group_id: GroupId,
        from: ParticipantId,
        to: ParticipantId,
        amount: Money,
        concept: &str,
    ) -> StoreResult<MovementSettlement> {
        let concept = validation::validate_concept(concept)?;
        let _guard = self.gate.write().await;

        self.store.groups().get_by_id(group_id).await?;
        self.ensure_member(group_id, from).await?;
        self.ensure_member(group_id, to).await?;

        let event = TransferEvent::new(amount, from, to)
            .and_then(|event| Ok((self.engine.settle_transfer(&event)?, event)));
        let (settlement, event) = match event {
            Ok(admitted) => admitted,
            Err(err) => {
                warn!(group_id = %group_id, concept = %concept, error = %err, "Transfer rejected");
                return Err(err.into());
            }
        };

        let movement = self
            .store
            .movements()
            .insert(NewMovement::now(
                group_id,
                amount,
                concept,
                MovementKind::Transfer { from, to },
            ))
            .await;
        let contributions = event.contributions();
        self.store
            .participant_movements()
            .insert_all(movement.id, &contributions)
            .await;

        info!(
            group_id = %group_id,
            movement_id = %movement.id,
            from = %from,
            to = %to,
            amount = %amount,
            "Transfer recorded"
        );
        Ok(MovementSettlement {
            movement,
            contributions: contributions.to_vec(),
            settlement,
        })
    }

    /// Deletes a movement and its participant movements.
    pub async fn remove_movement(&self, movement_id: MovementId) -> StoreResult<Movement> {
        let _guard = self.gate.write().await;

        let movement = self.store.movements().delete(movement_id).await?;
        let rows = self
            .store
            .participant_movements()
            .delete_by_movement_id(movement_id)
            .await;
        info!(movement_id = %movement_id, rows, "Movement removed");
        Ok(movement)
    }

    /// Settlement of one stored movement on its own.
    pub async fn movement_settlement(&self, movement_id: MovementId) -> StoreResult<MovementSettlement> {
        let _guard = self.gate.read().await;
        let movement = self.store.movements().get_by_id(movement_id).await?;
        self.settle_stored(movement).await
    }

    /// Per-movement settlements of a group, oldest first.
    pub async fn movement_settlements(&self, group_id: GroupId) -> StoreResult<Vec<MovementSettlement>> {
        let _guard = self.gate.read().await;
        self.store.groups().get_by_id(group_id).await?;

        let mut settled = Vec::new();
        for movement in self.store.movements().get_by_group_id(group_id).await {
            settled.push(self.settle_stored(movement).await?);
        }
        Ok(settled)
    }

    /// Aggregate balances of a group.
    ///
    /// Shares and debit/credit maps of every movement are summed in creation
    /// order. Fails as a whole if any movement cannot be settled or a running
    /// total leaves the money range.
    pub async fn calculate_balances(&self, group_id: GroupId) -> StoreResult<BalanceReport> {
        let _guard = self.gate.read().await;
        self.store.groups().get_by_id(group_id).await?;

        let mut report = BalanceReport::new();
        for movement in self.store.movements().get_by_group_id(group_id).await {
            let settled = self.settle_stored(movement).await?;
            report.absorb(&settled.settlement)?;
        }

        info!(
            group_id = %group_id,
            movements = report.events,
            obligations = report.debit_credit.len(),
            "Balances calculated"
        );
        Ok(report)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn ensure_member(&self, group_id: GroupId, participant_id: ParticipantId) -> StoreResult<()> {
        let participant = self.store.participants().get_by_id(participant_id).await?;
        if participant.group_id != group_id {
            return Err(StoreError::foreign_key(format!(
                "participant {} belongs to group {}, not {}",
                participant_id, participant.group_id, group_id
            )));
        }
        Ok(())
    }

    async fn settle_stored(&self, movement: Movement) -> StoreResult<MovementSettlement> {
        let rows = self
            .store
            .participant_movements()
            .get_by_movement_id(movement.id)
            .await;

        let settled = rebuild_event(&movement, &rows).and_then(|event| {
            let settlement = self.engine.settle(&event)?;
            Ok((event, settlement))
        });
        match settled {
            Ok((event, settlement)) => Ok(MovementSettlement {
                contributions: event.contributions().into_owned(),
                movement,
                settlement,
            }),
            Err(source) => {
                warn!(movement_id = %movement.id, error = %source, "Stored movement rejected");
                Err(StoreError::RejectedMovement {
                    movement_id: movement.id,
                    source,
                })
            }
        }
    }
}

/// Turns stored rows back into an engine event.
fn rebuild_event(movement: &Movement, rows: &[ParticipantMovement]) -> CoreResult<Event> {
    let contributions: Vec<Contribution> = rows.iter().map(ParticipantMovement::contribution).collect();
    match movement.kind {
        MovementKind::Expense => Ok(ExpenseEvent::new(movement.amount, contributions)?.into()),
        MovementKind::Transfer { from, to } => {
            ensure_amount_matches_contributions(movement.amount, &contributions)?;
            Ok(TransferEvent::new(movement.amount, from, to)?.into())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use splitify_core::{CoreError, RemainderPolicy, ValidationError};

    fn m(minor: i64) -> Money {
        Money::from_minor(minor)
    }

    async fn trip_with(names: &[&str]) -> (LedgerService, Group, Vec<Participant>) {
        let service = LedgerService::new(Store::new());
        let group = service.create_group("Trip").await.unwrap();
        let mut participants = Vec::new();
        for name in names {
            participants.push(service.add_participant(group.id, name).await.unwrap());
        }
        (service, group, participants)
    }

    #[tokio::test]
    async fn test_create_group_validates_name() {
        let service = LedgerService::new(Store::new());
        let group = service.create_group("  Trip ").await.unwrap();
        assert_eq!(group.name, "Trip");

        let err = service.create_group(" ").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_add_participant_to_unknown_group() {
        let service = LedgerService::new(Store::new());
        let err = service
            .add_participant(GroupId::new(42), "Ana")
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("Group", 42));
    }

    #[tokio::test]
    async fn test_add_movement_settles_once() {
        let (service, group, people) = trip_with(&["Ana", "Bea", "Cai"]).await;
        let recorded = service
            .add_movement(
                group.id,
                m(900),
                "Dinner",
                vec![
                    Contribution::new(people[0].id, m(700)),
                    Contribution::new(people[1].id, m(200)),
                    Contribution::new(people[2].id, Money::ZERO),
                ],
            )
            .await
            .unwrap();

        let debts = &recorded.settlement.debit_credit;
        assert_eq!(debts.amount_owed(people[1].id, people[0].id), Some(m(100)));
        assert_eq!(debts.amount_owed(people[2].id, people[0].id), Some(m(300)));
        assert_eq!(
            service.movement_settlement(recorded.movement.id).await.unwrap(),
            recorded
        );
    }

    #[tokio::test]
    async fn test_rejected_expense_writes_nothing() {
        let (service, group, people) = trip_with(&["Ana", "Bea", "Cai"]).await;

        let mismatch = service
            .add_movement(
                group.id,
                m(1000),
                "Lunch",
                vec![Contribution::new(people[0].id, m(900))],
            )
            .await
            .unwrap_err();
        assert!(matches!(mismatch, StoreError::Core(CoreError::AmountMismatch { .. })));

        let residual = service
            .add_movement(
                group.id,
                m(1000),
                "Lunch",
                vec![
                    Contribution::new(people[0].id, m(1000)),
                    Contribution::new(people[1].id, Money::ZERO),
                    Contribution::new(people[2].id, Money::ZERO),
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(
            residual,
            StoreError::Core(CoreError::SharesNotZeroSum { residual: m(1) })
        );

        assert!(service.store().movements().get_all().await.is_empty());
        assert_eq!(service.calculate_balances(group.id).await.unwrap().events, 0);
    }

    #[tokio::test]
    async fn test_remainder_policy_admits_uneven_split() {
        let engine = SettlementEngine::new().remainder_policy(RemainderPolicy::AssignToLowestId);
        let service = LedgerService::with_engine(Store::new(), engine);
        let group = service.create_group("Trip").await.unwrap();
        let ana = service.add_participant(group.id, "Ana").await.unwrap();
        let bea = service.add_participant(group.id, "Bea").await.unwrap();
        let cai = service.add_participant(group.id, "Cai").await.unwrap();

        service
            .add_movement(
                group.id,
                m(1000),
                "Lunch",
                vec![
                    Contribution::new(ana.id, m(1000)),
                    Contribution::new(bea.id, Money::ZERO),
                    Contribution::new(cai.id, Money::ZERO),
                ],
            )
            .await
            .unwrap();

        let report = service.calculate_balances(group.id).await.unwrap();
        assert_eq!(report.shares.share_of(ana.id), m(666));
        assert_eq!(report.shares.total(), Ok(Money::ZERO));
    }

    #[tokio::test]
    async fn test_overflowing_contributions_write_nothing() {
        let (service, group, people) = trip_with(&["Ana", "Bea", "Cai"]).await;

        let err = service
            .add_movement(
                group.id,
                Money::ZERO,
                "Lunch",
                vec![
                    Contribution::new(people[0].id, m(i64::MAX)),
                    Contribution::new(people[1].id, m(i64::MAX)),
                    Contribution::new(people[2].id, m(2)),
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Core(CoreError::AmountOverflow));
        assert!(service.store().movements().get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_balances_past_the_limit_are_an_error() {
        let (service, group, people) = trip_with(&["Ana", "Bea"]).await;
        let big = m(i64::MAX - 1);
        for _ in 0..3 {
            service
                .add_movement(
                    group.id,
                    big,
                    "Yacht",
                    vec![
                        Contribution::new(people[0].id, big),
                        Contribution::new(people[1].id, Money::ZERO),
                    ],
                )
                .await
                .unwrap();
        }

        assert_eq!(
            service.calculate_balances(group.id).await,
            Err(StoreError::Core(CoreError::AmountOverflow))
        );
        assert_eq!(service.movement_settlements(group.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_contribution_from_other_group() {
        let (service, trip, people) = trip_with(&["Ana"]).await;
        let flat = service.create_group("Flat").await.unwrap();
        let outsider = service.add_participant(flat.id, "Bea").await.unwrap();

        let err = service
            .add_movement(
                trip.id,
                m(100),
                "Taxi",
                vec![
                    Contribution::new(people[0].id, m(100)),
                    Contribution::new(outsider.id, Money::ZERO),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));

        let err = service
            .add_movement(
                trip.id,
                m(100),
                "Taxi",
                vec![Contribution::new(ParticipantId::new(99), m(100))],
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("Participant", 99));
    }

    #[tokio::test]
    async fn test_transfer() {
        let (service, group, people) = trip_with(&["Ana", "Bea"]).await;
        let recorded = service
            .add_transfer(group.id, people[0].id, people[1].id, m(1000), "Loan")
            .await
            .unwrap();
        assert_eq!(
            recorded.movement.kind,
            MovementKind::Transfer {
                from: people[0].id,
                to: people[1].id
            }
        );
        assert_eq!(
            recorded.settlement.debit_credit.amount_owed(people[1].id, people[0].id),
            Some(m(1000))
        );

        let err = service
            .add_transfer(group.id, people[0].id, people[0].id, m(10), "Oops")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::SelfTransfer { .. })));
    }

    #[tokio::test]
    async fn test_remove_movement() {
        let (service, group, people) = trip_with(&["Ana", "Bea"]).await;
        let recorded = service
            .add_transfer(group.id, people[0].id, people[1].id, m(500), "Loan")
            .await
            .unwrap();

        assert_eq!(service.movements(group.id).await.unwrap().len(), 1);
        service.remove_movement(recorded.movement.id).await.unwrap();
        assert!(service.movements(group.id).await.unwrap().is_empty());
        assert!(service
            .store()
            .participant_movements()
            .get_by_movement_id(recorded.movement.id)
            .await
            .is_empty());
        assert!(service.calculate_balances(group.id).await.unwrap().debit_credit.is_empty());
        assert_eq!(
            service.remove_movement(recorded.movement.id).await.unwrap_err(),
            StoreError::not_found("Movement", recorded.movement.id)
        );
    }

    #[tokio::test]
    async fn test_corrupted_movement_aborts_balances() {
        let (service, group, people) = trip_with(&["Ana", "Bea"]).await;
        let recorded = service
            .add_movement(
                group.id,
                m(1000),
                "Lunch",
                vec![
                    Contribution::new(people[0].id, m(1000)),
                    Contribution::new(people[1].id, Money::ZERO),
                ],
            )
            .await
            .unwrap();

        // Drop one contribution behind the service's back.
        let rows = service
            .store()
            .participant_movements()
            .get_by_movement_id(recorded.movement.id)
            .await;
        service
            .store()
            .participant_movements()
            .delete_by_movement_id(recorded.movement.id)
            .await;
        service
            .store()
            .participant_movements()
            .insert_all(recorded.movement.id, &[rows[1].contribution()])
            .await;

        let err = service.calculate_balances(group.id).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::RejectedMovement {
                movement_id,
                source: CoreError::AmountMismatch { .. },
            } if movement_id == recorded.movement.id
        ));
    }
}
