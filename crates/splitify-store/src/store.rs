//! # Store
//!
//! Owns the tables and hands out repositories.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Store                                        │
//! │                                                                         │
//! │   Arc<MemoryTable<Group>>                ──► store.groups()             │
//! │   Arc<MemoryTable<Participant>>          ──► store.participants()       │
//! │   Arc<MemoryTable<Movement>>             ──► store.movements()          │
//! │   Arc<MemoryTable<ParticipantMovement>>  ──► store.participant_movements│
//! │                                                                         │
//! │   Cloning a Store (or a repository) shares the same tables.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::info;

use splitify_core::{Group, Movement, Participant, ParticipantMovement};

use crate::repository::{
    GroupRepository, MemoryTable, MovementRepository, ParticipantMovementRepository,
    ParticipantRepository,
};

/// Handle to all ledger tables.
///
/// ## Usage
/// ```rust,ignore
/// let store = Store::new();
/// let trip = store.groups().insert("Trip").await;
/// let ana = store.participants().insert(trip.id, "Ana").await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Store {
    groups: Arc<MemoryTable<Group>>,
    participants: Arc<MemoryTable<Participant>>,
    movements: Arc<MemoryTable<Movement>>,
    participant_movements: Arc<MemoryTable<ParticipantMovement>>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        info!("Initializing in-memory ledger store");
        Store::default()
    }

    pub fn groups(&self) -> GroupRepository {
        GroupRepository::new(self.groups.clone())
    }

    pub fn participants(&self) -> ParticipantRepository {
        ParticipantRepository::new(self.participants.clone())
    }

    pub fn movements(&self) -> MovementRepository {
        MovementRepository::new(self.movements.clone())
    }

    pub fn participant_movements(&self) -> ParticipantMovementRepository {
        ParticipantMovementRepository::new(self.participant_movements.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use splitify_core::{Contribution, Money, MovementKind, ParticipantId};

    use crate::repository::NewMovement;

    #[tokio::test]
    async fn test_clones_share_tables() {
        let store = Store::new();
        let clone = store.clone();

        let group = store.groups().insert("Trip").await;
        assert_eq!(clone.groups().get_by_id(group.id).await.unwrap(), group);
    }

    #[tokio::test]
    async fn test_participants_listed_per_group() {
        let store = Store::new();
        let trip = store.groups().insert("Trip").await;
        let flat = store.groups().insert("Flat").await;

        let ana = store.participants().insert(trip.id, "Ana").await;
        store.participants().insert(flat.id, "Bea").await;
        let cai = store.participants().insert(trip.id, "Cai").await;

        assert_eq!(
            store.participants().get_by_group_id(trip.id).await,
            vec![ana, cai]
        );
    }

    #[tokio::test]
    async fn test_participant_movements_keep_insertion_order() {
        let store = Store::new();
        let trip = store.groups().insert("Trip").await;
        let movement = store
            .movements()
            .insert(NewMovement::now(
                trip.id,
                Money::from_minor(300),
                "Taxi",
                MovementKind::Expense,
            ))
            .await;

        let contributions = [
            Contribution::new(ParticipantId::new(9), Money::from_minor(100)),
            Contribution::new(ParticipantId::new(2), Money::from_minor(200)),
            Contribution::new(ParticipantId::new(5), Money::ZERO),
        ];
        store
            .participant_movements()
            .insert_all(movement.id, &contributions)
            .await;

        let stored: Vec<Contribution> = store
            .participant_movements()
            .get_by_movement_id(movement.id)
            .await
            .iter()
            .map(ParticipantMovement::contribution)
            .collect();
        assert_eq!(stored, contributions);

        assert_eq!(
            store
                .participant_movements()
                .delete_by_movement_id(movement.id)
                .await,
            3
        );
        assert!(store
            .participant_movements()
            .get_by_movement_id(movement.id)
            .await
            .is_empty());
    }
}
