//! # Participant Movement Repository
//!
//! One row per contribution of a participant to a movement.
//!
//! Rows are returned in insertion order, so reading back a movement's rows
//! yields its contributions in the order they were recorded. The settlement
//! matcher visits debtors in that order.

use std::sync::Arc;

use tracing::debug;

use splitify_core::{Contribution, MovementId, ParticipantMovement, ParticipantMovementId};

use super::table::{MemoryTable, Record};
use crate::error::StoreResult;

impl Record for ParticipantMovement {
    type Id = ParticipantMovementId;
    type Draft = (MovementId, Contribution);
    const ENTITY: &'static str = "ParticipantMovement";

    fn id(&self) -> ParticipantMovementId {
        self.id
    }

    fn from_draft(id: ParticipantMovementId, (movement_id, contribution): Self::Draft) -> Self {
        ParticipantMovement {
            id,
            movement_id,
            participant_id: contribution.participant,
            amount: contribution.amount,
        }
    }
}

/// Repository for participant movements.
#[derive(Debug, Clone)]
pub struct ParticipantMovementRepository {
    table: Arc<MemoryTable<ParticipantMovement>>,
}

impl ParticipantMovementRepository {
    pub fn new(table: Arc<MemoryTable<ParticipantMovement>>) -> Self {
        ParticipantMovementRepository { table }
    }

    /// Stores the contributions of one movement, in the given order.
    pub async fn insert_all(
        &self,
        movement_id: MovementId,
        contributions: &[Contribution],
    ) -> Vec<ParticipantMovement> {
        let mut rows = Vec::with_capacity(contributions.len());
        for contribution in contributions {
            rows.push(self.table.save((movement_id, *contribution)).await);
        }
        debug!(movement_id = %movement_id, count = rows.len(), "Inserted participant movements");
        rows
    }

    pub async fn get_by_id(&self, id: ParticipantMovementId) -> StoreResult<ParticipantMovement> {
        self.table.get_by_id(id).await
    }

    /// Rows of one movement, in insertion order.
    pub async fn get_by_movement_id(&self, movement_id: MovementId) -> Vec<ParticipantMovement> {
        self.table.filter(|row| row.movement_id == movement_id).await
    }

    /// Removes every row of one movement.
    pub async fn delete_by_movement_id(&self, movement_id: MovementId) -> usize {
        let removed = self
            .table
            .delete_where(|row| row.movement_id == movement_id)
            .await;
        debug!(movement_id = %movement_id, removed, "Deleted participant movements");
        removed
    }
}
