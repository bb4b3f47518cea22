//! # Movement Repository
//!
//! Storage operations for movements (expenses and transfers).
//!
//! Movements are listed in id order, which is also creation order. The
//! balance query relies on this to fold movements deterministically.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use splitify_core::{GroupId, Money, Movement, MovementId, MovementKind};

use super::table::{MemoryTable, Record};
use crate::error::StoreResult;

/// A movement before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub amount: Money,
    pub concept: String,
    pub kind: MovementKind,
}

impl NewMovement {
    /// A movement stamped with the current time.
    pub fn now(group_id: GroupId, amount: Money, concept: impl Into<String>, kind: MovementKind) -> Self {
        NewMovement {
            group_id,
            created_at: Utc::now(),
            amount,
            concept: concept.into(),
            kind,
        }
    }
}

impl Record for Movement {
    type Id = MovementId;
    type Draft = NewMovement;
    const ENTITY: &'static str = "Movement";

    fn id(&self) -> MovementId {
        self.id
    }

    fn from_draft(id: MovementId, draft: NewMovement) -> Self {
        Movement {
            id,
            group_id: draft.group_id,
            created_at: draft.created_at,
            amount: draft.amount,
            concept: draft.concept,
            kind: draft.kind,
        }
    }
}

/// Repository for movements.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    table: Arc<MemoryTable<Movement>>,
}

impl MovementRepository {
    pub fn new(table: Arc<MemoryTable<Movement>>) -> Self {
        MovementRepository { table }
    }

    pub async fn insert(&self, movement: NewMovement) -> Movement {
        let movement = self.table.save(movement).await;
        debug!(
            movement_id = %movement.id,
            group_id = %movement.group_id,
            amount = %movement.amount,
            "Inserted movement"
        );
        movement
    }

    pub async fn get_by_id(&self, id: MovementId) -> StoreResult<Movement> {
        self.table.get_by_id(id).await
    }

    pub async fn get_all(&self) -> Vec<Movement> {
        self.table.get_all().await
    }

    /// Movements of one group, oldest first.
    pub async fn get_by_group_id(&self, group_id: GroupId) -> Vec<Movement> {
        let movements = self.table.filter(|m| m.group_id == group_id).await;
        debug!(group_id = %group_id, count = movements.len(), "Listed movements");
        movements
    }

    pub async fn delete(&self, id: MovementId) -> StoreResult<Movement> {
        self.table.delete(id).await
    }
}
