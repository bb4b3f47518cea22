//! # Participant Repository
//!
//! Storage operations for participants.
//!
//! Participant ids are unique across the whole store, not per group, so a
//! contribution only needs the participant id to be traced back to its
//! group.

use std::sync::Arc;

use tracing::debug;

use splitify_core::{GroupId, Participant, ParticipantId};

use super::table::{MemoryTable, Record};
use crate::error::StoreResult;

/// A participant before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub group_id: GroupId,
    pub name: String,
}

impl Record for Participant {
    type Id = ParticipantId;
    type Draft = NewParticipant;
    const ENTITY: &'static str = "Participant";

    fn id(&self) -> ParticipantId {
        self.id
    }

    fn from_draft(id: ParticipantId, draft: NewParticipant) -> Self {
        Participant {
            id,
            group_id: draft.group_id,
            name: draft.name,
        }
    }
}

/// Repository for participants.
#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    table: Arc<MemoryTable<Participant>>,
}

impl ParticipantRepository {
    pub fn new(table: Arc<MemoryTable<Participant>>) -> Self {
        ParticipantRepository { table }
    }

    /// Stores a new participant.
    ///
    /// Does not check that the group exists; the ledger service does that
    /// under its write lock.
    pub async fn insert(&self, group_id: GroupId, name: impl Into<String>) -> Participant {
        let participant = self
            .table
            .save(NewParticipant {
                group_id,
                name: name.into(),
            })
            .await;
        debug!(
            participant_id = %participant.id,
            group_id = %group_id,
            "Inserted participant"
        );
        participant
    }

    pub async fn get_by_id(&self, id: ParticipantId) -> StoreResult<Participant> {
        self.table.get_by_id(id).await
    }

    pub async fn get_all(&self) -> Vec<Participant> {
        self.table.get_all().await
    }

    /// Participants of one group, in creation order.
    pub async fn get_by_group_id(&self, group_id: GroupId) -> Vec<Participant> {
        let participants = self.table.filter(|p| p.group_id == group_id).await;
        debug!(group_id = %group_id, count = participants.len(), "Listed participants");
        participants
    }

    pub async fn update(&self, participant: Participant) -> StoreResult<Participant> {
        self.table.update(participant).await
    }

    pub async fn delete(&self, id: ParticipantId) -> StoreResult<Participant> {
        self.table.delete(id).await
    }
}
