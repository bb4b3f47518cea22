//! # Group Repository
//!
//! Storage operations for groups.

use std::sync::Arc;

use tracing::debug;

use splitify_core::{Group, GroupId};

use super::table::{MemoryTable, Record};
use crate::error::StoreResult;

/// A group before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
}

impl Record for Group {
    type Id = GroupId;
    type Draft = NewGroup;
    const ENTITY: &'static str = "Group";

    fn id(&self) -> GroupId {
        self.id
    }

    fn from_draft(id: GroupId, draft: NewGroup) -> Self {
        Group {
            id,
            name: draft.name,
        }
    }
}

/// Repository for groups.
///
/// ## Usage
/// ```rust,ignore
/// let trip = store.groups().insert("Trip").await;
/// let again = store.groups().get_by_id(trip.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct GroupRepository {
    table: Arc<MemoryTable<Group>>,
}

impl GroupRepository {
    pub fn new(table: Arc<MemoryTable<Group>>) -> Self {
        GroupRepository { table }
    }

    /// Stores a new group. The name is expected to be validated already.
    pub async fn insert(&self, name: impl Into<String>) -> Group {
        let group = self.table.save(NewGroup { name: name.into() }).await;
        debug!(group_id = %group.id, name = %group.name, "Inserted group");
        group
    }

    pub async fn get_by_id(&self, id: GroupId) -> StoreResult<Group> {
        self.table.get_by_id(id).await
    }

    /// All groups in creation order.
    pub async fn get_all(&self) -> Vec<Group> {
        self.table.get_all().await
    }

    pub async fn update(&self, group: Group) -> StoreResult<Group> {
        self.table.update(group).await
    }

    pub async fn delete(&self, id: GroupId) -> StoreResult<Group> {
        self.table.delete(id).await
    }
}
