//! # Memory Table
//!
//! Generic keyed table backing every repository.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MemoryTable<R>                                                         │
//! │                                                                         │
//! │   RwLock ─► { rows: BTreeMap<R::Id, R>, next_id }                       │
//! │                                                                         │
//! │   save(draft)  ──► id = next_id++ ──► R::from_draft(id, draft)          │
//! │   get_all()    ──► rows in ascending id (= creation) order              │
//! │   update(row)  ──► replace, NotFound if the id was never saved          │
//! │   delete(id)   ──► remove, NotFound if absent                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids start at 1 and are never reused, even after a delete.

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// A row type that can live in a [`MemoryTable`].
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    /// Typed id assigned by the table.
    type Id: Copy + Ord + From<u64> + fmt::Display + fmt::Debug + Send + Sync;

    /// Row contents before an id is assigned.
    type Draft: Send;

    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;
}

#[derive(Debug)]
struct TableState<R: Record> {
    rows: BTreeMap<R::Id, R>,
    next_id: u64,
}

/// Keyed storage with sequential id assignment.
///
/// Many readers or one writer at a time; every method takes the lock for
/// its own duration only.
#[derive(Debug)]
pub struct MemoryTable<R: Record> {
    state: RwLock<TableState<R>>,
}

impl<R: Record> Default for MemoryTable<R> {
    fn default() -> Self {
        MemoryTable::new()
    }
}

impl<R: Record> MemoryTable<R> {
    pub fn new() -> Self {
        MemoryTable {
            state: RwLock::new(TableState {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// All rows in ascending id order.
    pub async fn get_all(&self) -> Vec<R> {
        self.state.read().await.rows.values().cloned().collect()
    }

    /// Rows matching `predicate`, in ascending id order.
    pub async fn filter<F>(&self, predicate: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        self.state
            .read()
            .await
            .rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    pub async fn get_by_id(&self, id: R::Id) -> StoreResult<R> {
        self.state
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(R::ENTITY, id))
    }

    /// Assigns the next id and stores the row.
    pub async fn save(&self, draft: R::Draft) -> R {
        let mut state = self.state.write().await;
        let id = R::Id::from(state.next_id);
        state.next_id += 1;

        let row = R::from_draft(id, draft);
        state.rows.insert(id, row.clone());
        debug!(entity = R::ENTITY, id = %id, "Saved row");
        row
    }

    /// Replaces an existing row.
    pub async fn update(&self, row: R) -> StoreResult<R> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&row.id()) {
            Some(existing) => {
                *existing = row.clone();
                debug!(entity = R::ENTITY, id = %row.id(), "Updated row");
                Ok(row)
            }
            None => Err(StoreError::not_found(R::ENTITY, row.id())),
        }
    }

    /// Removes a row, returning it.
    pub async fn delete(&self, id: R::Id) -> StoreResult<R> {
        let removed = self.state.write().await.rows.remove(&id);
        match removed {
            Some(row) => {
                debug!(entity = R::ENTITY, id = %id, "Deleted row");
                Ok(row)
            }
            None => Err(StoreError::not_found(R::ENTITY, id)),
        }
    }

    /// Removes every row matching `predicate`, returning how many went.
    pub async fn delete_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&R) -> bool,
    {
        let mut state = self.state.write().await;
        let before = state.rows.len();
        state.rows.retain(|_, row| !predicate(row));
        let removed = before - state.rows.len();
        debug!(entity = R::ENTITY, removed, "Deleted rows");
        removed
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.rows.is_empty()
    }
}
