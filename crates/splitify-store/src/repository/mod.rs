//! # Repository Module
//!
//! In-memory repository implementations for Splitify.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LedgerService                                                          │
//! │       │                                                                 │
//! │       │  store.movements().get_by_group_id(group_id)                    │
//! │       ▼                                                                 │
//! │  MovementRepository                                                     │
//! │  ├── insert(&self, new_movement)                                        │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── get_by_group_id(&self, group_id)                                   │
//! │  └── delete(&self, id)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MemoryTable<Movement>  (RwLock + BTreeMap, sequential ids)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`GroupRepository`] - Groups
//! - [`ParticipantRepository`] - Participants, listed per group
//! - [`MovementRepository`] - Expenses and transfers, listed per group
//! - [`ParticipantMovementRepository`] - Contributions, listed per movement

pub mod group;
pub mod movement;
pub mod participant;
pub mod participant_movement;
pub mod table;

pub use group::GroupRepository;
pub use movement::{MovementRepository, NewMovement};
pub use participant::ParticipantRepository;
pub use participant_movement::ParticipantMovementRepository;
pub use table::{MemoryTable, Record};
