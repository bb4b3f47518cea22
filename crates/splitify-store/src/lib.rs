//! # splitify-store: Ledger Storage for Splitify
//!
//! Keeps groups, participants and movements in memory and runs the
//! settlement engine over them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Splitify Data Flow                               │
//! │                                                                         │
//! │  splitify report ledger.toml                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  splitify-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ LedgerService │    │  Repositories │    │    Store     │  │   │
//! │  │   │ (service.rs)  │───►│ (repository/) │◄───│  (store.rs)  │  │   │
//! │  │   │ admission     │    │ GroupRepo     │    │ Arc'd tables │  │   │
//! │  │   │ balances      │    │ MovementRepo  │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  splitify-core SettlementEngine (pure)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Table ownership and repository accessors
//! - [`repository`] - Repository implementations over generic memory tables
//! - [`service`] - Ledger operations and balance queries
//! - [`error`] - Store error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod repository;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use service::{LedgerService, MovementSettlement};
pub use store::Store;

pub use repository::{
    GroupRepository, MovementRepository, ParticipantMovementRepository, ParticipantRepository,
};
