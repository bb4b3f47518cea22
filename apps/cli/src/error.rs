//! # CLI Error Type
//!
//! Everything that can go wrong between reading a ledger file and printing
//! the report.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  config / env / flags  ──► InvalidConfig                                │
//! │  ledger file           ──► Io, ParseLedger, UnknownParticipant, ...     │
//! │  ledger service        ──► Store(StoreError)                            │
//! │  output                ──► Json                                         │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                  anyhow in main() → stderr, exit code 1                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use splitify_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The ledger file is not valid TOML or has the wrong shape.
    #[error("Invalid ledger file {}: {source}", path.display())]
    ParseLedger {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A configuration value from the config file, environment or flags is
    /// not acceptable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two participants of the ledger file share a name.
    #[error("Participant '{name}' is listed more than once")]
    DuplicateParticipant { name: String },

    /// A movement names a participant that is not listed.
    #[error("Movement {index} ('{concept}') refers to unknown participant '{name}'")]
    UnknownParticipant {
        index: usize,
        concept: String,
        name: String,
    },

    /// A movement was rejected by the ledger service.
    #[error("Movement {index} ('{concept}') rejected: {source}")]
    RejectedMovement {
        index: usize,
        concept: String,
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cannot render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
