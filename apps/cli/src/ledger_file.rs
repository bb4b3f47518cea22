//! # Ledger File
//!
//! TOML description of one group and its movements, replayed through the
//! ledger service.
//!
//! ## Format
//! ```toml
//! [group]
//! name = "Trip"
//!
//! [[participants]]
//! name = "Ana"
//!
//! [[participants]]
//! name = "Bea"
//!
//! [[movements]]
//! kind = "expense"
//! concept = "Lunch"
//! amount = 1000                       # minor units
//! contributions = [
//!     { participant = "Ana", amount = 1000 },
//!     { participant = "Bea", amount = 0 },
//! ]
//!
//! [[movements]]
//! kind = "transfer"
//! concept = "Payback"
//! amount = 500
//! from = "Bea"
//! to = "Ana"
//! ```
//!
//! Participants are referenced by name; movements are numbered from 1 in
//! file order for error messages.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, info};

use splitify_core::{Contribution, Group, Money, ParticipantId};
use splitify_store::LedgerService;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Deserialize)]
pub struct GroupEntry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantEntry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionEntry {
    pub participant: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementEntry {
    Expense {
        #[serde(default)]
        concept: String,
        amount: Money,
        contributions: Vec<ContributionEntry>,
    },
    Transfer {
        #[serde(default)]
        concept: String,
        amount: Money,
        from: String,
        to: String,
    },
}

impl MovementEntry {
    pub fn concept(&self) -> &str {
        match self {
            MovementEntry::Expense { concept, .. } | MovementEntry::Transfer { concept, .. } => {
                concept
            }
        }
    }
}

/// A parsed ledger file.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerFile {
    pub group: GroupEntry,

    #[serde(default)]
    pub participants: Vec<ParticipantEntry>,

    #[serde(default)]
    pub movements: Vec<MovementEntry>,
}

impl FromStr for LedgerFile {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// The group created from a ledger file, with participant names by id.
#[derive(Debug, Clone)]
pub struct LoadedLedger {
    pub group: Group,
    pub names: BTreeMap<ParticipantId, String>,
}

impl LoadedLedger {
    /// Display name of a participant, `#id` when unknown.
    pub fn name_of(&self, participant: ParticipantId) -> String {
        self.names
            .get(&participant)
            .cloned()
            .unwrap_or_else(|| format!("#{}", participant))
    }
}

impl LedgerFile {
    pub fn from_path(path: &Path) -> CliResult<Self> {
        info!(?path, "Reading ledger file");
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse().map_err(|source| CliError::ParseLedger {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Creates the group, its participants and its movements in `service`.
    ///
    /// Stops at the first movement that refers to an unknown participant or
    /// is rejected by the service.
    pub async fn load_into(&self, service: &LedgerService) -> CliResult<LoadedLedger> {
        let group = service.create_group(&self.group.name).await?;

        let mut ids: BTreeMap<String, ParticipantId> = BTreeMap::new();
        let mut names = BTreeMap::new();
        for entry in &self.participants {
            let participant = service.add_participant(group.id, &entry.name).await?;
            if ids.insert(participant.name.clone(), participant.id).is_some() {
                return Err(CliError::DuplicateParticipant {
                    name: participant.name,
                });
            }
            names.insert(participant.id, participant.name);
        }

        for (offset, movement) in self.movements.iter().enumerate() {
            let index = offset + 1;
            let lookup = |name: &str| {
                ids.get(name.trim()).copied().ok_or_else(|| CliError::UnknownParticipant {
                    index,
                    concept: movement.concept().to_string(),
                    name: name.to_string(),
                })
            };

            let recorded = match movement {
                MovementEntry::Expense {
                    concept,
                    amount,
                    contributions,
                } => {
                    let contributions = contributions
                        .iter()
                        .map(|c| Ok(Contribution::new(lookup(&c.participant)?, c.amount)))
                        .collect::<CliResult<Vec<_>>>()?;
                    service
                        .add_movement(group.id, *amount, concept, contributions)
                        .await
                }
                MovementEntry::Transfer {
                    concept,
                    amount,
                    from,
                    to,
                } => {
                    let (from, to) = (lookup(from)?, lookup(to)?);
                    service.add_transfer(group.id, from, to, *amount, concept).await
                }
            };

            recorded.map_err(|source| CliError::RejectedMovement {
                index,
                concept: movement.concept().to_string(),
                source,
            })?;
            debug!(index, concept = %movement.concept(), "Movement loaded");
        }

        info!(
            group = %group.name,
            participants = names.len(),
            movements = self.movements.len(),
            "Ledger loaded"
        );
        Ok(LoadedLedger { group, names })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitify_core::CoreError;
    use splitify_store::{Store, StoreError};

    const TRIP: &str = r#"
[group]
name = "Trip"

[[participants]]
name = "Ana"

[[participants]]
name = "Bea"

[[participants]]
name = "Cai"

[[movements]]
kind = "expense"
concept = "Dinner"
amount = 900
contributions = [
    { participant = "Ana", amount = 700 },
    { participant = "Bea", amount = 200 },
    { participant = "Cai", amount = 0 },
]

[[movements]]
kind = "transfer"
concept = "Payback"
amount = 300
from = "Cai"
to = "Ana"
"#;

    #[test]
    fn test_parse() {
        let file: LedgerFile = TRIP.parse().unwrap();
        assert_eq!(file.group.name, "Trip");
        assert_eq!(file.participants.len(), 3);
        assert_eq!(file.movements.len(), 2);
        assert!(matches!(
            &file.movements[1],
            MovementEntry::Transfer { amount, from, .. } if *amount == Money::from_minor(300) && from == "Cai"
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let bad = "[group]\nname = \"x\"\n\n[[movements]]\nkind = \"gift\"\namount = 1\n";
        assert!(bad.parse::<LedgerFile>().is_err());
    }

    #[tokio::test]
    async fn test_load_into_service() {
        let file: LedgerFile = TRIP.parse().unwrap();
        let service = LedgerService::new(Store::new());
        let loaded = file.load_into(&service).await.unwrap();

        let ana = ParticipantId::new(1);
        let cai = ParticipantId::new(3);
        assert_eq!(loaded.name_of(ana), "Ana");
        assert_eq!(loaded.name_of(ParticipantId::new(99)), "#99");

        let report = service.calculate_balances(loaded.group.id).await.unwrap();
        assert_eq!(report.events, 2);
        assert_eq!(report.shares.share_of(cai), Money::ZERO);
        assert_eq!(report.shares.share_of(ana), Money::from_minor(100));
    }

    #[tokio::test]
    async fn test_unknown_participant_names_the_movement() {
        let file: LedgerFile = r#"
[group]
name = "Trip"

[[participants]]
name = "Ana"

[[movements]]
kind = "transfer"
concept = "Loan"
amount = 100
from = "Ana"
to = "Zoe"
"#
        .parse()
        .unwrap();

        let err = file
            .load_into(&LedgerService::new(Store::new()))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Movement 1 ('Loan') refers to unknown participant 'Zoe'"
        );
    }

    #[tokio::test]
    async fn test_rejected_movement_names_the_movement() {
        let file: LedgerFile = r#"
[group]
name = "Trip"

[[participants]]
name = "Ana"

[[participants]]
name = "Bea"

[[movements]]
kind = "expense"
concept = "Lunch"
amount = 1000
contributions = [{ participant = "Ana", amount = 900 }, { participant = "Bea", amount = 0 }]
"#
        .parse()
        .unwrap();

        let err = file
            .load_into(&LedgerService::new(Store::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::RejectedMovement {
                index: 1,
                source: StoreError::Core(CoreError::AmountMismatch { .. }),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_amounts_past_the_limit_are_rejected() {
        let file: LedgerFile = r#"
[group]
name = "Trip"

[[participants]]
name = "Ana"

[[participants]]
name = "Bea"

[[participants]]
name = "Cai"

[[movements]]
kind = "expense"
concept = "Yacht"
amount = 0
contributions = [
    { participant = "Ana", amount = 9223372036854775807 },
    { participant = "Bea", amount = 9223372036854775807 },
    { participant = "Cai", amount = 2 },
]
"#
        .parse()
        .unwrap();

        let err = file
            .load_into(&LedgerService::new(Store::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::RejectedMovement {
                index: 1,
                source: StoreError::Core(CoreError::AmountOverflow),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_participant_names() {
        let file: LedgerFile = "[group]\nname = \"Trip\"\n\n[[participants]]\nname = \"Ana\"\n\n[[participants]]\nname = \" Ana \"\n"
            .parse()
            .unwrap();
        let err = file
            .load_into(&LedgerService::new(Store::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::DuplicateParticipant { name } if name == "Ana"));
    }
}
