//! # Report Rendering
//!
//! Turns a balance report into named lines and prints them as text or JSON.
//!
//! ```text
//! Trip: 2 movements
//!
//! Balances
//!   Ana    1.00
//!   Bea   -1.00
//!   Cai    0.00
//!
//! Who owes whom
//!   Bea -> Ana    1.00
//! ```

use std::fmt::Write as _;

use serde::Serialize;

use splitify_core::{BalanceReport, DebitCreditMap, Money, MovementId, MovementKind};
use splitify_store::MovementSettlement;

use crate::config::OutputFormat;
use crate::error::CliResult;
use crate::ledger_file::LoadedLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceLine {
    pub participant: String,
    pub share: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtLine {
    pub debtor: String,
    pub creditor: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementLine {
    pub id: MovementId,
    pub kind: String,
    pub concept: String,
    pub amount: Money,
    pub debts: Vec<DebtLine>,
}

/// Everything printed by `splitify report`, with participants by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    pub group: String,
    pub movements: usize,
    pub balances: Vec<BalanceLine>,
    pub debts: Vec<DebtLine>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidated: Option<Vec<DebtLine>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_movement: Option<Vec<MovementLine>>,
}

impl ReportView {
    /// Names every line of `report`.
    ///
    /// Every participant of the group gets a balance line, including those
    /// without movements.
    pub fn new(ledger: &LoadedLedger, report: &BalanceReport) -> Self {
        let balances = ledger
            .names
            .iter()
            .map(|(id, name)| BalanceLine {
                participant: name.clone(),
                share: report.shares.share_of(*id),
            })
            .collect();

        ReportView {
            group: ledger.group.name.clone(),
            movements: report.events,
            balances,
            debts: debt_lines(ledger, &report.debit_credit),
            consolidated: None,
            per_movement: None,
        }
    }

    /// Adds the single-pass settlement of the accumulated shares.
    pub fn with_consolidated(mut self, ledger: &LoadedLedger, report: &BalanceReport) -> Self {
        self.consolidated = Some(debt_lines(ledger, &report.consolidated()));
        self
    }

    /// Adds each movement's own settlement.
    pub fn with_movements(mut self, ledger: &LoadedLedger, settled: &[MovementSettlement]) -> Self {
        let lines = settled
            .iter()
            .map(|entry| MovementLine {
                id: entry.movement.id,
                kind: match entry.movement.kind {
                    MovementKind::Expense => "expense".to_string(),
                    MovementKind::Transfer { .. } => "transfer".to_string(),
                },
                concept: entry.movement.concept.clone(),
                amount: entry.movement.amount,
                debts: debt_lines(ledger, &entry.settlement.debit_credit),
            })
            .collect();
        self.per_movement = Some(lines);
        self
    }

    pub fn render(&self, format: OutputFormat) -> CliResult<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let plural = if self.movements == 1 { "" } else { "s" };
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}: {} movement{}", self.group, self.movements, plural);

        out.push_str("\nBalances\n");
        let width = self
            .balances
            .iter()
            .map(|line| line.participant.chars().count())
            .max()
            .unwrap_or(0);
        for line in &self.balances {
            let _ = writeln!(
                out,
                "  {:<width$}  {:>10}",
                line.participant,
                line.share.to_string(),
                width = width
            );
        }

        out.push_str("\nWho owes whom\n");
        write_debts(&mut out, &self.debts, "  ");

        if let Some(consolidated) = &self.consolidated {
            out.push_str("\nConsolidated\n");
            write_debts(&mut out, consolidated, "  ");
        }

        if let Some(movements) = &self.per_movement {
            out.push_str("\nPer movement\n");
            for movement in movements {
                let _ = writeln!(
                    out,
                    "  #{} {} '{}' {}",
                    movement.id, movement.kind, movement.concept, movement.amount
                );
                write_debts(&mut out, &movement.debts, "    ");
            }
        }

        out
    }
}

fn debt_lines(ledger: &LoadedLedger, debts: &DebitCreditMap) -> Vec<DebtLine> {
    debts
        .obligations()
        .map(|obligation| DebtLine {
            debtor: ledger.name_of(obligation.debtor),
            creditor: ledger.name_of(obligation.creditor),
            amount: obligation.amount,
        })
        .collect()
}

fn write_debts(out: &mut String, debts: &[DebtLine], indent: &str) {
    if debts.is_empty() {
        let _ = writeln!(out, "{}nobody owes anything", indent);
        return;
    }

    let width = debts
        .iter()
        .map(|line| line.debtor.chars().count() + line.creditor.chars().count() + 4)
        .max()
        .unwrap_or(0);
    for line in debts {
        let pair = format!("{} -> {}", line.debtor, line.creditor);
        let _ = writeln!(
            out,
            "{}{:<width$}  {:>10}",
            indent,
            pair,
            line.amount.to_string(),
            width = width
        );
    }
}
