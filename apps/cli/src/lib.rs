//! # splitify: Command-Line Front End
//!
//! Replays a ledger file through an in-memory [`LedgerService`] and renders
//! the balances.
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap) ─────────────────────────────────────────► │
//! │  2. Resolve AppConfig (flags > env > config.toml > defaults) ───────► │
//! │  3. Read ledger.toml ───────────────────────────────────────────────► │
//! │  4. Create group, participants, movements in a fresh Store ─────────► │
//! │  5. calculate_balances + optional per-movement / consolidated views ─► │
//! │  6. Render text or JSON to stdout ──────────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod ledger_file;
pub mod report;

use splitify_core::SettlementEngine;
use splitify_store::{LedgerService, Store};
use tracing::info;

pub use config::{AppConfig, Cli, Command, OutputFormat, ReportArgs};
pub use error::{CliError, CliResult};
pub use ledger_file::{LedgerFile, LoadedLedger};
pub use report::ReportView;

/// Runs `splitify report` and returns the rendered output.
pub async fn run_report(args: &ReportArgs, config: &AppConfig) -> CliResult<String> {
    let file = LedgerFile::from_path(&args.file)?;
    let view = build_report(&file, args, config).await?;
    view.render(config.format)
}

/// Replays `file` into a fresh store and builds the report view.
pub async fn build_report(
    file: &LedgerFile,
    args: &ReportArgs,
    config: &AppConfig,
) -> CliResult<ReportView> {
    let engine = SettlementEngine::new().remainder_policy(config.remainder_policy);
    let service = LedgerService::with_engine(Store::new(), engine);

    let ledger = file.load_into(&service).await?;
    let report = service.calculate_balances(ledger.group.id).await?;

    let mut view = ReportView::new(&ledger, &report);
    if args.consolidated {
        view = view.with_consolidated(&ledger, &report);
    }
    if args.per_movement {
        let settled = service.movement_settlements(ledger.group.id).await?;
        view = view.with_movements(&ledger, &settled);
    }

    info!(
        group = %ledger.group.name,
        movements = report.events,
        obligations = report.debit_credit.len(),
        "Report built"
    );
    Ok(view)
}
