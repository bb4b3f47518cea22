//! # splitify
//!
//! `splitify report ledger.toml [--format json] [--per-movement] [--consolidated]`
//!
//! ## Logging
//! Logs go to stderr so the report on stdout stays clean.
//! - `RUST_LOG=info` - Show admitted movements and the resolved config
//! - `RUST_LOG=splitify_store=debug` - Show repository operations
//! - Default: WARN level

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use splitify_cli::{run_report, AppConfig, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Report(args) => {
            let config = AppConfig::load(&args).context("Failed to load configuration")?;
            let output = run_report(&args, &config)
                .await
                .with_context(|| format!("Failed to report on {}", args.file.display()))?;
            println!("{}", output.trim_end());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
