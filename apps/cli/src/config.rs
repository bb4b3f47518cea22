//! # CLI Configuration
//!
//! Command-line arguments and the layered application configuration.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --remainder-policy assign_to_lowest_id --format json               │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     SPLITIFY_REMAINDER_POLICY=reject                                   │
//! │     SPLITIFY_FORMAT=json                                               │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config PATH, otherwise                                           │
//! │     ~/.config/splitify/config.toml (Linux)                             │
//! │     ~/Library/Application Support/com.splitify.splitify/config.toml    │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     remainder_policy = reject, format = text                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [settlement]
//! remainder_policy = "assign_to_lowest_id"  # reject | assign_to_lowest_id
//!
//! [output]
//! format = "json"  # text | json
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use splitify_core::RemainderPolicy;

use crate::error::{CliError, CliResult};

pub const ENV_REMAINDER_POLICY: &str = "SPLITIFY_REMAINDER_POLICY";
pub const ENV_FORMAT: &str = "SPLITIFY_FORMAT";

// =============================================================================
// Command Line
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "splitify")]
#[command(about = "Settle shared expenses: who owes whom")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a ledger file and print the balances.
    Report(ReportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Ledger file (TOML).
    pub file: PathBuf,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// What to do with the remainder of an uneven split.
    #[arg(long)]
    pub remainder_policy: Option<RemainderPolicy>,

    /// Also list each movement's own settlement.
    #[arg(long)]
    pub per_movement: bool,

    /// Also settle the accumulated shares in a single pass.
    #[arg(long)]
    pub consolidated: bool,

    /// Config file (TOML). Defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

// =============================================================================
// Output Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Aligned, human-readable tables.
    #[default]
    Text,

    /// One JSON document.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidConfig(format!(
                "Unknown output format: '{}'. Valid options: text, json",
                other
            ))),
        }
    }
}

// =============================================================================
// Config File
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementSettings {
    #[serde(default)]
    pub remainder_policy: RemainderPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub settlement: SettlementSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl FileConfig {
    /// Reads a config file. Unknown values are configuration errors.
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| {
            CliError::InvalidConfig(format!("{}: {}", path.display(), e.message()))
        })
    }

    /// `config.toml` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "splitify", "splitify")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Resolved settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AppConfig {
    pub remainder_policy: RemainderPolicy,
    pub format: OutputFormat,
}

impl AppConfig {
    /// Loads the configuration for `splitify report` from every source.
    pub fn load(args: &ReportArgs) -> CliResult<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Layers defaults, config file, environment and flags.
    ///
    /// `env` looks up one environment variable.
    pub fn resolve<E>(args: &ReportArgs, env: E) -> CliResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        // Explicit --config must exist; the platform default is optional.
        let file = match &args.config {
            Some(path) => Some(FileConfig::from_path(path)?),
            None => match FileConfig::default_path() {
                Some(path) if path.exists() => Some(FileConfig::from_path(&path)?),
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    None
                }
                None => None,
            },
        };
        if let Some(file) = file {
            config.remainder_policy = file.settlement.remainder_policy;
            config.format = file.output.format;
        }

        if let Some(policy) = env(ENV_REMAINDER_POLICY) {
            debug!(policy = %policy, "Overriding remainder policy from environment");
            config.remainder_policy = policy.parse().map_err(|e| {
                CliError::InvalidConfig(format!("{}: {}", ENV_REMAINDER_POLICY, e))
            })?;
        }
        if let Some(format) = env(ENV_FORMAT) {
            debug!(format = %format, "Overriding output format from environment");
            config.format = format.parse()?;
        }

        if let Some(policy) = args.remainder_policy {
            config.remainder_policy = policy;
        }
        if let Some(format) = args.format {
            config.format = format;
        }

        info!(
            remainder_policy = %config.remainder_policy,
            format = %config.format,
            "Configuration resolved"
        );
        Ok(config)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(config: Option<PathBuf>) -> ReportArgs {
        ReportArgs {
            file: PathBuf::from("ledger.toml"),
            format: None,
            remainder_policy: None,
            per_movement: false,
            consolidated: false,
            config,
        }
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("splitify-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!(matches!(
            "yaml".parse::<OutputFormat>(),
            Err(CliError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_file_then_env_then_flags() {
        let path = write_config(
            "layers",
            "[settlement]\nremainder_policy = \"assign_to_lowest_id\"\n\n[output]\nformat = \"json\"\n",
        );

        let from_file = AppConfig::resolve(&args(Some(path.clone())), env(&[])).unwrap();
        assert_eq!(from_file.remainder_policy, RemainderPolicy::AssignToLowestId);
        assert_eq!(from_file.format, OutputFormat::Json);

        let from_env = AppConfig::resolve(
            &args(Some(path.clone())),
            env(&[(ENV_REMAINDER_POLICY, "reject")]),
        )
        .unwrap();
        assert_eq!(from_env.remainder_policy, RemainderPolicy::Reject);
        assert_eq!(from_env.format, OutputFormat::Json);

        let mut flagged = args(Some(path.clone()));
        flagged.format = Some(OutputFormat::Text);
        let from_flags = AppConfig::resolve(&flagged, env(&[(ENV_FORMAT, "json")])).unwrap();
        assert_eq!(from_flags.format, OutputFormat::Text);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = write_config("partial", "[output]\nformat = \"json\"\n");
        let config = AppConfig::resolve(&args(Some(path.clone())), env(&[])).unwrap();
        assert_eq!(config.remainder_policy, RemainderPolicy::Reject);
        assert_eq!(config.format, OutputFormat::Json);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_invalid_values() {
        let path = write_config("invalid", "[settlement]\nremainder_policy = \"round_up\"\n");
        assert!(matches!(
            AppConfig::resolve(&args(Some(path.clone())), env(&[])),
            Err(CliError::InvalidConfig(_))
        ));
        std::fs::remove_file(path).unwrap();

        let missing = PathBuf::from("/nonexistent/splitify.toml");
        assert!(matches!(
            AppConfig::resolve(&args(Some(missing)), env(&[])),
            Err(CliError::Io { .. })
        ));

        let empty = write_config("empty", "");
        let bad_env = AppConfig::resolve(
            &args(Some(empty.clone())),
            env(&[(ENV_REMAINDER_POLICY, "sometimes")]),
        );
        assert!(matches!(bad_env, Err(CliError::InvalidConfig(_))));
        std::fs::remove_file(empty).unwrap();
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "splitify",
            "report",
            "trip.toml",
            "--format",
            "json",
            "--remainder-policy",
            "assign_to_lowest_id",
            "--consolidated",
        ])
        .unwrap();

        let Command::Report(report) = cli.command;
        assert_eq!(report.file, PathBuf::from("trip.toml"));
        assert_eq!(report.format, Some(OutputFormat::Json));
        assert_eq!(report.remainder_policy, Some(RemainderPolicy::AssignToLowestId));
        assert!(report.consolidated);
        assert!(!report.per_movement);
    }
}
