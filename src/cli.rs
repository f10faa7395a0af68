//! CLI command definitions and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

/// Cascade — dependency fan-out orchestrator.
#[derive(Parser)]
#[command(
    name = "cascade",
    about = "Fans a dependency version bump out to every dependent repository",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true, help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the fan-out plan without executing it
    Plan {
        /// Module import path being bumped, e.g. github.com/example/lib
        module: String,

        /// Target version, e.g. v1.2.3
        version: String,

        /// Path to the manifest file
        #[arg(short, long, default_value = "cascade-manifest.yml")]
        manifest: PathBuf,

        /// Number of dependency checks to run concurrently
        #[arg(short, long, default_value = "4")]
        parallelism: usize,

        /// Include dependents already at the target version instead of skipping them
        #[arg(long)]
        force_all: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Plan and fully execute the fan-out
    Release {
        module: String,
        version: String,

        #[arg(short, long, default_value = "cascade-manifest.yml")]
        manifest: PathBuf,

        #[arg(short, long, default_value = "4")]
        parallelism: usize,

        /// Include dependents already at the target version instead of skipping them
        #[arg(long)]
        force_all: bool,

        /// Plan and print what would happen without cloning, editing, or opening PRs
        #[arg(long)]
        dry_run: bool,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Re-run a prior `release`, skipping items already in a terminal state
    Resume {
        module: String,
        version: String,

        #[arg(short, long, default_value = "cascade-manifest.yml")]
        manifest: PathBuf,

        #[arg(short, long, default_value = "4")]
        parallelism: usize,

        /// Include dependents already at the target version instead of skipping them
        #[arg(long)]
        force_all: bool,

        #[arg(long)]
        dry_run: bool,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete the remote branch for every completed item of a prior run
    Revert {
        module: String,
        version: String,
    },

    /// Manifest authoring helpers
    Manifest {
        #[command(subcommand)]
        command: ManifestCommand,
    },

    /// Print the crate version
    Version,
}

/// Manifest subcommands.
#[derive(Debug, Subcommand)]
pub enum ManifestCommand {
    /// Discover dependents and write (or merge into) a manifest file
    Generate {
        /// Module import path to discover dependents for
        module: String,

        /// Repo that owns the module, e.g. example/lib
        repo: String,

        #[arg(short, long, default_value = "cascade-manifest.yml")]
        out: PathBuf,
    },

    /// Validate a manifest file without planning or running anything
    Validate {
        #[arg(default_value = "cascade-manifest.yml")]
        manifest: PathBuf,
    },
}

/// Output format for the `plan`/`release`/`resume` summaries.
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown format: {s}. Use: text or json")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_command() {
        let cli = Cli::parse_from(["cascade", "plan", "github.com/example/lib", "v1.2.3"]);
        match cli.command {
            Command::Plan { module, version, parallelism, .. } => {
                assert_eq!(module, "github.com/example/lib");
                assert_eq!(version, "v1.2.3");
                assert_eq!(parallelism, 4);
            }
            other => panic!("expected Plan, got {other:?}"),
        }
    }

    #[test]
    fn parses_release_with_dry_run() {
        let cli = Cli::parse_from(["cascade", "release", "github.com/example/lib", "v1.2.3", "--dry-run"]);
        assert!(matches!(cli.command, Command::Release { dry_run: true, .. }));
    }

    #[test]
    fn parses_manifest_generate() {
        let cli = Cli::parse_from(["cascade", "manifest", "generate", "github.com/example/lib", "example/lib"]);
        assert!(matches!(
            cli.command,
            Command::Manifest { command: ManifestCommand::Generate { .. } }
        ));
    }

    #[test]
    fn parses_version_command() {
        let cli = Cli::parse_from(["cascade", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn cli_accepts_config_flag() {
        let cli = Cli::parse_from(["cascade", "-c", "/tmp/cascade.yml", "version"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/cascade.yml")));
    }
}
