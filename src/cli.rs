//! Command-line interface definitions for mcbeacon.
//!
//! Uses `clap` derive macros for declarative argument parsing. Every option
//! can also be set from the environment so a container image can configure
//! its healthcheck without touching the command.

use crate::config::{default_search_root, locate, ConfigDocument, ConfigParser};
use crate::error::CliResult;
use crate::output::{self, HealthReport};
use crate::probe::{ProtocolSelection, ServerProbe};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const AFTER_HELP: &str = "\
CONFIG_PATH may be a server config file or a directory containing one of
server.properties, config.yml or velocity.toml (searched in that order).
Defaults to the home directory.

Exit codes:
  0  the server answered a status request
  1  the server did not answer
  2  configuration error or invalid arguments";

/// Healthcheck for Minecraft Java and Bedrock servers.
///
/// Reads the server's bind address from its configuration file and checks
/// that the server answers a status request.
#[derive(Parser, Debug)]
#[command(name = "mcbeacon")]
#[command(version)]
#[command(about = "Healthcheck for Minecraft servers", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Server config file, or a directory to search for one
    #[arg(value_name = "CONFIG_PATH", env = "MCBEACON_CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Protocols to probe
    #[arg(
        short,
        long,
        value_enum,
        default_value = "both",
        env = "MCBEACON_PROTOCOL"
    )]
    pub protocol: ProtocolSelection,

    /// Per-protocol handshake timeout in milliseconds
    #[arg(short, long, default_value = "250", env = "MCBEACON_TIMEOUT_MS")]
    pub timeout: u64,

    /// Probe a wildcard bind address (0.0.0.0 or ::) as-is instead of loopback
    #[arg(long)]
    pub no_loopback: bool,

    /// Output format for the report
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Suppress the report; rely on the exit code
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable one-liner
    #[default]
    Plain,
    /// JSON structured output
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl Cli {
    /// Run one locate, parse and probe cycle.
    ///
    /// Returns whether the server answered. Configuration problems are
    /// errors; an unreachable server is not.
    pub async fn execute(&self) -> CliResult<bool> {
        let root = self.config_path.clone().unwrap_or_else(default_search_root);
        let path = locate(&root)?;
        info!("using {}", path.display());

        let document = ConfigDocument::load(&path)?;
        let binding = ConfigParser::new()
            .with_any_address_rewrite(!self.no_loopback)
            .parse(&document)?;

        let probe = ServerProbe::new(Duration::from_millis(self.timeout));
        let status = probe.race(&binding, self.protocol).await;
        let reachable = status.is_some();

        if !self.quiet {
            output::print_report(&HealthReport::new(&binding, status), self.output)?;
        }

        Ok(reachable)
    }
}
