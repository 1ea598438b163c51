//! CLI subcommand definitions and handlers.
//!
//! - `portledger [scan]` - Scan (or resume scanning) the configured target
//! - `portledger report` - Print a stored result file with a summary

mod report;
mod scan;

pub use report::ReportCommand;
pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// portledger - A resumable TCP port scanner.
///
/// Probes every port of a range on one host, classifies each as OPEN,
/// REFUSED, BLOCKED or ERROR-*, and keeps the results in a text file so an
/// interrupted scan picks up where it left off.
#[derive(Parser, Debug)]
#[command(name = "portledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A resumable, firewall-aware port scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute (defaults to `scan`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress and the final record listing
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a JSON settings file
    #[arg(long, global = true, value_name = "PATH", env = "PORTLEDGER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target, resuming from the result file
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Show stored results
    #[command(alias = "r")]
    Report(ReportCommand),
}

impl Cli {
    /// Dispatch to the selected subcommand.
    pub async fn execute(self) -> CliResult<()> {
        let settings = AppSettings::load(self.config.as_deref())?;

        match self.command {
            Some(Commands::Report(cmd)) => cmd.execute(&settings, self.quiet),
            Some(Commands::Scan(cmd)) => cmd.execute(&settings, self.quiet).await,
            None => {
                // Parse an empty argument list so PORTLEDGER_* variables still apply.
                let cmd = ScanCommand::try_parse_from(["portledger"])
                    .map_err(|e| CliError::Other(e.to_string()))?;
                cmd.execute(&settings, self.quiet).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["portledger"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_scan_flags() {
        let cli = Cli::try_parse_from([
            "portledger",
            "-v",
            "scan",
            "--host",
            "127.0.0.1",
            "-p",
            "1-100",
            "-t",
            "250",
            "--flush-every",
            "10",
            "--flush-on",
            "new-records",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Scan(cmd)) => {
                assert_eq!(cmd.host.as_deref(), Some("127.0.0.1"));
                assert_eq!(cmd.ports.as_deref(), Some("1-100"));
                assert_eq!(cmd.timeout, Some(250));
                assert_eq!(cmd.flush_every, Some(10));
                assert_eq!(
                    cmd.flush_on,
                    Some(crate::scanner::FlushCadence::NewRecords)
                );
            }
            other => panic!("expected scan command, got {:?}", other),
        }
    }

    #[test]
    fn test_report_alias() {
        let cli = Cli::try_parse_from(["portledger", "r", "--file", "out.txt"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Report(_))));
    }
}
