//! Report subcommand implementation.
//!
//! Handles `portledger report`, which prints a stored result file without
//! probing anything.

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::ResultStore;
use clap::Parser;
use std::path::PathBuf;

/// Show stored results.
#[derive(Parser, Debug, Default)]
pub struct ReportCommand {
    /// Result file to read (defaults to the configured one)
    #[arg(short = 'f', long = "file", value_name = "PATH", env = "PORTLEDGER_RESULTS_FILE")]
    pub results_file: Option<PathBuf>,

    /// Only list ports classified as OPEN
    #[arg(long)]
    pub open_only: bool,
}

impl ReportCommand {
    /// Execute the report command.
    pub fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let path = self
            .results_file
            .clone()
            .unwrap_or_else(|| settings.results_file.clone());

        let store = ResultStore::load(&path)?;
        if store.is_empty() {
            output::print_warning(&format!("No results found in {}", path.display()));
            return Ok(());
        }

        let listed: ResultStore = if self.open_only {
            store
                .iter()
                .filter(|(_, c)| c.is_open())
                .map(|(port, c)| (port, c.clone()))
                .collect()
        } else {
            store.clone()
        };

        output::print_report(&listed, &path)
            .map_err(|e| CliError::Other(format!("failed to print report: {}", e)))?;
        if !quiet {
            output::print_tally(&store);
        }
        Ok(())
    }
}
