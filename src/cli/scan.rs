//! Scan subcommand implementation.
//!
//! Handles `portledger scan` (also the default when no subcommand is given).

use crate::config::AppSettings;
use crate::error::{CliError, CliResult, ConfigError};
use crate::output;
use crate::scanner::{
    FlushCadence, Orchestrator, Prober, RateLimiter, ScanPlan, ScanProgress, TcpProber,
};
use crate::types::{PortRange, TargetSpec};
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Scan a target, skipping ports already present in the result file.
///
/// Every option falls back to the settings file and then to built-in
/// defaults, so `portledger` with no arguments scans portquiz.net 1-9999.
#[derive(Parser, Debug, Default)]
pub struct ScanCommand {
    /// Target IP address or hostname
    #[arg(long, value_name = "HOST", env = "PORTLEDGER_HOST")]
    pub host: Option<String>,

    /// Port range to cover (e.g. "1-9999" or "443")
    #[arg(short, long, value_name = "RANGE", env = "PORTLEDGER_PORTS")]
    pub ports: Option<String>,

    /// Connection timeout per probe in milliseconds
    #[arg(short = 't', long, value_name = "MS", env = "PORTLEDGER_TIMEOUT_MS")]
    pub timeout: Option<u64>,

    /// Result file used for resuming and for the final output
    #[arg(short = 'f', long = "file", value_name = "PATH", env = "PORTLEDGER_RESULTS_FILE")]
    pub results_file: Option<PathBuf>,

    /// Number of new records between intermediate saves
    #[arg(long, value_name = "N", env = "PORTLEDGER_FLUSH_EVERY")]
    pub flush_every: Option<usize>,

    /// Which counter the save interval applies to
    #[arg(long, value_enum, value_name = "CADENCE", env = "PORTLEDGER_FLUSH_ON")]
    pub flush_on: Option<FlushCadence>,

    /// Maximum probes per second (0 = unlimited)
    #[arg(short = 'r', long = "rate", value_name = "N", env = "PORTLEDGER_RATE")]
    pub rate_limit: Option<u32>,

    /// Don't print every record when the scan ends
    #[arg(long)]
    pub no_report: bool,
}

/// Fully resolved scan options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub target: TargetSpec,
    pub range: PortRange,
    pub timeout: Duration,
    pub results_file: PathBuf,
    pub flush_interval: NonZeroUsize,
    pub cadence: FlushCadence,
    pub rate_limit: u32,
}

impl ScanOptions {
    /// Build the orchestrator plan for these options.
    pub fn plan(&self) -> ScanPlan {
        ScanPlan::new(self.range, self.results_file.clone())
            .with_flush_interval(self.flush_interval)
            .with_cadence(self.cadence)
    }
}

impl ScanCommand {
    /// Merge flags over settings and validate the result.
    pub fn resolve(&self, settings: &AppSettings) -> CliResult<ScanOptions> {
        let host = self.host.as_deref().unwrap_or(&settings.host);
        let target = TargetSpec::parse(host)?;

        let range: PortRange = self.ports.as_deref().unwrap_or(&settings.ports).parse()?;

        let timeout_ms = self.timeout.unwrap_or(settings.timeout_ms);
        if timeout_ms == 0 {
            let msg = "timeout must be greater than 0".to_string();
            return Err(ConfigError::InvalidValue(msg).into());
        }

        let flush_interval =
            NonZeroUsize::new(self.flush_every.unwrap_or(settings.flush_interval)).ok_or_else(
                || ConfigError::InvalidValue("flush interval must be greater than 0".to_string()),
            )?;

        Ok(ScanOptions {
            target,
            range,
            timeout: Duration::from_millis(timeout_ms),
            results_file: self
                .results_file
                .clone()
                .unwrap_or_else(|| settings.results_file.clone()),
            flush_interval,
            cadence: self.flush_on.unwrap_or(settings.flush_cadence),
            rate_limit: self.rate_limit.unwrap_or(settings.rate_limit),
        })
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let options = self.resolve(settings)?;
        let target = options.target.resolve().await?;

        let prober = TcpProber::new(target.ip, options.timeout);
        let orchestrator = Orchestrator::new(prober, options.plan())
            .with_rate_limiter(RateLimiter::new(options.rate_limit));

        if !quiet {
            let timeout = orchestrator.prober().timeout();
            output::print_scan_header(&target, options.range, timeout);
        }

        let cancel = CancellationToken::new();
        let watcher = spawn_interrupt_watcher(cancel.clone());

        let progress: Box<dyn ScanProgress> = if quiet {
            Box::new(output::SilentProgress)
        } else {
            Box::new(output::ProgressReporter::new())
        };

        let result = orchestrator.run(&cancel, progress.as_ref()).await;
        watcher.abort();
        let summary = result?;

        if !summary.cancelled && !quiet {
            output::print_success(&format!(
                "Scan complete: {} ports probed this run.",
                summary.probed
            ));
        }
        output::print_info(&progress_saved_message(summary.store.len()));

        if !quiet && !self.no_report {
            output::print_report(&summary.store, &summary.results_path)
                .map_err(|e| CliError::Other(format!("failed to print report: {}", e)))?;
            output::print_tally(&summary.store);
        }

        Ok(())
    }
}

/// Printed after every run, finished or interrupted.
fn progress_saved_message(scanned: usize) -> String {
    format!(
        "Progress saved. {} ports scanned so far. Resume by running again.",
        scanned
    )
}

/// Cancel `token` on the first Ctrl-C.
fn spawn_interrupt_watcher(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!();
                output::print_warning("Interrupted by user. Saving progress...");
                token.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "unable to listen for Ctrl-C"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_defaults_come_from_settings() {
        let options = ScanCommand::default()
            .resolve(&AppSettings::default())
            .unwrap();

        assert_eq!(options.target, TargetSpec::Hostname("portquiz.net".into()));
        assert_eq!(options.range.len(), 9999);
        assert_eq!(options.timeout, Duration::from_millis(400));
        assert_eq!(options.results_file, PathBuf::from("scan_results.txt"));
        assert_eq!(options.flush_interval.get(), 50);
        assert_eq!(options.cadence, FlushCadence::StoreSize);
        assert_eq!(options.rate_limit, 0);
    }

    #[test]
    fn test_flags_override_settings() {
        let cmd = ScanCommand {
            host: Some("127.0.0.1".into()),
            ports: Some("20-25".into()),
            timeout: Some(50),
            flush_every: Some(2),
            ..Default::default()
        };
        let options = cmd.resolve(&AppSettings::default()).unwrap();

        assert_eq!(
            options.target,
            TargetSpec::Single(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(options.range.to_string(), "20-25");
        assert_eq!(options.plan().flush_interval.get(), 2);
    }

    #[test]
    fn test_rejects_zero_timeout_and_interval() {
        let settings = AppSettings::default();

        let cmd = ScanCommand {
            timeout: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            cmd.resolve(&settings),
            Err(CliError::Config(ConfigError::InvalidValue(_)))
        ));

        let cmd = ScanCommand {
            flush_every: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            cmd.resolve(&settings),
            Err(CliError::Config(ConfigError::InvalidValue(_)))
        ));
    }

    #[test]
    fn test_progress_saved_message() {
        assert_eq!(
            progress_saved_message(42),
            "Progress saved. 42 ports scanned so far. Resume by running again."
        );
    }

    #[test]
    fn test_rejects_bad_range() {
        let cmd = ScanCommand {
            ports: Some("9999-1".into()),
            ..Default::default()
        };
        assert!(matches!(
            cmd.resolve(&AppSettings::default()),
            Err(CliError::Port(_))
        ));
    }
}
