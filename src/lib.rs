//! # portledger - A Resumable Port Scanner
//!
//! portledger probes a range of TCP ports on one host, classifies every port,
//! and keeps its progress in a plain text file so an interrupted scan resumes
//! exactly where it stopped.
//!
//! ## Classifications
//!
//! - `OPEN` - the connection was accepted
//! - `REFUSED` - the host actively rejected it
//! - `BLOCKED` - the attempt timed out or the network was unreachable,
//!   the usual sign of a filtering firewall
//! - `ERROR-<code>` / `ERROR-<kind>:<message>` - anything else, kept verbatim
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portledger::output::SilentProgress;
//! use portledger::scanner::{Orchestrator, ScanPlan, TcpProber};
//! use std::net::IpAddr;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target: IpAddr = "127.0.0.1".parse()?;
//!     let prober = TcpProber::new(target, Duration::from_millis(400));
//!     let plan = ScanPlan::new("1-1024".parse()?, "scan_results.txt");
//!
//!     let summary = Orchestrator::new(prober, plan)
//!         .run(&CancellationToken::new(), &SilentProgress)
//!         .await?;
//!
//!     println!("{} ports recorded", summary.store.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, ranges, targets and classifications
//! - [`scanner`] - Classifier, prober and the resumable orchestrator
//! - [`storage`] - The durable result file
//! - [`config`] - Settings file and defaults
//! - [`output`] - Console output and progress reporting
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, StoreError};
pub use scanner::{classify, Orchestrator, ProbeOutcome, Prober, ScanPlan, ScanSummary};
pub use storage::ResultStore;
pub use types::{Classification, Port, PortRange};
