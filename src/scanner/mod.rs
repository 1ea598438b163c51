//! Scanner module - the resumable scan engine.
//!
//! - [`classifier`] turns raw connect failures into classifications
//! - [`probe`] performs one bounded-timeout TCP connect per port
//! - [`orchestrator`] walks the pending ports and keeps the result file current
//! - [`rate_limiter`] optionally paces probes

pub mod classifier;
pub mod orchestrator;
pub mod probe;
pub mod rate_limiter;

pub use classifier::{classify, FailureCategory, ProbeFailure, ProbeOutcome};
pub use orchestrator::{
    pending_ports, FlushCadence, Orchestrator, ScanPlan, ScanProgress, ScanSummary,
    DEFAULT_FLUSH_INTERVAL,
};
pub use probe::{Prober, TcpProber};
pub use rate_limiter::RateLimiter;
