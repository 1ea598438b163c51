//! Resumable scan orchestration.
//!
//! The orchestrator hydrates the [`ResultStore`] from disk, works out which
//! ports of the configured range still lack a classification, and probes them
//! one at a time in ascending order. Progress is flushed to disk on a fixed
//! cadence and once more when the loop ends, whether it ran out of ports or
//! was cancelled.

use crate::error::StoreResult;
use crate::scanner::classifier::{classify, ProbeOutcome};
use crate::scanner::probe::Prober;
use crate::scanner::rate_limiter::RateLimiter;
use crate::storage::ResultStore;
use crate::types::{Classification, Port, PortRange};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

/// Default number of records between intermediate flushes.
pub const DEFAULT_FLUSH_INTERVAL: usize = 50;

/// Which counter triggers an intermediate flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FlushCadence {
    /// Flush whenever the total number of stored records is a multiple of
    /// the interval, counting records carried over from earlier runs.
    #[default]
    StoreSize,
    /// Flush whenever the number of records added in this run is a multiple
    /// of the interval.
    NewRecords,
}

impl fmt::Display for FlushCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreSize => write!(f, "store-size"),
            Self::NewRecords => write!(f, "new-records"),
        }
    }
}

impl FromStr for FlushCadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "store-size" | "store_size" => Ok(Self::StoreSize),
            "new-records" | "new_records" => Ok(Self::NewRecords),
            _ => Err(format!("unknown flush cadence: {}", s)),
        }
    }
}

/// Everything the orchestrator needs to know about one scan.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    /// Ports to cover.
    pub range: PortRange,
    /// Durable result file.
    pub results_path: PathBuf,
    /// Records between intermediate flushes.
    pub flush_interval: NonZeroUsize,
    /// Counter the interval applies to.
    pub cadence: FlushCadence,
}

impl ScanPlan {
    /// Create a plan with the default flush settings.
    pub fn new(range: PortRange, results_path: impl Into<PathBuf>) -> Self {
        Self {
            range,
            results_path: results_path.into(),
            flush_interval: NonZeroUsize::new(DEFAULT_FLUSH_INTERVAL)
                .unwrap_or(NonZeroUsize::MIN),
            cadence: FlushCadence::default(),
        }
    }

    /// Set the flush interval.
    pub fn with_flush_interval(mut self, interval: NonZeroUsize) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the flush cadence.
    pub fn with_cadence(mut self, cadence: FlushCadence) -> Self {
        self.cadence = cadence;
        self
    }

    fn should_flush(&self, store_len: usize, probed: usize) -> bool {
        let counter = match self.cadence {
            FlushCadence::StoreSize => store_len,
            FlushCadence::NewRecords => probed,
        };
        counter % self.flush_interval.get() == 0
    }
}

/// Observer of scan progress. Purely informational.
pub trait ScanProgress: Send + Sync {
    /// Called once before probing with the resume counts.
    fn resumed(&self, previously_scanned: usize, remaining: usize);

    /// Called after each port is classified and recorded.
    fn advance(&self, port: Port, classification: &Classification);

    /// Called once when the probe loop ends.
    fn finish(&self, interrupted: bool);
}

/// What a completed (or cancelled) run produced.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// Final in-memory state, identical to what was last flushed.
    pub store: ResultStore,
    /// In-range records that were already on disk when the run started.
    pub previously_scanned: usize,
    /// Ports probed and recorded during this run.
    pub probed: usize,
    /// Ports still pending when the run ended.
    pub remaining: usize,
    /// Whether the run was stopped by cancellation.
    pub cancelled: bool,
    /// Flushes performed inside the loop, excluding the final one.
    pub intermediate_flushes: usize,
    /// Where the results were written.
    pub results_path: PathBuf,
}

/// Ports of `range` without a stored classification, ascending.
pub fn pending_ports(range: PortRange, store: &ResultStore) -> Vec<Port> {
    range.iter().filter(|port| !store.contains(*port)).collect()
}

/// Drives a [`Prober`] over the pending ports of a [`ScanPlan`].
pub struct Orchestrator<P> {
    prober: P,
    plan: ScanPlan,
    rate_limiter: Option<RateLimiter>,
}

impl<P: Prober> Orchestrator<P> {
    /// Create an orchestrator.
    pub fn new(prober: P, plan: ScanPlan) -> Self {
        Self {
            prober,
            plan,
            rate_limiter: None,
        }
    }

    /// Pace probes through a rate limiter.
    pub fn with_rate_limiter(mut self, limiter: Option<RateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    /// The prober used for every port.
    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// The plan this orchestrator executes.
    pub fn plan(&self) -> &ScanPlan {
        &self.plan
    }

    /// Run the scan until every pending port is recorded or `cancel` fires.
    ///
    /// Returns an error only when the result file cannot be read or written.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        progress: &dyn ScanProgress,
    ) -> StoreResult<ScanSummary> {
        let plan = &self.plan;
        let mut store = ResultStore::load(&plan.results_path)?;
        let pending = pending_ports(plan.range, &store);
        let previously_scanned = store.count_in(plan.range);

        tracing::info!(
            target = %self.prober.target(),
            timeout_ms = self.prober.timeout().as_millis() as u64,
            range = %plan.range,
            previously_scanned,
            pending = pending.len(),
            "starting scan"
        );
        progress.resumed(previously_scanned, pending.len());

        let mut probed = 0usize;
        let mut intermediate_flushes = 0usize;
        let mut cancelled = false;

        for &port in &pending {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                outcome = self.pace_and_probe(port) => outcome,
            };

            let classification = classify(&outcome);
            progress.advance(port, &classification);
            store.insert(port, classification);
            probed += 1;

            if plan.should_flush(store.len(), probed) {
                store.save(&plan.results_path)?;
                intermediate_flushes += 1;
            }
        }

        if cancelled {
            tracing::info!(probed, "scan cancelled, saving progress");
        }
        progress.finish(cancelled);

        store.save(&plan.results_path)?;

        Ok(ScanSummary {
            store,
            previously_scanned,
            probed,
            remaining: pending.len() - probed,
            cancelled,
            intermediate_flushes,
            results_path: plan.results_path.clone(),
        })
    }

    async fn pace_and_probe(&self, port: Port) -> ProbeOutcome {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }
        self.prober.probe(port).await
    }
}
