//! Port probing.
//!
//! Defines the [`Prober`] trait and [`TcpProber`], which performs a single
//! TCP connect per port using the operating system's socket API. No elevated
//! privileges are required.

use crate::scanner::classifier::{ProbeFailure, ProbeOutcome};
use crate::types::Port;
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Something that can probe one port and report what happened.
///
/// Implementations never fail: every error path is folded into a
/// [`ProbeOutcome`].
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single port.
    async fn probe(&self, port: Port) -> ProbeOutcome;

    /// Get the target IP address.
    fn target(&self) -> IpAddr;

    /// Get the per-attempt timeout.
    fn timeout(&self) -> Duration;
}

/// TCP connect prober.
///
/// The connect future is wrapped in a timer; when the timer fires the
/// future is dropped, which closes the half-open socket.
pub struct TcpProber {
    target: IpAddr,
    timeout: Duration,
}

impl TcpProber {
    /// Create a new TCP prober.
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    async fn attempt_connect(&self, addr: SocketAddr) -> Result<TcpStream, ProbeFailure> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ProbeFailure::from_io_error(&e)),
            Err(_) => Err(ProbeFailure::timeout()),
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::new(self.target, port.as_u16());

        let failure = match self.attempt_connect(addr).await {
            Ok(stream) => {
                drop(stream);
                return ProbeOutcome::Connected;
            }
            Err(failure) => failure,
        };

        let outcome = ProbeOutcome::from_failure(&failure);
        match &outcome {
            ProbeOutcome::Refused { .. }
            | ProbeOutcome::Unreachable { .. }
            | ProbeOutcome::TimedOut => {
                tracing::debug!(
                    port = port.as_u16(),
                    code = ?failure.code,
                    category = ?failure.category,
                    message = %failure.message,
                    "probe failed"
                );
            }
            _ => {
                tracing::warn!(
                    port = port.as_u16(),
                    code = ?failure.code,
                    category = ?failure.category,
                    message = %failure.message,
                    "probe failed with unclassified error"
                );
            }
        }
        outcome
    }

    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
