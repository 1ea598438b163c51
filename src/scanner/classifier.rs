//! Outcome classification.
//!
//! A failed connect is first described as a [`ProbeFailure`] (category,
//! optional OS code, message), normalized into a [`ProbeOutcome`], and then
//! mapped onto a [`Classification`] by [`classify`].
//!
//! Timeouts and unreachable networks both map to `BLOCKED` (a filter dropping
//! packets). Explicit refusals map to `REFUSED`. Everything else is kept as
//! `ERROR-*` with its code or message.

use crate::types::Classification;
use std::io;

/// OS codes meaning "connection refused" (Linux, BSD/macOS, Windows).
pub const REFUSED_CODES: &[i32] = &[111, 61, 10061];

/// OS codes meaning "network unreachable" or "no route to host"
/// (Linux, BSD/macOS, Windows).
pub const UNREACHABLE_CODES: &[i32] = &[101, 113, 51, 65, 10051, 10065];

/// Broad category of a failed connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCategory {
    /// The remote host actively refused the connection.
    ConnectionRefused,
    /// The attempt ran out of time.
    TimedOut,
    /// Anything else, named by its failure type.
    Other(String),
}

/// Raw description of a failed connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub category: FailureCategory,
    pub code: Option<i32>,
    pub message: String,
}

impl ProbeFailure {
    /// Create a failure description.
    pub fn new(category: FailureCategory, code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    /// A connect that did not complete within the probe timeout.
    pub fn timeout() -> Self {
        Self::new(FailureCategory::TimedOut, None, "timed out")
    }

    /// Describe an I/O error returned by a connect call.
    pub fn from_io_error(err: &io::Error) -> Self {
        let category = match err.kind() {
            io::ErrorKind::ConnectionRefused => FailureCategory::ConnectionRefused,
            io::ErrorKind::TimedOut => FailureCategory::TimedOut,
            kind => FailureCategory::Other(format!("{:?}", kind)),
        };
        Self::new(category, err.raw_os_error(), err.to_string())
    }
}

/// Normalized outcome of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The connection was established.
    Connected,
    /// Active rejection by the remote side.
    Refused { code: Option<i32> },
    /// Network or host unreachable.
    Unreachable { code: i32 },
    /// No answer within the timeout.
    TimedOut,
    /// An OS failure code without a dedicated rule.
    OsFailure { code: i32, message: String },
    /// A failure carrying no OS code at all.
    Unknown { kind: String, message: String },
}

impl ProbeOutcome {
    /// Normalize a raw failure. Rules are applied in priority order.
    pub fn from_failure(failure: &ProbeFailure) -> Self {
        let ProbeFailure {
            category,
            code,
            message,
        } = failure;

        if *category == FailureCategory::ConnectionRefused {
            return Self::Refused { code: *code };
        }

        match code {
            Some(c) if REFUSED_CODES.contains(c) => return Self::Refused { code: Some(*c) },
            Some(c) if UNREACHABLE_CODES.contains(c) => return Self::Unreachable { code: *c },
            _ => {}
        }

        if message.contains("timed out") || *category == FailureCategory::TimedOut {
            return Self::TimedOut;
        }

        match code {
            Some(code) => Self::OsFailure {
                code: *code,
                message: message.clone(),
            },
            None => Self::Unknown {
                kind: match category {
                    FailureCategory::Other(kind) => kind.clone(),
                    // Both handled above; listed for exhaustiveness.
                    FailureCategory::ConnectionRefused => "ConnectionRefused".to_string(),
                    FailureCategory::TimedOut => "TimedOut".to_string(),
                },
                message: message.clone(),
            },
        }
    }

    /// Normalize an I/O error from a connect call.
    pub fn from_io_error(err: &io::Error) -> Self {
        Self::from_failure(&ProbeFailure::from_io_error(err))
    }
}

/// Map a probe outcome onto its classification.
pub fn classify(outcome: &ProbeOutcome) -> Classification {
    match outcome {
        ProbeOutcome::Connected => Classification::Open,
        ProbeOutcome::Refused { .. } => Classification::Refused,
        ProbeOutcome::Unreachable { .. } | ProbeOutcome::TimedOut => Classification::Blocked,
        ProbeOutcome::OsFailure { code, .. } => Classification::ErrorCode(*code),
        ProbeOutcome::Unknown { kind, message } => Classification::error(kind, message),
    }
}
