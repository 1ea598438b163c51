//! The normalized outcome label stored for every probed port.

use std::fmt;
use std::str::FromStr;

/// Kind recorded for an error whose failure type has no usable name.
pub const UNKNOWN_KIND: &str = "Unknown";

/// Classification of a single probe.
///
/// Text forms are `OPEN`, `REFUSED`, `BLOCKED`, `ERROR-<code>` and
/// `ERROR-<kind>:<message>`; [`Display`](fmt::Display) and [`FromStr`] are
/// inverses of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The connection was accepted.
    Open,
    /// The remote host actively rejected the connection.
    Refused,
    /// Packets were silently dropped: timeout or unreachable network.
    Blocked,
    /// An OS-level failure code with no dedicated rule.
    ErrorCode(i32),
    /// A failure without an OS code, kept verbatim for diagnosis.
    Error { kind: String, message: String },
}

impl Classification {
    /// Build an unanticipated-error classification.
    ///
    /// Line breaks are folded into spaces and the text is trimmed so the
    /// value always fits on a single record line. A kind that ends up empty
    /// becomes [`UNKNOWN_KIND`] so the label still parses.
    pub fn error(kind: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        let mut kind = single_line(kind.as_ref()).replace(':', "_");
        if kind.is_empty() {
            kind = UNKNOWN_KIND.to_string();
        }
        Self::Error {
            kind,
            message: single_line(message.as_ref()),
        }
    }

    /// Short family name, used when tallying results.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Refused => "REFUSED",
            Self::Blocked => "BLOCKED",
            Self::ErrorCode(_) | Self::Error { .. } => "ERROR",
        }
    }

    /// Check if the port accepted a connection.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ").trim().to_string()
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Refused => write!(f, "REFUSED"),
            Self::Blocked => write!(f, "BLOCKED"),
            Self::ErrorCode(code) => write!(f, "ERROR-{}", code),
            Self::Error { kind, message } => write!(f, "ERROR-{}:{}", kind, message),
        }
    }
}

/// Error returned when a classification label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized classification: {0:?}")]
pub struct ClassificationParseError(pub String);

impl FromStr for Classification {
    type Err = ClassificationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ClassificationParseError(s.to_string());

        match s {
            "OPEN" => return Ok(Self::Open),
            "REFUSED" => return Ok(Self::Refused),
            "BLOCKED" => return Ok(Self::Blocked),
            _ => {}
        }

        let detail = s.strip_prefix("ERROR-").ok_or_else(invalid)?;
        if let Ok(code) = detail.parse::<i32>() {
            return Ok(Self::ErrorCode(code));
        }

        match detail.split_once(':') {
            Some((kind, message)) if !kind.is_empty() => Ok(Self::Error {
                kind: kind.to_string(),
                message: message.trim().to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}
