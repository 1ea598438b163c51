//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod classification;
mod port;
mod target;

pub use classification::{Classification, ClassificationParseError, UNKNOWN_KIND};
pub use port::{Port, PortError, PortRange};
pub use target::{ScanTarget, TargetError, TargetSpec};
