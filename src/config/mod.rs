//! Configuration management for portledger.
//!
//! Provides XDG-compliant settings storage with built-in scan defaults.

mod settings;

pub use settings::{AppSettings, Paths};
