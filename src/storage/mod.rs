//! Scan result persistence.
//!
//! Provides the text-file backed store that makes scans resumable.

mod result_store;

pub use result_store::{format_record, parse_record, ResultStore};
