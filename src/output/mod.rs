//! Output formatting module.
//!
//! Console status lines, the final record listing, and the progress bar.

mod plain;
mod progress;

pub use plain::{
    print_info, print_report, print_scan_header, print_success, print_tally, print_warning,
    write_report,
};
pub use progress::{ProgressReporter, SilentProgress};
