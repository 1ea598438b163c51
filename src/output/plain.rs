//! Plain text output formatting.
//!
//! Status lines go to stderr with colors; the record listing goes to stdout
//! in the same format as the result file so it can be piped or diffed.

use crate::storage::{format_record, ResultStore};
use crate::types::{PortRange, ScanTarget};
use console::style;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Print the banner shown before probing starts.
pub fn print_scan_header(target: &ScanTarget, range: PortRange, timeout: Duration) {
    eprintln!(
        "{} {} ports {} (timeout {}ms)",
        style("Scanning").cyan().bold(),
        target,
        range,
        timeout.as_millis()
    );
}

/// Print every record in ascending port order, then the result file path.
pub fn print_report(store: &ResultStore, path: &Path) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, store, path)
}

/// Write the report to any sink.
pub fn write_report(out: &mut impl Write, store: &ResultStore, path: &Path) -> io::Result<()> {
    for (port, classification) in store.iter() {
        writeln!(out, "{}", format_record(port, classification))?;
    }
    writeln!(out)?;
    writeln!(out, "Results saved to {}", path.display())?;
    Ok(())
}

/// Print per-family counts for a store.
pub fn print_tally(store: &ResultStore) {
    let tally = store.tally();
    let count = |family: &str| tally.get(family).copied().unwrap_or(0);

    eprintln!(
        "  {} {} open, {} refused, {} blocked, {} error ({} total)",
        style("Summary:").bold(),
        style(count("OPEN")).green().bold(),
        style(count("REFUSED")).red(),
        style(count("BLOCKED")).yellow(),
        style(count("ERROR")).magenta(),
        store.len()
    );
}

/// Print an informational message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("[*]").cyan(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    eprintln!("{} {}", style("[+]").green(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("[!]").yellow(), msg);
}
