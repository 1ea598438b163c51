//! Progress reporting for the probe loop.

use crate::output::plain::print_info;
use crate::scanner::ScanProgress;
use crate::types::{Classification, Port};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA {eta} {msg}";

/// Renders scan progress as an `indicatif` bar on stderr.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a reporter; the bar length is set once resume counts are known.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanProgress for ProgressReporter {
    fn resumed(&self, previously_scanned: usize, remaining: usize) {
        print_info(&format!(
            "Loaded {} results from previous scan. {} ports left to scan.",
            previously_scanned, remaining
        ));
        self.bar.set_length(remaining as u64);
        self.bar.reset_elapsed();
    }

    fn advance(&self, port: Port, classification: &Classification) {
        self.bar.inc(1);
        if classification.is_open() {
            self.bar.set_message(format!("open: {}", port));
        }
    }

    fn finish(&self, interrupted: bool) {
        if interrupted {
            self.bar.abandon_with_message("interrupted");
        } else {
            self.bar.finish_with_message("scan complete");
        }
    }
}

/// Progress observer that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn resumed(&self, previously_scanned: usize, remaining: usize) {
        tracing::debug!(previously_scanned, remaining, "resuming scan");
    }

    fn advance(&self, _port: Port, _classification: &Classification) {}

    fn finish(&self, _interrupted: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_tracks_position() {
        let reporter = ProgressReporter::new();
        reporter.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        reporter.resumed(10, 3);
        reporter.advance(Port::new(11).unwrap(), &Classification::Open);
        reporter.advance(Port::new(12).unwrap(), &Classification::Blocked);

        assert_eq!(reporter.bar.length(), Some(3));
        assert_eq!(reporter.bar.position(), 2);
        assert_eq!(reporter.bar.message(), "open: 11");

        reporter.finish(false);
        assert!(reporter.bar.is_finished());
    }
}
