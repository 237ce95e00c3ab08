//! Retrieval outcomes and the end-of-run download summary

use crate::ItemError;
use std::path::PathBuf;

/// Result of one retrieval attempt
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// The body was written to `path`
    Saved { path: PathBuf, bytes: u64 },

    /// The download or the write failed; no file was left behind
    Failed { url: String, error: ItemError },
}

impl RetrievalOutcome {
    /// Returns true if the file was written
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Per-title outcomes of one retrieval run
#[derive(Debug, Default)]
pub struct RetrievalReport {
    /// `(title, outcome)` pairs in registry order
    pub outcomes: Vec<(String, RetrievalOutcome)>,

    /// True if the run stopped before reaching the end of the registry
    pub stopped: bool,
}

impl RetrievalReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files written
    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_saved()).count()
    }

    /// Number of failed items
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.saved_count()
    }

    /// Total bytes written across all saved files
    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                RetrievalOutcome::Saved { bytes, .. } => *bytes,
                RetrievalOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// Iterates the failed items as `(title, url, error)`
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str, &ItemError)> {
        self.outcomes.iter().filter_map(|(title, outcome)| match outcome {
            RetrievalOutcome::Failed { url, error } => Some((title.as_str(), url.as_str(), error)),
            RetrievalOutcome::Saved { .. } => None,
        })
    }
}

/// Prints the download summary to stdout
///
/// # Arguments
///
/// * `report` - The report returned by a retrieval run
pub fn print_report(report: &RetrievalReport) {
    println!("\n=== Download Summary ===\n");

    println!("  Files saved: {}", report.saved_count());
    println!("  Failures: {}", report.failed_count());
    println!(
        "  Bytes written: {} ({:.2} MiB)",
        report.bytes_written(),
        crate::output::events::bytes_to_mib(report.bytes_written())
    );

    if report.failed_count() > 0 {
        println!("\nFailed downloads:");
        for (title, url, error) in report.failures() {
            println!("  - {} ({}): {}", title, url, error);
        }
    }

    if report.stopped {
        println!("\nRun stopped early; remaining items were not attempted.");
    }
}
