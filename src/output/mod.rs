//! Output module: the status channel between the core loops and the caller
//!
//! This module handles:
//! - Progress events emitted by the probe and retrieval loops
//! - Sinks that route those events (stdout, memory, channels)
//! - Retrieval outcomes and the printed summaries

pub mod events;
pub mod stats;
mod traits;

pub use events::{bytes_to_gib, bytes_to_mib, ProgressEvent};
pub use stats::{print_report, RetrievalOutcome, RetrievalReport};
pub use traits::{ConsoleSink, NullSink, ProgressSink};

use crate::harvest::LinkRegistry;

/// Prints the registry as a numbered title -> URL listing
///
/// # Arguments
///
/// * `registry` - The registry extracted from the page
pub fn print_registry(registry: &LinkRegistry) {
    println!("=== Track Links ({}) ===\n", registry.len());

    for (index, (title, url)) in registry.iter().enumerate() {
        println!("{:>4}. {}", index + 1, title);
        println!("      {}", url);
    }

    if registry.is_empty() {
        println!("No track links found on the page.");
    }
}
