//! Progress and status events emitted by the probe and retrieval loops

use std::fmt;
use std::path::PathBuf;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Converts a byte count to gibibytes
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

/// Converts a byte count to mebibytes
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}

/// One observation on the status channel
///
/// The `Display` form of each event is the human-readable status line shown to
/// the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A size probe finished (successfully or not); carries the running total
    ProbeProgress {
        /// 1-based position in the registry
        index: usize,
        /// Bytes accumulated so far
        total_bytes: u64,
    },

    /// A size probe failed; the item contributes nothing to the total
    ProbeFailed {
        index: usize,
        title: String,
        url: String,
        reason: String,
    },

    /// A size probe succeeded but the response carried no length
    MissingLength {
        index: usize,
        title: String,
        url: String,
    },

    /// A resource's size was learned before downloading it
    SizeKnown { title: String, bytes: u64 },

    /// A resource's size could not be learned; the download still proceeds
    SizeUnknown {
        title: String,
        url: String,
        reason: String,
    },

    /// A resource was downloaded and written to disk
    Saved {
        title: String,
        path: PathBuf,
        bytes: u64,
    },

    /// A resource could not be downloaded or written
    DownloadFailed {
        title: String,
        url: String,
        reason: String,
    },

    /// A loop honored a stop request before finishing the registry
    Stopped { completed: usize, remaining: usize },
}

impl ProgressEvent {
    /// Returns true for events that report a failed item
    ///
    /// A size lookup ahead of a download is informational, so `SizeUnknown`
    /// is not a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ProbeFailed { .. } | Self::DownloadFailed { .. })
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbeProgress { index, total_bytes } => write!(
                f,
                "Iteration {}: Total size so far: {:.6} GiB",
                index,
                bytes_to_gib(*total_bytes)
            ),
            Self::ProbeFailed { url, reason, .. } => {
                write!(f, "Failed to retrieve HEAD info for {}: {}", url, reason)
            }
            Self::MissingLength { url, .. } => {
                write!(f, "No Content-Length for {}; counted as 0 bytes", url)
            }
            Self::SizeKnown { title, bytes } => write!(
                f,
                "Downloading '{}' - File size: {:.2} MiB",
                title,
                bytes_to_mib(*bytes)
            ),
            Self::SizeUnknown { url, reason, .. } => {
                write!(f, "Failed to retrieve file size for {}: {}", url, reason)
            }
            Self::Saved { path, .. } => write!(f, "Downloaded: {}", path.display()),
            Self::DownloadFailed { url, reason, .. } => {
                write!(f, "Failed to download {}: {}", url, reason)
            }
            Self::Stopped {
                completed,
                remaining,
            } => write!(
                f,
                "Stopped after {} item(s); {} not attempted",
                completed, remaining
            ),
        }
    }
}
