//! Per-file retrieval
//!
//! Downloads every registered resource, one at a time, and writes each body to
//! `<title>.<extension>` in the output directory. A failing item is reported
//! and skipped; it never stops the batch.

use crate::config::OutputConfig;
use crate::harvest::fetcher::{fetch_resource, probe_content_length};
use crate::harvest::registry::LinkRegistry;
use crate::harvest::StopSignal;
use crate::output::{ProgressEvent, ProgressSink, RetrievalOutcome, RetrievalReport};
use crate::ItemError;
use reqwest::Client;
use std::path::{Path, PathBuf};

/// Builds the file name for a title
///
/// Path separators inside the title are replaced with `_` so the file always
/// lands directly in the output directory.
///
/// # Examples
///
/// ```
/// use track_harvest::harvest::file_name_for;
///
/// assert_eq!(file_name_for("Faith_and_Works", "mp3"), "Faith_and_Works.mp3");
/// assert_eq!(file_name_for("AC/DC", "mp3"), "AC_DC.mp3");
/// ```
pub fn file_name_for(title: &str, extension: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}.{}", stem, extension)
}

/// Downloads every resource in a registry to disk
#[derive(Debug, Clone)]
pub struct Retriever {
    client: Client,
    directory: PathBuf,
    extension: String,
    probe_first: bool,
    stop: StopSignal,
}

impl Retriever {
    /// Creates a retriever writing into the configured output directory
    pub fn new(client: Client, output: &OutputConfig) -> Self {
        Self {
            client,
            directory: output.directory.clone(),
            extension: output.file_extension.clone(),
            probe_first: output.probe_before_download,
            stop: StopSignal::new(),
        }
    }

    /// Uses a shared stop signal, checked before each item
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Returns the directory files are written into
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Retrieves every entry in registry order
    ///
    /// Existing files with the same name are overwritten.
    ///
    /// # Arguments
    ///
    /// * `registry` - The registry to download
    /// * `sink` - Receiver of per-item status events
    ///
    /// # Returns
    ///
    /// A report with one outcome per attempted item
    pub async fn run(&self, registry: &LinkRegistry, sink: &mut dyn ProgressSink) -> RetrievalReport {
        let mut report = RetrievalReport::new();

        for (position, (title, url)) in registry.iter().enumerate() {
            if self.stop.is_stopped() {
                tracing::info!("Retrieval stopped after {} item(s)", position);
                sink.observe(ProgressEvent::Stopped {
                    completed: position,
                    remaining: registry.len() - position,
                });
                report.stopped = true;
                break;
            }

            let outcome = self.retrieve_one(title, url, sink).await;
            report.outcomes.push((title.to_string(), outcome));
        }

        tracing::info!(
            "Retrieval finished: {} saved, {} failed",
            report.saved_count(),
            report.failed_count()
        );
        report
    }

    async fn retrieve_one(
        &self,
        title: &str,
        url: &str,
        sink: &mut dyn ProgressSink,
    ) -> RetrievalOutcome {
        if self.probe_first {
            match probe_content_length(&self.client, url).await {
                Ok(bytes) => sink.observe(ProgressEvent::SizeKnown {
                    title: title.to_string(),
                    bytes,
                }),
                Err(e) => sink.observe(ProgressEvent::SizeUnknown {
                    title: title.to_string(),
                    url: url.to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        let path = self.directory.join(file_name_for(title, &self.extension));

        match self.download_to(url, &path).await {
            Ok(bytes) => {
                tracing::debug!("Saved {} ({} bytes)", path.display(), bytes);
                sink.observe(ProgressEvent::Saved {
                    title: title.to_string(),
                    path: path.clone(),
                    bytes,
                });
                RetrievalOutcome::Saved { path, bytes }
            }
            Err(error) => {
                tracing::warn!("Download failed for {}: {}", url, error);
                sink.observe(ProgressEvent::DownloadFailed {
                    title: title.to_string(),
                    url: url.to_string(),
                    reason: error.to_string(),
                });
                RetrievalOutcome::Failed {
                    url: url.to_string(),
                    error,
                }
            }
        }
    }

    /// Downloads the whole body, then writes it via a sibling temp file
    ///
    /// The final path only ever holds a complete body: nothing is created before
    /// the download succeeds and a failed write removes its temp file.
    async fn download_to(&self, url: &str, path: &Path) -> Result<u64, ItemError> {
        let body = fetch_resource(&self.client, url).await?;

        let mut partial = path.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        if let Err(e) = write_then_rename(&partial, path, &body).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        Ok(body.len() as u64)
    }
}

async fn write_then_rename(partial: &Path, path: &Path, body: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(partial, body).await?;
    tokio::fs::rename(partial, path).await
}
