//! Aggregate size probing
//!
//! Totals the size of every registered resource with HEAD requests, so no
//! audio body is transferred.

use crate::harvest::fetcher::probe_content_length;
use crate::harvest::registry::LinkRegistry;
use crate::harvest::StopSignal;
use crate::output::{bytes_to_gib, ProgressEvent, ProgressSink};
use crate::ItemError;
use reqwest::Client;

/// Sums the Content-Length of every resource in a registry
#[derive(Debug, Clone)]
pub struct SizeProbe {
    client: Client,
    stop: StopSignal,
}

impl SizeProbe {
    /// Creates a probe using the given client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            stop: StopSignal::new(),
        }
    }

    /// Uses a shared stop signal, checked before each item
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Probes every entry in registry order and returns the total in GiB
    ///
    /// A failed or length-less probe contributes zero bytes and is reported on
    /// the sink; it never aborts the scan. After every probe a
    /// [`ProgressEvent::ProbeProgress`] with the running total is emitted.
    /// An empty registry makes no requests and yields `0.0`.
    ///
    /// # Arguments
    ///
    /// * `registry` - The registry to probe
    /// * `sink` - Receiver of progress and failure events
    pub async fn run(&self, registry: &LinkRegistry, sink: &mut dyn ProgressSink) -> f64 {
        let total_bytes = self.run_bytes(registry, sink).await;
        bytes_to_gib(total_bytes)
    }

    /// Same as [`SizeProbe::run`], returning the total in bytes
    pub async fn run_bytes(&self, registry: &LinkRegistry, sink: &mut dyn ProgressSink) -> u64 {
        let mut total_bytes: u64 = 0;

        for (position, (title, url)) in registry.iter().enumerate() {
            if self.stop.is_stopped() {
                tracing::info!("Size probe stopped after {} item(s)", position);
                sink.observe(ProgressEvent::Stopped {
                    completed: position,
                    remaining: registry.len() - position,
                });
                break;
            }

            let index = position + 1;

            match probe_content_length(&self.client, url).await {
                Ok(bytes) => {
                    tracing::debug!("{} -> {} bytes", url, bytes);
                    total_bytes = total_bytes.saturating_add(bytes);
                }
                Err(ItemError::MissingLength) => {
                    tracing::warn!("No Content-Length for {}", url);
                    sink.observe(ProgressEvent::MissingLength {
                        index,
                        title: title.to_string(),
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Size probe failed for {}: {}", url, e);
                    sink.observe(ProgressEvent::ProbeFailed {
                        index,
                        title: title.to_string(),
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }

            sink.observe(ProgressEvent::ProbeProgress { index, total_bytes });
        }

        tracing::info!(
            "Probed {} resource(s): {:.6} GiB",
            registry.len(),
            bytes_to_gib(total_bytes)
        );
        total_bytes
    }
}
