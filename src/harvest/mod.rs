//! Harvest module: the extraction and retrieval engine
//!
//! This module contains the core logic, including:
//! - Fetching and parsing the target page
//! - Pairing track titles with their audio links
//! - Totalling resource sizes with HEAD probes
//! - Downloading each resource with per-item failure isolation
//!
//! Every loop processes the registry strictly in order, one request at a time.

mod extractor;
mod fetcher;
mod probe;
mod registry;
mod retriever;

pub use extractor::{collapse_whitespace, LinkExtractor};
pub use fetcher::{
    build_http_client, fetch_page, fetch_resource, probe_content_length, FetchedPage,
};
pub use probe::SizeProbe;
pub use registry::LinkRegistry;
pub use retriever::{file_name_for, Retriever};

use crate::config::Config;
use crate::output::{ProgressSink, RetrievalReport};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop request shared between a caller and the running loops
///
/// Loops check the signal before starting each item. A stop never interrupts
/// the request already in flight.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a signal that has not been raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every loop sharing this signal to stop after its current item
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Returns true once a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// One harvesting session: a configured client plus the core operations
///
/// The session holds no registry. Each [`Harvester::fetch_registry`] call
/// returns a fresh one owned by the caller, which then lends it to the probe
/// and retrieval loops.
pub struct Harvester {
    config: Config,
    client: Client,
    extractor: LinkExtractor,
    stop: StopSignal,
}

impl Harvester {
    /// Creates a session from a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Session ready to fetch
    /// * `Err(HarvestError::Client)` - The HTTP client could not be built
    pub fn new(config: Config) -> crate::Result<Self> {
        let client = build_http_client(&config.http)?;
        let extractor = LinkExtractor::new(&config.extraction);

        Ok(Self {
            config,
            client,
            extractor,
            stop: StopSignal::new(),
        })
    }

    /// Returns the configuration this session runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a handle that stops this session's loops
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Fetches the page and builds its registry
    ///
    /// Any failure here is fatal to the session: without the page there is
    /// nothing to probe or download.
    ///
    /// # Arguments
    ///
    /// * `page_url` - The page to harvest
    ///
    /// # Returns
    ///
    /// * `Ok(LinkRegistry)` - The title -> URL registry of this page
    /// * `Err(HarvestError)` - The page could not be fetched or its links resolved
    pub async fn fetch_registry(&self, page_url: &str) -> crate::Result<LinkRegistry> {
        tracing::info!("Fetching page {}", page_url);
        let page = fetch_page(&self.client, page_url).await?;
        let registry = self.extractor.extract_page(&page)?;
        Ok(registry)
    }

    /// Totals the size of every registered resource, in GiB
    pub async fn total_size_gib(
        &self,
        registry: &LinkRegistry,
        sink: &mut dyn ProgressSink,
    ) -> f64 {
        SizeProbe::new(self.client.clone())
            .with_stop(self.stop.clone())
            .run(registry, sink)
            .await
    }

    /// Downloads every registered resource into the output directory
    pub async fn download_all(
        &self,
        registry: &LinkRegistry,
        sink: &mut dyn ProgressSink,
    ) -> RetrievalReport {
        Retriever::new(self.client.clone(), &self.config.output)
            .with_stop(self.stop.clone())
            .run(registry, sink)
            .await
    }
}
