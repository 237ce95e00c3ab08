//! HTTP fetcher implementation
//!
//! This module handles every outbound request the harvester makes:
//! - Building the HTTP client with the fixed browser user agent
//! - GET of the target page, parsed into a document
//! - HEAD probes that read a resource's Content-Length
//! - GET of a resource's full body
//!
//! Each request is attempted exactly once.

use crate::config::HttpConfig;
use crate::{HarvestError, ItemError};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Response};
use scraper::Html;
use std::time::Duration;

/// A fetched and parsed target page
pub struct FetchedPage {
    /// The URL the page was requested from
    pub url: String,

    /// The parsed document
    pub document: Html,
}

/// Builds an HTTP client with proper configuration
///
/// The client sends only the configured User-Agent: no compression
/// negotiation, no cookies and no authentication.
///
/// # Example
///
/// ```no_run
/// use track_harvest::config::HttpConfig;
/// use track_harvest::harvest::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()
}

/// Fetches the target page and parses it
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `page_url` - The page to fetch
///
/// # Returns
///
/// * `Ok(FetchedPage)` - The page answered with a success status
/// * `Err(HarvestError::Fetch)` - The page answered with any other status
/// * `Err(HarvestError::Network)` - The request failed at the transport level
pub async fn fetch_page(client: &Client, page_url: &str) -> Result<FetchedPage, HarvestError> {
    tracing::debug!("GET {}", page_url);

    let network = |source: reqwest::Error| HarvestError::Network {
        url: page_url.to_string(),
        source,
    };

    let response = client.get(page_url).send().await.map_err(network)?;
    let status = response.status();

    if !status.is_success() {
        return Err(HarvestError::Fetch {
            url: page_url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(network)?;
    tracing::debug!("Fetched {} ({} bytes)", page_url, body.len());

    Ok(FetchedPage {
        url: page_url.to_string(),
        document: Html::parse_document(&body),
    })
}

/// Sends a HEAD request and reads the resource's byte length
///
/// # Returns
///
/// * `Ok(u64)` - Value of the Content-Length header
/// * `Err(ItemError::MissingLength)` - Success status without a usable length
/// * `Err(ItemError::Status)` - Non-success status
/// * `Err(ItemError::Network)` - Transport-level failure
pub async fn probe_content_length(client: &Client, url: &str) -> Result<u64, ItemError> {
    tracing::debug!("HEAD {}", url);

    let response = client.head(url).send().await?;
    let response = require_success(response)?;

    // HEAD responses carry no body, so the length must come from the header
    // rather than the body size hint.
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or(ItemError::MissingLength)
}

/// Fetches a resource's complete body into memory
pub async fn fetch_resource(client: &Client, url: &str) -> Result<Vec<u8>, ItemError> {
    tracing::debug!("GET {}", url);

    let response = client.get(url).send().await?;
    let response = require_success(response)?;
    let body = response.bytes().await?;

    Ok(body.into())
}

fn require_success(response: Response) -> Result<Response, ItemError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ItemError::Status(status.as_u16()))
    }
}
