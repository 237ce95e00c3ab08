//! Title/link extraction
//!
//! Track pages mark each track's display name with a fixed class and follow it,
//! somewhere later in the document, with an anchor to the audio file. The
//! extractor flattens the parsed document into the landmarks it cares about, in
//! document order, and pairs every title with the nearest anchor after it.

use crate::config::ExtractionConfig;
use crate::harvest::fetcher::FetchedPage;
use crate::harvest::registry::LinkRegistry;
use crate::url::resolve_resource_url;
use crate::UrlError;
use scraper::{ElementRef, Html};

/// A node of interest, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
enum Landmark<'a> {
    /// A title marker with its sanitized text
    Title(String),
    /// An anchor whose href carries the track link suffix
    Anchor(&'a str),
}

/// Builds a [`LinkRegistry`] from a parsed track page
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    title_class: String,
    link_suffix: String,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl LinkExtractor {
    /// Creates an extractor for the configured marker class and link suffix
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            title_class: config.title_class.clone(),
            link_suffix: config.link_suffix.clone(),
        }
    }

    /// Extracts the registry from a fetched page
    pub fn extract_page(&self, page: &FetchedPage) -> Result<LinkRegistry, UrlError> {
        self.extract(&page.document, &page.url)
    }

    /// Pairs every title marker with the nearest following track link
    ///
    /// # Matching Rules
    ///
    /// - A title is paired with the first matching anchor after it in document
    ///   order, wherever that anchor sits in the tree.
    /// - A title with no matching anchor anywhere after it is skipped.
    /// - When a title has no link of its own, it takes the link of a later
    ///   track; this is logged as a warning because the pairing is probably
    ///   wrong.
    /// - Titles that sanitize to the same token collapse to one entry holding
    ///   the later title's URL.
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed page
    /// * `page_url` - The page's own URL, for resolving relative links
    ///
    /// # Returns
    ///
    /// * `Ok(LinkRegistry)` - The title -> absolute URL registry
    /// * `Err(UrlError)` - A relative link could not be resolved against the page URL
    pub fn extract(&self, document: &Html, page_url: &str) -> Result<LinkRegistry, UrlError> {
        let mut registry = LinkRegistry::new();
        let mut pending: Vec<String> = Vec::new();

        for landmark in self.landmarks(document) {
            match landmark {
                Landmark::Title(title) => pending.push(title),
                Landmark::Anchor(href) => {
                    if pending.is_empty() {
                        continue;
                    }

                    let url = resolve_resource_url(page_url, href)?;

                    // Every pending title except the last has a later title
                    // marker between it and this anchor.
                    if let Some((owner, borrowers)) = pending.split_last() {
                        for borrower in borrowers {
                            tracing::warn!(
                                "Title '{}' has no link of its own; using the link after '{}' ({})",
                                borrower,
                                owner,
                                url
                            );
                        }
                    }

                    for title in pending.drain(..) {
                        if let Some(previous) = registry.insert(title.clone(), url.clone()) {
                            tracing::debug!(
                                "Duplicate title '{}': {} replaced by {}",
                                title,
                                previous,
                                url
                            );
                        }
                    }
                }
            }
        }

        for title in &pending {
            tracing::debug!("Title '{}' has no following track link; skipped", title);
        }

        tracing::info!("Extracted {} track link(s) from {}", registry.len(), page_url);
        Ok(registry)
    }

    /// Flattens the document into title markers and track anchors, in document order
    fn landmarks<'a>(&self, document: &'a Html) -> Vec<Landmark<'a>> {
        let mut landmarks = Vec::new();

        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            let value = element.value();

            // An element that is both anchor and title marker contributes its
            // link before its title: the link belongs to whatever came earlier.
            if value.name() == "a" {
                if let Some(href) = value.attr("href") {
                    if href.ends_with(self.link_suffix.as_str()) {
                        landmarks.push(Landmark::Anchor(href));
                    }
                }
            }

            if value.classes().any(|class| class == self.title_class) {
                landmarks.push(Landmark::Title(sanitize_title(element)));
            }
        }

        landmarks
    }
}

/// Derives the registry key from a title element's visible text
///
/// The text is trimmed and every whitespace run becomes a single underscore.
fn sanitize_title(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    collapse_whitespace(&text)
}

/// Joins whitespace-separated words with underscores
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("_")
}
