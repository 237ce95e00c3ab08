//! The title -> resource URL registry built from one page

use indexmap::IndexMap;

/// Mapping from sanitized track title to absolute resource URL
///
/// Entries keep the document order of their title markers. Inserting a title
/// that is already present replaces its URL in place (last wins), so two titles
/// that sanitize to the same token collapse to one entry.
///
/// A registry is built once per page fetch and is read-only afterwards; the
/// probe and retrieval loops only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRegistry {
    entries: IndexMap<String, String>,
}

impl LinkRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a title's URL, returning the replaced URL if any
    pub(crate) fn insert(&mut self, title: String, url: String) -> Option<String> {
        self.entries.insert(title, url)
    }

    /// Looks up the URL registered for a title
    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries.get(title).map(String::as_str)
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no title was matched to a link
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(title, url)` pairs in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(title, url)| (title.as_str(), url.as_str()))
    }

    /// Iterates titles in registry order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for LinkRegistry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (title, url) in iter {
            registry.insert(title, url);
        }
        registry
    }
}
