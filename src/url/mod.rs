//! URL handling module for Track-Harvest
//!
//! Track links on a harvested page are either absolute or relative to the
//! page's own directory. This module turns every href into an absolute
//! resource URL using the plain directory-prefix rule.

mod resolve;

pub use resolve::{has_scheme, page_directory, resolve_resource_url};
