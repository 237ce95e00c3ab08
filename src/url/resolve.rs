use crate::{UrlError, UrlResult};
use url::Url;

/// Returns the directory portion of a page URL
///
/// The directory portion is everything up to and including the last `/`.
/// Dot segments, query strings and fragments on the page URL are not
/// interpreted.
///
/// # Examples
///
/// ```
/// use track_harvest::url::page_directory;
///
/// let dir = page_directory("http://x.test/site/page.html").unwrap();
/// assert_eq!(dir, "http://x.test/site/");
/// ```
pub fn page_directory(page_url: &str) -> UrlResult<&str> {
    page_url
        .rfind('/')
        .map(|idx| &page_url[..=idx])
        .ok_or_else(|| UrlError::NoDirectory(page_url.to_string()))
}

/// Returns true if the reference is already an absolute http(s) URL
///
/// Other scheme-shaped prefixes (`disc1:track.mp3`) count as relative.
pub fn has_scheme(href: &str) -> bool {
    Url::parse(href)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Resolves a link href to an absolute resource URL
///
/// An href that is already an absolute http(s) URL is returned unchanged. Any other href is
/// appended to the page's directory portion verbatim: `..` segments,
/// root-relative and scheme-relative references are not special-cased.
///
/// # Arguments
///
/// * `page_url` - The URL of the page the href was found on
/// * `href` - The raw href attribute value
///
/// # Returns
///
/// * `Ok(String)` - The absolute resource URL
/// * `Err(UrlError)` - The page URL has no directory portion
///
/// # Examples
///
/// ```
/// use track_harvest::url::resolve_resource_url;
///
/// let url = resolve_resource_url("http://x.test/site/page.html", "songs/track.mp3").unwrap();
/// assert_eq!(url, "http://x.test/site/songs/track.mp3");
/// ```
pub fn resolve_resource_url(page_url: &str, href: &str) -> UrlResult<String> {
    if has_scheme(href) {
        return Ok(href.to_string());
    }

    let directory = page_directory(page_url)?;
    Ok(format!("{}{}", directory, href))
}
