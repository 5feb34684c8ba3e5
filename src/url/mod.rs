//! URL handling module for Site-Scrape
//!
//! This module turns raw hrefs into absolute URLs and keeps the crawl on the
//! seed URL's network location.

mod domain;

use crate::{UrlError, UrlResult};
use url::{ParseError, Url};

pub use domain::network_location;

/// Resolves a raw href against the seed URL
///
/// # Resolution Rules
///
/// 1. Empty (or whitespace-only) hrefs are rejected
/// 2. Hrefs without a scheme, including `/`-prefixed paths, are joined onto
///    the seed URL
/// 3. Anything that is not http or https after resolution is rejected
/// 4. The fragment is dropped
/// 5. The resolved network location must equal the seed's
///
/// # Arguments
///
/// * `href` - The href attribute value as found in the page
/// * `seed` - The crawl's seed URL
///
/// # Returns
///
/// * `Ok(Url)` - An absolute, same-domain URL
/// * `Err(UrlError)` - The link is not followed; only `UrlError::Parse` is a
///   real error, the other variants are routine rejections
///
/// # Examples
///
/// ```
/// use site_scrape::url::resolve_link;
/// use url::Url;
///
/// let seed = Url::parse("https://site.test/").unwrap();
/// assert_eq!(
///     resolve_link("/a/b", &seed).unwrap().as_str(),
///     "https://site.test/a/b"
/// );
/// assert!(resolve_link("https://other.example/x", &seed).is_err());
/// ```
pub fn resolve_link(href: &str, seed: &Url) -> UrlResult<Url> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = match Url::parse(href) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => seed
            .join(href)
            .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?,
        Err(e) => return Err(UrlError::Parse(format!("{}: {}", href, e))),
    };

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(resolved.scheme().to_string()));
    }

    resolved.set_fragment(None);

    let expected = network_location(seed).unwrap_or_default();
    let found = network_location(&resolved).unwrap_or_default();
    if expected != found {
        return Err(UrlError::CrossDomain { expected, found });
    }

    Ok(resolved)
}
