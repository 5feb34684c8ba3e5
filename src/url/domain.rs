use url::Url;

/// Returns the network location (`host[:port]`) of a URL
///
/// The host is lowercased and the port is only included when it differs from
/// the scheme's default, so `https://Site.Test:443/` and `https://site.test/`
/// share a network location.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_scrape::url::network_location;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(network_location(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
