//! HTML parser for extracting the title and anchor hrefs
//!
//! Hrefs are returned exactly as written in the page; resolving them against
//! the seed and filtering by domain is the link resolver's job.

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Trimmed text of the first `<title>`, empty when the page has none
    pub title: String,

    /// Raw `href` values of the page's anchors, in document order
    pub hrefs: Vec<String>,
}

/// Anything that can pull a title and hrefs out of page HTML
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedContent;
}

/// Content extractor backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl ContentExtractor for HtmlExtractor {
    fn extract(&self, html: &str) -> ExtractedContent {
        parse_html(html)
    }
}

/// Parses HTML content and extracts the title and anchor hrefs
///
/// # Extraction Rules
///
/// - Only `<a href="...">` anchors are considered
/// - Anchors carrying a `download` attribute are skipped
/// - Empty hrefs are dropped here; everything else is left for the resolver
///
/// # Example
///
/// ```
/// use site_scrape::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.hrefs, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ExtractedContent {
    let document = Html::parse_document(html);

    ExtractedContent {
        title: extract_title(&document),
        hrefs: extract_hrefs(&document),
    }
}

fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(String::from)
        .collect()
}
