//! Page metadata extraction
//!
//! Turns fetched HTML into an icon-source candidate: an Open-Graph image
//! when the page advertises one, otherwise the first shortcut/icon link.
//! Candidates may be relative and are normalized against the page URL with
//! standard relative-URL resolution before they are fetched.

use scraper::{Html, Selector};
use url::Url;

/// Which tag produced an icon candidate, carrying its raw URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconCandidate {
    /// `<meta property="og:image" content="...">`
    OgImage(String),
    /// `<link rel="icon">` or `<link rel="shortcut icon">`
    RelIcon(String),
}

impl IconCandidate {
    pub fn url(&self) -> &str {
        match self {
            IconCandidate::OgImage(url) | IconCandidate::RelIcon(url) => url,
        }
    }
}

/// Locate an icon candidate in page bytes.
///
/// The parse is tolerant of malformed markup; a page that is not HTML at
/// all simply yields no candidate. Search order: og:image meta tag first,
/// then the first link tag whose `rel` matches `icon` or `shortcut icon`
/// case-insensitively.
pub fn extract_icon_candidate(page_bytes: &[u8]) -> Option<IconCandidate> {
    let html = String::from_utf8_lossy(page_bytes);
    let doc = Html::parse_document(&html);

    if let Some(content) = extract_meta_content(&doc, "meta[property=\"og:image\"]") {
        return Some(IconCandidate::OgImage(content));
    }

    extract_rel_icon(&doc).map(IconCandidate::RelIcon)
}

fn extract_meta_content(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .find_map(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn extract_rel_icon(doc: &Html) -> Option<String> {
    let selector = Selector::parse("link[rel][href]").ok()?;
    doc.select(&selector)
        .find(|el| {
            el.value()
                .attr("rel")
                .map(|rel| {
                    let rel = rel.trim().to_ascii_lowercase();
                    rel == "icon" || rel == "shortcut icon"
                })
                .unwrap_or(false)
        })
        .and_then(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Resolve a possibly-relative candidate URL against the page it was found
/// on, producing an absolute fetchable URL.
///
/// Absolute candidates (scheme and host present) pass through unchanged;
/// everything else resolves with standard relative-URL semantics, so query
/// strings and protocol-relative references survive.
pub fn resolve_candidate_url(page_url: &str, candidate: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(candidate) {
        if parsed.has_host() {
            return Some(candidate.to_string());
        }
    }
    let base = Url::parse(page_url).ok()?;
    base.join(candidate).ok().map(|u| u.to_string())
}
