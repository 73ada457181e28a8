//! URL parser for extracting presentation IDs from Google Slides URLs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ExportError, Result};

/// Editor, viewer and present URLs: `.../presentation/d/<ID>/...`.
static PRESENTATION_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://docs\.google\.com/presentation/(?:u/\d+/)?d/([a-zA-Z0-9_-]+)")
        .expect("Invalid presentation URL regex")
});

/// Drive open links: `https://drive.google.com/open?id=<ID>`.
static OPEN_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)")
        .expect("Invalid open URL regex")
});

/// Valid presentation ID pattern (alphanumeric, underscore, hyphen).
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Extract a presentation ID from a Slides URL or validate a raw ID.
///
/// Supports the following formats:
/// - `https://docs.google.com/presentation/d/<ID>/edit`
/// - `https://docs.google.com/presentation/u/0/d/<ID>/present`
/// - `https://drive.google.com/open?id=<ID>`
/// - Raw ID string
///
/// # Examples
///
/// ```
/// use slides_export::url_parser::extract_presentation_id;
///
/// let id = extract_presentation_id(
///     "https://docs.google.com/presentation/d/1abc123/edit#slide=id.p",
/// )
/// .unwrap();
/// assert_eq!(id, "1abc123");
///
/// let id = extract_presentation_id("1abc123").unwrap();
/// assert_eq!(id, "1abc123");
/// ```
pub fn extract_presentation_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    for regex in [&*PRESENTATION_URL_REGEX, &*OPEN_URL_REGEX] {
        if let Some(id) = regex.captures(trimmed).and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }
    }

    if ID_REGEX.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(ExportError::InvalidUrlOrId(url_or_id.to_string()))
}
