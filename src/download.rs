//! Plain HTTP download of rendered slide images.
//!
//! The image host answers with redirects whose `Location` is already
//! percent-escaped. Automatic redirect handling is turned off and redirects
//! are followed here so that target is requested exactly as sent, never
//! decoded and re-escaped. This client carries no credentials.

use std::path::Path;

use futures::StreamExt;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, Url};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::models::ThumbnailRef;

/// Maximum number of redirects followed for one download.
const MAX_REDIRECTS: usize = 10;

/// Downloads thumbnail bytes to local files.
pub struct ThumbnailDownloader {
    http: Client,
}

impl ThumbnailDownloader {
    pub fn new() -> Result<Self> {
        let http = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self { http })
    }

    /// Stream the image behind `thumbnail` into `destination`, returning the
    /// number of bytes written. An existing file is overwritten.
    pub async fn download(&self, thumbnail: &ThumbnailRef, destination: &Path) -> Result<u64> {
        let url = thumbnail.content_url.as_str();
        let response = self.fetch(url).await?;

        let mut file = File::create(destination)
            .await
            .map_err(|e| ExportError::output(destination, e))?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| download_error(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| download_error(url, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| download_error(url, e))?;

        if written == 0 {
            return Err(ExportError::EmptyDownload(url.to_string()));
        }

        debug!("wrote {} bytes for {} to {:?}", written, thumbnail, destination);
        Ok(written)
    }

    /// GET `url`, following redirects by hand.
    async fn fetch(&self, url: &str) -> Result<Response> {
        let mut current = Url::parse(url).map_err(|e| download_error(url, e))?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .http
                .get(current.clone())
                .send()
                .await
                .map_err(|e| download_error(url, e))?;

            let status = response.status();
            if !status.is_redirection() {
                if !status.is_success() {
                    return Err(download_error(url, format!("unexpected status {}", status)));
                }
                return Ok(response);
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| download_error(url, format!("{} without Location", status)))?;

            current = resolve_redirect(&current, location)?;
            debug!("following redirect to {}", current);
        }

        Err(ExportError::TooManyRedirects(url.to_string()))
    }
}

/// Resolve a `Location` value against the URL that produced it.
///
/// The resolved URL must request exactly the path and query that were sent.
/// Locations that URL parsing would rewrite (dot segments, including escaped
/// ones such as `%2E%2E`, or backslashes) are rejected instead of being
/// fetched from a different path.
pub fn resolve_redirect(base: &Url, location: &str) -> Result<Url> {
    let resolved = base
        .join(location)
        .map_err(|e| download_error(base.as_str(), format!("bad redirect {}: {}", location, e)))?;

    let sent = location.split('#').next().unwrap_or_default();
    let requested = request_target(&resolved);
    let verbatim = match sent_request_target(sent) {
        Some(target) => requested == target,
        None => requested.ends_with(sent),
    };

    if !verbatim {
        return Err(download_error(
            base.as_str(),
            format!("redirect target cannot be requested verbatim: {}", location),
        ));
    }
    Ok(resolved)
}

/// Path and query of `url` as they go on the request line.
fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Path and query of an absolute or root-relative location. `None` for a
/// path-relative location, which only fixes the tail of the resolved path.
fn sent_request_target(location: &str) -> Option<String> {
    let after_authority = if let Some(rest) = location.strip_prefix("//") {
        rest
    } else if location.starts_with('/') {
        return Some(location.to_string());
    } else {
        match location.split_once("://") {
            Some((scheme, rest)) if is_scheme(scheme) => rest,
            _ => return None,
        }
    };

    let target = after_authority
        .find(['/', '?'])
        .map_or("", |i| &after_authority[i..]);
    if target.starts_with('/') {
        Some(target.to_string())
    } else {
        Some(format!("/{}", target))
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn download_error(url: &str, err: impl std::fmt::Display) -> ExportError {
    ExportError::Download {
        url: url.to_string(),
        message: err.to_string(),
    }
}
