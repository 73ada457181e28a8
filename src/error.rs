//! Error types for the slides_export crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while exporting a presentation.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to read credentials file {path}: {source}")]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParse(String),

    #[error("Invalid presentation URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("Failed to save token to {path}: {source}")]
    TokenSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Download from {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("Unexpected empty file from url {0}")]
    EmptyDownload(String),

    #[error("Too many redirects while fetching {0}")]
    TooManyRedirects(String),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of an [`ExportError`], naming the pipeline stage
/// that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Auth,
    Remote,
    Download,
    Output,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::CredentialsRead { .. }
            | ExportError::CredentialsParse(_)
            | ExportError::InvalidUrlOrId(_) => ErrorKind::Config,
            ExportError::Authorization(_)
            | ExportError::TokenExchange(_)
            | ExportError::TokenRefresh(_) => ErrorKind::Auth,
            ExportError::Http(_)
            | ExportError::Api { .. }
            | ExportError::NotFound(_)
            | ExportError::PermissionDenied(_) => ErrorKind::Remote,
            ExportError::Download { .. }
            | ExportError::EmptyDownload(_)
            | ExportError::TooManyRedirects(_) => ErrorKind::Download,
            ExportError::Output { .. } | ExportError::TokenSave { .. } => ErrorKind::Output,
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Output {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ExportError::CredentialsParse("bad".into()).kind(),
            ErrorKind::Config
        );
        assert_eq!(ExportError::TokenRefresh("x".into()).kind(), ErrorKind::Auth);
        assert_eq!(
            ExportError::PermissionDenied("deck".into()).kind(),
            ErrorKind::Remote
        );
        assert_eq!(
            ExportError::EmptyDownload("https://example.com".into()).kind(),
            ErrorKind::Download
        );
        assert_eq!(
            ExportError::output(
                "notes.txt",
                std::io::Error::new(std::io::ErrorKind::Other, "disk full")
            )
            .kind(),
            ErrorKind::Output
        );
    }

    #[test]
    fn test_empty_download_display() {
        let err = ExportError::EmptyDownload("https://lh3.example.com/abc".into());
        assert!(err.to_string().contains("https://lh3.example.com/abc"));
    }
}
