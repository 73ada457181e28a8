//! OAuth client descriptor loaded from `credentials.json`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ExportError, Result};

/// Default Google authorization endpoint.
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Default Google token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Out-of-band redirect, used when the descriptor lists no redirect URI.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// OAuth client configuration for an installed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDescriptor {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub redirect_uri: String,
}

/// Layout of the JSON downloaded from the Google Cloud Console, either
/// nested under `installed`/`web` or flat.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
    #[serde(flatten)]
    flat: ClientSection,
}

#[derive(Debug, Default, Deserialize)]
struct ClientSection {
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl ClientDescriptor {
    /// Load a descriptor from a credentials JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ExportError::CredentialsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a descriptor from credentials JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CredentialsFile = serde_json::from_str(json)
            .map_err(|e| ExportError::CredentialsParse(e.to_string()))?;

        let section = file.installed.or(file.web).unwrap_or(file.flat);

        let client_id = section
            .client_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ExportError::CredentialsParse("missing client_id".to_string()))?;
        let client_secret = section
            .client_secret
            .ok_or_else(|| ExportError::CredentialsParse("missing client_secret".to_string()))?;

        Ok(Self {
            client_id,
            client_secret,
            auth_uri: section
                .auth_uri
                .unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: section
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            redirect_uri: section
                .redirect_uris
                .into_iter()
                .next()
                .unwrap_or_else(|| OOB_REDIRECT_URI.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_format() {
        let json = r#"{
            "installed": {
                "client_id": "id.apps.googleusercontent.com",
                "project_id": "demo",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_secret": "secret",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let descriptor = ClientDescriptor::from_json(json).unwrap();
        assert_eq!(descriptor.client_id, "id.apps.googleusercontent.com");
        assert_eq!(descriptor.client_secret, "secret");
        assert_eq!(descriptor.redirect_uri, "http://localhost");
    }

    #[test]
    fn test_web_format_defaults() {
        let json = r#"{"web": {"client_id": "id", "client_secret": "secret"}}"#;

        let descriptor = ClientDescriptor::from_json(json).unwrap();
        assert_eq!(descriptor.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(descriptor.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(descriptor.redirect_uri, OOB_REDIRECT_URI);
    }

    #[test]
    fn test_flat_format() {
        let json = r#"{"client_id": "id", "client_secret": "secret", "token_uri": "http://127.0.0.1/token"}"#;

        let descriptor = ClientDescriptor::from_json(json).unwrap();
        assert_eq!(descriptor.client_id, "id");
        assert_eq!(descriptor.token_uri, "http://127.0.0.1/token");
    }

    #[test]
    fn test_missing_client_id() {
        let err = ClientDescriptor::from_json(r#"{"installed": {"client_secret": "s"}}"#)
            .unwrap_err();
        assert!(matches!(err, ExportError::CredentialsParse(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(ClientDescriptor::from_json("not json").is_err());
    }
}
