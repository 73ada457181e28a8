//! Persistence for the OAuth token in `token.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExportError, Result};

/// Tokens are considered expired this long before their actual expiry.
const EXPIRY_DELTA_SECS: i64 = 10;

/// An OAuth token. Field names match the token file written by
/// `golang.org/x/oauth2`, so existing `token.json` files load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Scopes granted with this token.
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The instant `secs` seconds from now, or `None` if it is not representable.
pub fn expiry_in(secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
}

impl Token {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expiry: Option<DateTime<Utc>>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            refresh_token,
            expiry,
            scopes,
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => Utc::now() + Duration::seconds(EXPIRY_DELTA_SECS) >= expiry,
            None => false,
        }
    }

    /// Returns true if every required scope was granted.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// File-backed store holding a single token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token. A missing or unreadable file yields `None`.
    pub fn load(&self) -> Option<Token> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("no cached token at {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str::<Token>(&content) {
            Ok(token) => {
                debug!("loaded cached token from {:?}", self.path);
                Some(token)
            }
            Err(e) => {
                warn!("ignoring corrupt token file {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Atomically replace the stored token. The file is readable by the
    /// owner only.
    pub fn save(&self, token: &Token) -> Result<()> {
        let io_err = |source| ExportError::TokenSave {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string(token)
            .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = owner_only_options().open(&temp_path).map_err(io_err)?;
            file.write_all(content.as_bytes()).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        fs::rename(&temp_path, &self.path).map_err(io_err)?;

        debug!("saved token to {:?}", self.path);
        Ok(())
    }

    /// Remove the stored token, if any.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ExportError::TokenSave {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

fn owner_only_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_token() -> Token {
        Token {
            access_token: "ya29.access".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry: Some(Utc::now() + Duration::hours(1)),
            scopes: vec!["scope1".to_string()],
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let token = sample_token();

        store.save(&token).unwrap();

        assert_eq!(store.load(), Some(token));
    }

    #[test]
    fn test_load_never_saved() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{not json").unwrap();

        assert!(TokenStore::new(path).load().is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));

        store.save(&sample_token()).unwrap();
        let mut second = sample_token();
        second.access_token = "ya29.second".to_string();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap().access_token, "ya29.second");
        assert!(!dir.path().join("token.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        TokenStore::new(&path).save(&sample_token()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&sample_token()).unwrap();

        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_load_go_oauth2_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(
            &path,
            r#"{"access_token":"ya29.a","token_type":"Bearer","refresh_token":"1//r","expiry":"2030-01-02T15:04:05.123456789+01:00"}"#,
        )
        .unwrap();

        let token = TokenStore::new(path).load().unwrap();
        assert_eq!(token.access_token, "ya29.a");
        assert_eq!(token.refresh_token.as_deref(), Some("1//r"));
        assert!(token.expiry.is_some());
        assert!(token.scopes.is_empty());
    }

    #[test]
    fn test_token_expiry() {
        let mut token = sample_token();
        assert!(!token.is_expired());

        token.expiry = Some(Utc::now() + Duration::seconds(5));
        assert!(token.is_expired());

        token.expiry = None;
        assert!(!token.is_expired());
    }

    #[test]
    fn test_expiry_in() {
        let expiry = expiry_in(3599).unwrap();
        assert!(expiry > Utc::now() + Duration::minutes(59));
        assert!(expiry_in(i64::MAX).is_none());
        assert!(expiry_in(i64::MIN).is_none());
    }

    #[test]
    fn test_token_scopes() {
        let token = sample_token();
        assert!(token.has_scopes(&["scope1".to_string()]));
        assert!(!token.has_scopes(&["scope2".to_string()]));
        assert!(token.has_scopes(&[]));
    }
}
