//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use slides_export::auth::PRESENTATIONS_READONLY_SCOPE;
use slides_export::{
    AuthorizedSession, Authenticator, ClientDescriptor, CodeSupplier, Result, Token, TokenStore,
};

/// Code supplier that records how often the consent flow asked for a code.
#[derive(Clone, Default)]
pub struct CountingSupplier {
    pub calls: Arc<AtomicUsize>,
    pub last_url: Arc<std::sync::Mutex<Option<String>>>,
}

impl CountingSupplier {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodeSupplier for CountingSupplier {
    fn supply_code(&self, auth_url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(auth_url.to_string());
        Ok("4/test-code".to_string())
    }
}

pub fn descriptor(server_url: &str) -> ClientDescriptor {
    ClientDescriptor {
        client_id: "client-123.apps.googleusercontent.com".to_string(),
        client_secret: "client-secret".to_string(),
        auth_uri: format!("{}/o/oauth2/auth", server_url),
        token_uri: format!("{}/token", server_url),
        redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
    }
}

/// Contents of a `credentials.json` pointing the token endpoint at the mock server.
pub fn credentials_json(server_url: &str) -> String {
    json!({
        "installed": {
            "client_id": "client-123.apps.googleusercontent.com",
            "client_secret": "client-secret",
            "auth_uri": format!("{}/o/oauth2/auth", server_url),
            "token_uri": format!("{}/token", server_url),
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"]
        }
    })
    .to_string()
}

pub fn valid_token(access_token: &str) -> Token {
    Token {
        access_token: access_token.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expiry: Some(Utc::now() + Duration::hours(1)),
        scopes: vec![PRESENTATIONS_READONLY_SCOPE.to_string()],
    }
}

/// Authorize with `token` already cached in `dir/token.json`.
pub async fn cached_session(dir: &Path, server_url: &str, token: Token) -> AuthorizedSession {
    let store = TokenStore::new(dir.join("token.json"));
    store.save(&token).unwrap();

    Authenticator::new(descriptor(server_url), store)
        .with_code_supplier(Box::new(CountingSupplier::default()))
        .authorize()
        .await
        .unwrap()
}

/// A notes-page text shape made of the given runs.
pub fn text_shape(runs: &[&str]) -> Value {
    let elements: Vec<Value> = runs
        .iter()
        .map(|r| json!({"startIndex": 0, "textRun": {"content": r, "style": {}}}))
        .collect();

    json!({
        "objectId": "notes-body",
        "shape": {"shapeType": "TEXT_BOX", "text": {"textElements": elements}}
    })
}

/// A slide whose notes page holds `elements`.
pub fn slide(object_id: &str, elements: Vec<Value>) -> Value {
    json!({
        "objectId": object_id,
        "pageElements": [],
        "slideProperties": {
            "layoutObjectId": "layout",
            "masterObjectId": "master",
            "notesPage": {
                "objectId": format!("{}:notes", object_id),
                "pageType": "NOTES",
                "pageElements": elements
            }
        }
    })
}

pub fn presentation(id: &str, slides: Vec<Value>) -> String {
    json!({
        "presentationId": id,
        "title": "Test deck",
        "slides": slides
    })
    .to_string()
}
