//! OAuth 2.0 installed-application authorization for Google APIs.
//!
//! A cached token is reused when it covers the requested scopes. Otherwise the
//! operator is sent to the consent page and pastes back the authorization code,
//! which is exchanged for a token and cached for the next run.

use std::io::BufRead;
use std::sync::Arc;

use reqwest::{Client, Url};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::credentials::ClientDescriptor;
use crate::error::{ExportError, Result};
use crate::models::TokenResponse;
use crate::token_store::{expiry_in, Token, TokenStore};

/// Read-only access to presentations.
pub const PRESENTATIONS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/presentations.readonly";

/// Fixed anti-forgery value sent as the `state` parameter.
const AUTH_STATE: &str = "state-token";

/// Source of the authorization code during the consent flow.
pub trait CodeSupplier: Send + Sync {
    /// Present `auth_url` to the operator and return the code they obtained.
    fn supply_code(&self, auth_url: &str) -> Result<String>;
}

/// Prints the consent URL on stdout and reads the code from stdin.
#[derive(Debug, Default)]
pub struct StdinCodeSupplier;

impl CodeSupplier for StdinCodeSupplier {
    fn supply_code(&self, auth_url: &str) -> Result<String> {
        println!(
            "Go to the following link in your browser then type the authorization code:\n{}",
            auth_url
        );

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| {
                ExportError::Authorization(format!("unable to read authorization code: {}", e))
            })?;

        parse_code(&line)
    }
}

/// Always returns the same code. Useful when the code was obtained out of band.
#[derive(Debug, Clone)]
pub struct FixedCodeSupplier(pub String);

impl CodeSupplier for FixedCodeSupplier {
    fn supply_code(&self, _auth_url: &str) -> Result<String> {
        parse_code(&self.0)
    }
}

/// Take the first whitespace-delimited token of the operator's input.
fn parse_code(input: &str) -> Result<String> {
    input
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ExportError::Authorization("empty authorization code".to_string()))
}

/// Produces an [`AuthorizedSession`] from a client descriptor and a token store.
pub struct Authenticator {
    descriptor: Arc<ClientDescriptor>,
    store: TokenStore,
    scopes: Vec<String>,
    code_supplier: Box<dyn CodeSupplier>,
    http: Client,
}

impl Authenticator {
    /// Create an authenticator requesting read-only presentation access and
    /// reading the authorization code from stdin.
    pub fn new(descriptor: ClientDescriptor, store: TokenStore) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            store,
            scopes: vec![PRESENTATIONS_READONLY_SCOPE.to_string()],
            code_supplier: Box::new(StdinCodeSupplier),
            http: Client::new(),
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_code_supplier(mut self, supplier: Box<dyn CodeSupplier>) -> Self {
        self.code_supplier = supplier;
        self
    }

    /// Build the consent page URL.
    pub fn authorization_url(&self) -> Result<String> {
        let scope = self.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.descriptor.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.descriptor.client_id.as_str()),
                ("redirect_uri", self.descriptor.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", AUTH_STATE),
            ],
        )
        .map_err(|e| {
            ExportError::CredentialsParse(format!(
                "invalid auth_uri {}: {}",
                self.descriptor.auth_uri, e
            ))
        })?;
        Ok(url.into())
    }

    /// Return a session bound to a usable token, running the consent flow
    /// when the cache holds none.
    pub async fn authorize(self) -> Result<AuthorizedSession> {
        let token = match self.cached_token() {
            Some(token) => token,
            None => {
                let token = self.authorize_interactively().await?;
                info!("Saving credential file to: {}", self.store.path().display());
                self.store.save(&token)?;
                token
            }
        };

        Ok(AuthorizedSession {
            descriptor: self.descriptor,
            store: self.store,
            http: self.http,
            token: Arc::new(RwLock::new(token)),
        })
    }

    /// The cached token, if it can serve this run's scopes.
    fn cached_token(&self) -> Option<Token> {
        let token = self.store.load()?;

        if !token.has_scopes(&self.scopes) {
            warn!(
                "cached token at {} lacks requested scopes, re-authorizing",
                self.store.path().display()
            );
            return None;
        }

        if token.is_expired() && !token.can_refresh() {
            info!("cached token expired and cannot be refreshed, re-authorizing");
            return None;
        }

        debug!("using cached token");
        Some(token)
    }

    async fn authorize_interactively(&self) -> Result<Token> {
        let auth_url = self.authorization_url()?;
        let code = self.code_supplier.supply_code(&auth_url)?;

        info!("received authorization code, exchanging for tokens...");

        let params = [
            ("client_id", self.descriptor.client_id.as_str()),
            ("client_secret", self.descriptor.client_secret.as_str()),
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.descriptor.redirect_uri.as_str()),
        ];

        let response = request_token(&self.http, &self.descriptor.token_uri, &params)
            .await
            .map_err(ExportError::TokenExchange)?;

        token_from_response(response, None, &self.scopes).map_err(ExportError::TokenExchange)
    }
}

/// An HTTP client bound to an OAuth token that is refreshed on expiry.
#[derive(Clone)]
pub struct AuthorizedSession {
    descriptor: Arc<ClientDescriptor>,
    store: TokenStore,
    http: Client,
    token: Arc<RwLock<Token>>,
}

impl AuthorizedSession {
    /// The transport used for authorized API calls.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// A snapshot of the current token.
    pub async fn token(&self) -> Token {
        self.token.read().await.clone()
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        let mut token = self.token.write().await;
        if token.is_expired() {
            let refreshed = self.refresh(&token).await?;
            self.store.save(&refreshed)?;
            *token = refreshed;
        }

        Ok(token.access_token.clone())
    }

    async fn refresh(&self, current: &Token) -> Result<Token> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ExportError::TokenRefresh("token expired and no refresh token is available".into())
            })?;

        debug!("refreshing access token");

        let params = [
            ("client_id", self.descriptor.client_id.as_str()),
            ("client_secret", self.descriptor.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = request_token(&self.http, &self.descriptor.token_uri, &params)
            .await
            .map_err(ExportError::TokenRefresh)?;

        let token = token_from_response(response, current.refresh_token.clone(), &current.scopes)
            .map_err(ExportError::TokenRefresh)?;
        info!("refreshed access token");
        Ok(token)
    }
}

/// POST a form to the token endpoint and decode the token response.
async fn request_token(
    http: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> std::result::Result<TokenResponse, String> {
    let response = http
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| format!("request to {} failed: {}", token_uri, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("failed to read response: {}", e))?;

    if !status.is_success() {
        return Err(format!("Status {}: {}", status, body));
    }

    serde_json::from_str(&body).map_err(|e| format!("invalid token response: {}", e))
}

fn token_from_response(
    response: TokenResponse,
    previous_refresh: Option<String>,
    requested_scopes: &[String],
) -> std::result::Result<Token, String> {
    let scopes = match response.scope.as_deref() {
        Some(scope) if !scope.trim().is_empty() => {
            scope.split_whitespace().map(str::to_string).collect()
        }
        _ => requested_scopes.to_vec(),
    };

    let expiry = match response.expires_in {
        Some(secs) => Some(
            expiry_in(secs).ok_or_else(|| format!("expires_in out of range: {}", secs))?,
        ),
        None => None,
    };

    let mut token = Token::new(
        response.access_token,
        response.refresh_token.or(previous_refresh),
        expiry,
        scopes,
    );
    if let Some(token_type) = response.token_type {
        token.token_type = token_type;
    }
    Ok(token)
}
