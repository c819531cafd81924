//! Single sign-on against the server's Keycloak realm.
//!
//! The NetGPT server advertises its SSO server at `/security/server`. The
//! client signs in with the resource-owner password grant, keeps the tokens
//! in a [`CredentialStore`] and refreshes them when they expire.

pub mod credentials;
pub mod jwt;

pub use credentials::{CredentialStore, Credentials};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Provider name of the only supported SSO server type
pub const KEYCLOAK: &str = "keycloak";

/// Where and how to authenticate, as published by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthServerInformation {
    pub provider: String,
    pub server: String,
    pub realm: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
}

impl AuthServerInformation {
    /// OpenID Connect token endpoint of the realm.
    pub fn token_endpoint(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.server.trim_end_matches('/'),
            self.realm
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unsupported authentication provider '{0}'")]
    UnsupportedProvider(String),

    #[error("authentication failed: {0}")]
    Rejected(String),

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("could not reach authentication server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not store credentials: {0}")]
    Store(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    refresh_expires_in: Option<i64>,
}

fn default_expires_in() -> i64 {
    300
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_credentials(self, server: AuthServerInformation, now: DateTime<Utc>) -> Credentials {
        Credentials {
            server,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: now + Duration::seconds(self.expires_in),
            // Keycloak reports 0 for offline tokens that never expire
            refresh_expires_at: self
                .refresh_expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| now + Duration::seconds(secs)),
        }
    }
}

/// Token client for one SSO server.
#[derive(Debug, Clone)]
pub struct Authenticator {
    info: AuthServerInformation,
    client: reqwest::Client,
}

impl Authenticator {
    pub fn new(info: AuthServerInformation) -> Result<Self, AuthError> {
        if !info.provider.eq_ignore_ascii_case(KEYCLOAK) {
            return Err(AuthError::UnsupportedProvider(info.provider));
        }
        Ok(Self {
            info,
            client: reqwest::Client::new(),
        })
    }

    pub fn info(&self) -> &AuthServerInformation {
        &self.info
    }

    /// Sign in with a username and password.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credentials, AuthError> {
        tracing::debug!(realm = %self.info.realm, %username, "requesting token");
        self.request_token(&[
            ("grant_type", "password"),
            ("client_id", &self.info.client_id),
            ("username", username),
            ("password", password),
            ("scope", "openid"),
        ])
        .await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, AuthError> {
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .ok_or(AuthError::SessionExpired)?;
        tracing::debug!(realm = %self.info.realm, "refreshing token");
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("client_id", &self.info.client_id),
            ("refresh_token", refresh_token),
        ])
        .await
        .map_err(|e| match e {
            AuthError::Rejected(_) => AuthError::SessionExpired,
            other => other,
        })
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Credentials, AuthError> {
        let response = self
            .client
            .post(self.info.token_endpoint())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let tokens: TokenResponse = response.json().await?;
            return Ok(tokens.into_credentials(self.info.clone(), Utc::now()));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, "token request rejected");
        let reason = serde_json::from_str::<TokenErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error_description.or(e.error))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        Err(AuthError::Rejected(reason))
    }
}

/// Held while a token refresh is in flight, so concurrent requests do not
/// spend the same refresh token twice.
static REFRESH_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Return a usable access token from the store, refreshing it if needed.
///
/// A refreshed token is written back to the store. Refreshes are
/// serialized: a caller that waited on another refresh reads the token it
/// stored instead of refreshing again.
pub async fn valid_token(store: &CredentialStore) -> Result<String, AuthError> {
    let credentials = store.load().ok_or(AuthError::NotLoggedIn)?;
    if !credentials.is_expired(Utc::now()) {
        return Ok(credentials.access_token);
    }

    let _guard = REFRESH_LOCK.lock().await;
    let credentials = store.load().ok_or(AuthError::NotLoggedIn)?;
    let now = Utc::now();
    if !credentials.is_expired(now) {
        return Ok(credentials.access_token);
    }
    if !credentials.can_refresh(now) {
        return Err(AuthError::SessionExpired);
    }

    let authenticator = Authenticator::new(credentials.server.clone())?;
    let refreshed = authenticator.refresh(&credentials).await?;
    store.save(&refreshed)?;
    tracing::info!("access token refreshed");
    Ok(refreshed.access_token)
}
