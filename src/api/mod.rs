//! HTTP client for the NetGPT server.
//!
//! Endpoints are grouped by server router: [`security`], [`settings`] and
//! [`chat`]. Every call returns an [`ApiError`] on failure, never panics.

pub mod chat;
pub mod security;
pub mod settings;

use crate::config::validate_server_url;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Chat requests wait this long for the language model to answer.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid server URL '{0}'")]
    InvalidServerUrl(String),

    #[error("server replied {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("could not reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Please log in to the server.")]
    Unauthenticated,
}

impl ApiError {
    fn from_status(status: StatusCode) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// The server rejected our token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// Client bound to one server URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(server_url: &str) -> Result<Self, ApiError> {
        let server_url = server_url.trim();
        if !validate_server_url(server_url) {
            return Err(ApiError::InvalidServerUrl(server_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("netgpt/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: server_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.http.get(self.url(path))).await
    }

    async fn get_authed<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ApiError> {
        let request = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .timeout(CHAT_TIMEOUT);
        self.execute(request).await
    }

    async fn post_authed<B, T>(&self, path: &str, body: &B, token: &str) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .timeout(CHAT_TIMEOUT)
            .json(body);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        if !status.is_success() {
            tracing::warn!(%status, path = %url, "request failed");
            return Err(ApiError::from_status(status));
        }

        let body = response.text().await?;
        tracing::trace!(path = %url, bytes = body.len(), "response received");
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            ApiClient::new("localhost:8000"),
            Err(ApiError::InvalidServerUrl(url)) if url == "localhost:8000"
        ));
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = ApiClient::new(" http://localhost:8000/ ").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/chat/message"), "http://localhost:8000/chat/message");
    }

    #[test]
    fn test_status_error_reason() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "server replied 404: Not Found");
        assert!(!err.is_unauthorized());
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED).is_unauthorized());
    }
}
