//! Credential checks against the dealership backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Bearer token issued by the backend, passed through unchanged.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
#[serde(transparent)]
pub struct AuthTokenValue(pub String);

impl AuthTokenValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the backend says about a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: AuthTokenValue,
    pub username: String,
    /// `None` when the backend did not report a role.
    pub role: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed authentication response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthenticationError>;
}

#[derive(Serialize)]
struct LoginRequestBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponseBody {
    token: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// [`Authenticator`] backed by the REST `login/` endpoint.
pub struct RestAuthenticator {
    client: reqwest::Client,
    base_url: String,
}

impl RestAuthenticator {
    pub fn new(base_url: &str, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Authenticator for RestAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthenticationError> {
        let url = format!("{}/login/", self.base_url);
        debug!("Authenticating {} against {}", username, url);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequestBody { username, password })
            .send()
            .await
            .map_err(|err| AuthenticationError::Unavailable(err.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AuthenticationError::InvalidCredentials);
            }
            status => {
                return Err(AuthenticationError::Unavailable(format!(
                    "login returned status {}",
                    status
                )));
            }
        }

        let body: LoginResponseBody = response
            .json()
            .await
            .map_err(|err| AuthenticationError::MalformedResponse(err.to_string()))?;

        if body.token.trim().is_empty() {
            return Err(AuthenticationError::MalformedResponse(
                "empty token".to_string(),
            ));
        }

        Ok(AuthResponse {
            token: AuthTokenValue(body.token),
            username: body.username.unwrap_or_default(),
            role: body.role.filter(|role| !role.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash() {
        let authenticator = RestAuthenticator::new("http://localhost:8000/api/", 5).unwrap();
        assert_eq!(authenticator.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn response_body_tolerates_missing_fields() {
        let body: LoginResponseBody = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert_eq!(body.token, "abc");
        assert_eq!(body.username, None);
        assert_eq!(body.role, None);
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        // port 9 (discard) is not expected to accept HTTP connections
        let authenticator = RestAuthenticator::new("http://127.0.0.1:9/api", 2).unwrap();
        let result = authenticator.authenticate("user", "pass").await;
        assert!(matches!(result, Err(AuthenticationError::Unavailable(_))));
    }
}
