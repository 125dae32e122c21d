//! Tenant access token cache.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Feishu tokens live for two hours; refresh ten minutes early.
pub const TOKEN_TTL: Duration = Duration::from_secs(6600);

const AUTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token response could not be decoded: {0}")]
    Decode(String),

    #[error("token request rejected (code {code}): {msg}")]
    Rejected { code: i64, msg: String },

    #[error("token response had no tenant_access_token")]
    MissingToken,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default = "missing_code")]
    code: i64,
    #[serde(default)]
    msg: String,
    tenant_access_token: Option<String>,
}

fn missing_code() -> i64 {
    -1
}

#[derive(Clone, Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Caches a single tenant access token and refreshes it when it expires.
///
/// The lock is only held to read or replace the cached value, never across
/// the refresh request, so two callers that both see an expired token will
/// both refresh and the later write wins.
pub struct TokenCache {
    client: Client,
    url: String,
    app_id: String,
    app_secret: String,
    ttl: Duration,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(
        client: Client,
        base_url: &str,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: format!(
                "{}/auth/v3/tenant_access_token/internal",
                base_url.trim_end_matches('/')
            ),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            ttl: TOKEN_TTL,
            cached: RwLock::new(None),
        }
    }

    /// Override how long a fetched token is trusted.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Return the cached token, fetching a new one if absent or expired.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_value() {
            return Ok(token);
        }

        let token = self.fetch().await?;
        self.store(token.clone());
        tracing::info!("Fetched Feishu tenant access token");
        Ok(token)
    }

    /// Forget the cached token so the next call refreshes.
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.write() {
            *cached = None;
        }
    }

    fn cached_value(&self) -> Option<String> {
        let cached = self.cached.read().ok()?;
        let value = cached
            .as_ref()
            .filter(|token| Instant::now() < token.expires_at)
            .map(|token| token.value.clone());
        value
    }

    fn store(&self, value: String) {
        match self.cached.write() {
            Ok(mut cached) => {
                *cached = Some(CachedToken {
                    value,
                    expires_at: Instant::now() + self.ttl,
                });
            }
            Err(e) => tracing::warn!("Token cache lock poisoned, not caching: {}", e),
        }
    }

    async fn fetch(&self) -> Result<String, AuthError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(AUTH_TIMEOUT)
            .json(&TokenRequest {
                app_id: &self.app_id,
                app_secret: &self.app_secret,
            })
            .send()
            .await?;

        let body = response.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Undecodable token response: {}", body);
            AuthError::Decode(e.to_string())
        })?;

        if parsed.code != 0 {
            tracing::error!("Feishu token request rejected: {}", body);
            return Err(AuthError::Rejected {
                code: parsed.code,
                msg: parsed.msg,
            });
        }

        parsed
            .tenant_access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_stub, StubFeishu};

    #[tokio::test]
    async fn test_token_is_cached_until_expiry() {
        let stub = StubFeishu::default();
        let base = spawn_stub(stub.router()).await;
        let cache = TokenCache::new(Client::new(), &base, "cli_app", "secret")
            .with_ttl(Duration::from_millis(300));

        assert_eq!(cache.get_token().await.unwrap(), "t-1");
        assert_eq!(cache.get_token().await.unwrap(), "t-1");
        assert_eq!(stub.auth_calls(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(cache.get_token().await.unwrap(), "t-2");
        assert_eq!(stub.auth_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let stub = StubFeishu::default();
        let base = spawn_stub(stub.router()).await;
        let cache = TokenCache::new(Client::new(), &base, "cli_app", "secret");

        cache.get_token().await.unwrap();
        cache.invalidate();
        cache.get_token().await.unwrap();
        assert_eq!(stub.auth_calls(), 2);
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let stub = StubFeishu::rejecting();
        let base = spawn_stub(stub.router()).await;
        let cache = TokenCache::new(Client::new(), &base, "cli_app", "wrong");

        let err = cache.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected { code: 10003, .. }));

        // Failures are not cached.
        assert!(cache.get_token().await.is_err());
        assert_eq!(stub.auth_calls(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let cache = TokenCache::new(Client::new(), "http://127.0.0.1:1", "cli_app", "secret");
        assert!(matches!(
            cache.get_token().await,
            Err(AuthError::Request(_))
        ));
    }
}
