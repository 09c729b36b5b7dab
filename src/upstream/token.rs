// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! OAuth2 client-credentials token cache.
//!
//! The cached token is reused until it is within [`RENEWAL_MARGIN_SECS`] of expiry.
//! Renewal is not coordinated between callers: two requests that both see a
//! stale token will both exchange credentials and the last writer wins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::WarcraftLogsConfig;
use crate::error::AppError;
use crate::metrics::Metrics;

/// Remaining validity, in seconds, at or below which a cached token is renewed.
pub const RENEWAL_MARGIN_SECS: i64 = 60;

/// Anything able to hand out a bearer token for the GraphQL API.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String, AppError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        (self.expires_at - now).num_seconds() > RENEWAL_MARGIN_SECS
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
pub struct TokenCache {
    client: Client,
    config: Arc<WarcraftLogsConfig>,
    cached: Arc<RwLock<Option<CachedToken>>>,
    metrics: Metrics,
}

impl TokenCache {
    pub fn new(client: Client, config: Arc<WarcraftLogsConfig>, metrics: Metrics) -> Self {
        Self {
            client,
            config,
            cached: Arc::new(RwLock::new(None)),
            metrics,
        }
    }

    /// Seed the cache, mostly useful for tests and warm restarts.
    pub async fn store(&self, token: CachedToken) {
        *self.cached.write().await = Some(token);
    }

    pub async fn current(&self) -> Option<CachedToken> {
        self.cached.read().await.clone()
    }

    async fn renew(&self) -> Result<CachedToken, AppError> {
        let (client_id, client_secret) = self.config.credentials().ok_or_else(|| {
            AppError::Configuration(
                "WCL_CLIENT_ID and WCL_CLIENT_SECRET environment variables required".to_string(),
            )
        })?;

        self.metrics.record_token_renewal();
        tracing::debug!(url = %self.config.token_url, "requesting client-credentials token");

        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.config.auth_timeout)
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(AppError::UpstreamAuth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let payload = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("invalid token response: {e}")))?;

        let token = CachedToken {
            value: payload.access_token,
            expires_at: expiry_after(Utc::now(), payload.expires_in)?,
        };

        self.store(token.clone()).await;
        tracing::info!(expires_at = %token.expires_at, "obtained Warcraft Logs access token");

        Ok(token)
    }
}

/// `now + expires_in`, rejecting lifetimes outside chrono's representable range.
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            AppError::UpstreamAuth(format!("token response has invalid expires_in {expires_in}"))
        })
}

#[async_trait]
impl TokenSource for TokenCache {
    async fn token(&self) -> Result<String, AppError> {
        if let Some(token) = self.current().await {
            if token.is_fresh(Utc::now()) {
                self.metrics.record_token_cache_hit();
                return Ok(token.value);
            }
        }

        self.renew().await.map(|token| token.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_expiring_in(seconds: i64) -> CachedToken {
        CachedToken {
            value: "abc".into(),
            expires_at: Utc::now() + Duration::seconds(seconds),
        }
    }

    #[test]
    fn token_with_margin_is_fresh() {
        assert!(token_expiring_in(3600).is_fresh(Utc::now()));
        assert!(token_expiring_in(90).is_fresh(Utc::now()));
    }

    #[test]
    fn token_inside_margin_is_stale() {
        let now = Utc::now();
        let token = CachedToken {
            value: "abc".into(),
            expires_at: now + Duration::seconds(RENEWAL_MARGIN_SECS),
        };
        assert!(!token.is_fresh(now));
        assert!(!token_expiring_in(10).is_fresh(Utc::now()));
        assert!(!token_expiring_in(-5).is_fresh(Utc::now()));
    }

    #[test]
    fn expiry_is_offset_from_now() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 3600).unwrap(), now + Duration::seconds(3600));
    }

    #[test]
    fn out_of_range_expires_in_is_an_auth_error() {
        let now = Utc::now();
        for expires_in in [i64::MAX, i64::MIN] {
            let err = expiry_after(now, expires_in).unwrap_err();
            assert!(matches!(err, AppError::UpstreamAuth(_)), "{expires_in}: {err:?}");
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let config = WarcraftLogsConfig {
            // Unroutable: a request attempt would surface as UpstreamAuth, not Configuration.
            token_url: "http://127.0.0.1:9/oauth/token".into(),
            ..Default::default()
        };
        let cache = TokenCache::new(Client::new(), Arc::new(config), Metrics::new().unwrap());

        let err = cache.token().await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(cache.current().await.is_none());
    }

    #[tokio::test]
    async fn fresh_cached_token_is_returned_without_credentials() {
        let cache = TokenCache::new(
            Client::new(),
            Arc::new(WarcraftLogsConfig::default()),
            Metrics::new().unwrap(),
        );
        cache.store(token_expiring_in(3600)).await;

        assert_eq!(cache.token().await.unwrap(), "abc");
    }
}
