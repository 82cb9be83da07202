//! Cached AAD token credential for the Log Analytics API.
//!
//! Acquires a bearer token via the OAuth2 client-credentials flow for the
//! `https://api.loganalytics.io/.default` scope and caches it until expiry;
//! a fresh token is only fetched once the cached one has run out.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Scope requested for Log Analytics API access.
const LOG_ANALYTICS_SCOPE: &str = "https://api.loganalytics.io/.default";

/// Safety margin subtracted from the advertised token lifetime.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: SecretString,
    expires_on: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_on > now
    }
}

/// Client-credentials token source with in-process caching.
pub struct CachedTokenCredential {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    cached: RwLock<Option<CachedToken>>,
}

impl CachedTokenCredential {
    pub fn new(tenant_id: &str, client_id: &str, client_secret: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: format!(
                "https://login.microsoftonline.com/{tenant_id}/oauth2/v2.0/token"
            ),
            client_id: client_id.to_string(),
            client_secret,
            cached: RwLock::new(None),
        }
    }

    /// Override the token endpoint (tests).
    pub fn with_token_url(mut self, url: &str) -> Self {
        self.token_url = url.to_string();
        self
    }

    /// Return a valid bearer token, refreshing only when the cached one
    /// has expired.
    pub async fn token(&self) -> Result<SecretString, anyhow::Error> {
        let now = Utc::now();
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_valid(now)) {
                return Ok(token.token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid(now)) {
            return Ok(token.token.clone());
        }

        tracing::debug!("refreshing Log Analytics access token");
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", LOG_ANALYTICS_SCOPE),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let token: TokenResponse = response.json().await?;
        let secret = SecretString::from(token.access_token);
        *cached = Some(CachedToken {
            token: secret.clone(),
            expires_on: now + Duration::seconds(token.expires_in - EXPIRY_MARGIN_SECS),
        });

        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_validity_window() {
        let now = Utc::now();
        let token = CachedToken {
            token: SecretString::from("t"),
            expires_on: now + Duration::seconds(30),
        };
        assert!(token.is_valid(now));
        assert!(!token.is_valid(now + Duration::seconds(31)));
    }

    #[test]
    fn test_token_url_derived_from_tenant() {
        let cred = CachedTokenCredential::new(
            "my-tenant",
            "my-client",
            SecretString::from("secret"),
        );
        assert_eq!(
            cred.token_url,
            "https://login.microsoftonline.com/my-tenant/oauth2/v2.0/token"
        );
    }
}
