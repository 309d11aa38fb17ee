//! Azure Authentication
//!
//! Handles authentication with a service principal secret from the
//! environment or with the Azure CLI's logged-in account.

use super::http::ArmHttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::RwLock;

/// Default Entra ID authority
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// A bearer token and, when known, its expiry
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Something that can produce ARM access tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn fetch_token(&self) -> Result<AccessToken>;
}

/// OAuth2 client-credentials flow for a service principal
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    scope: String,
    http: ArmHttpClient,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
        authority_host: &str,
        management_endpoint: &str,
        http: ArmHttpClient,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            authority_host: authority_host.trim_end_matches('/').to_string(),
            scope: format!("{}/.default", management_endpoint.trim_end_matches('/')),
            http,
        }
    }

    /// Build from AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET
    pub fn from_env(
        authority_host: &str,
        management_endpoint: &str,
        http: ArmHttpClient,
    ) -> Option<Self> {
        let tenant_id = std::env::var("AZURE_TENANT_ID").ok()?;
        let client_id = std::env::var("AZURE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("AZURE_CLIENT_SECRET").ok()?;
        if tenant_id.is_empty() || client_id.is_empty() || client_secret.is_empty() {
            return None;
        }
        Some(Self::new(
            &tenant_id,
            &client_id,
            &client_secret,
            authority_host,
            management_endpoint,
            http,
        ))
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_host, self.tenant_id)
    }
}

#[async_trait]
impl TokenSource for ClientSecretCredential {
    fn name(&self) -> &'static str {
        "client-secret"
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];
        let response = self
            .http
            .post_form(&self.token_url(), &form)
            .await
            .context("Token request failed")?;
        let parsed: TokenResponse =
            serde_json::from_value(response).context("Unexpected token response")?;

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: parsed
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }
}

/// Token from the Azure CLI's logged-in account
pub struct AzureCliCredential {
    resource: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: String,
    /// Local time, e.g. `2024-05-01 13:45:10.000000`
    #[serde(default)]
    expires_on: Option<String>,
    /// Unix timestamp (newer CLI versions)
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

impl AzureCliCredential {
    pub fn new(management_endpoint: &str) -> Self {
        Self {
            resource: format!("{}/", management_endpoint.trim_end_matches('/')),
        }
    }
}

/// Parse the CLI's token expiry, preferring the unix timestamp
fn parse_cli_expiry(expires_on: Option<&str>, expires_on_epoch: Option<i64>) -> Option<DateTime<Utc>> {
    if let Some(epoch) = expires_on_epoch {
        return Utc.timestamp_opt(epoch, 0).single();
    }
    let naive = NaiveDateTime::parse_from_str(expires_on?, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl TokenSource for AzureCliCredential {
    fn name(&self) -> &'static str {
        "azure-cli"
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        tracing::debug!("az account get-access-token --resource {}", self.resource);

        let output = Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                &self.resource,
                "--output",
                "json",
            ])
            .output()
            .await
            .context("Failed to run 'az'. Is the Azure CLI installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("az account get-access-token failed: {}", stderr.trim());
            return Err(anyhow::anyhow!(
                "Azure CLI could not provide a token. Run 'az login'"
            ));
        }

        let parsed: CliTokenResponse =
            serde_json::from_slice(&output.stdout).context("Unexpected 'az' token output")?;

        Ok(AccessToken {
            expires_at: parse_cli_expiry(parsed.expires_on.as_deref(), parsed.expires_on_epoch),
            token: parsed.access_token,
        })
    }
}

/// Fixed token, for tests and pre-fetched tokens
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.0.clone(),
            expires_at: None,
        })
    }
}

/// Pick the environment service principal when configured, else the Azure CLI
pub fn default_token_source(
    authority_host: &str,
    management_endpoint: &str,
    http: ArmHttpClient,
) -> Arc<dyn TokenSource> {
    match ClientSecretCredential::from_env(authority_host, management_endpoint, http) {
        Some(credential) => {
            tracing::info!("Using service principal credentials from environment");
            Arc::new(credential)
        }
        None => {
            tracing::info!("Using Azure CLI credentials");
            Arc::new(AzureCliCredential::new(management_endpoint))
        }
    }
}

/// Azure credentials holder with token caching
#[derive(Clone)]
pub struct ArmCredentials {
    source: Arc<dyn TokenSource>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl ArmCredentials {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    /// Checks token expiry before returning cached token; concurrent callers
    /// wait on the write lock so only one of them fetches
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let mut cache = self.token_cache.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(cached) = cache.as_ref().filter(|c| c.is_valid()) {
            return Ok(cached.token.clone());
        }

        let token = self
            .source
            .fetch_token()
            .await
            .with_context(|| format!("Failed to get access token from {}", self.source.name()))?;

        let ttl = token
            .expires_at
            .and_then(|at| (at - Utc::now()).to_std().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        *cache = Some(CachedToken {
            token: token.token.clone(),
            expires_at,
        });
        drop(cache);

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token.token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        lifetime: chrono::Duration,
        delay: Duration,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_token(&self) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(AccessToken {
                token: format!("token-{}", n),
                expires_at: Some(Utc::now() + self.lifetime),
            })
        }
    }

    #[tokio::test]
    async fn test_token_is_cached_until_expiry() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            lifetime: chrono::Duration::hours(1),
            delay: Duration::ZERO,
        });
        let credentials = ArmCredentials::new(source.clone());

        assert_eq!(credentials.get_token().await.unwrap(), "token-0");
        assert_eq!(credentials.get_token().await.unwrap(), "token-0");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        assert_eq!(credentials.refresh_token().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn test_token_inside_buffer_is_refetched() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            lifetime: chrono::Duration::seconds(30),
            delay: Duration::ZERO,
        });
        let credentials = ArmCredentials::new(source.clone());

        credentials.get_token().await.unwrap();
        credentials.get_token().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            lifetime: chrono::Duration::hours(1),
            delay: Duration::from_millis(50),
        });
        let credentials = ArmCredentials::new(source.clone());

        let (a, b, c, d) = tokio::join!(
            credentials.get_token(),
            credentials.get_token(),
            credentials.get_token(),
            credentials.get_token()
        );
        for token in [a, b, c, d] {
            assert_eq!(token.unwrap(), "token-0");
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_cli_expiry_prefers_epoch() {
        let parsed = parse_cli_expiry(Some("2000-01-01 00:00:00.000000"), Some(1_700_000_000));
        assert_eq!(parsed.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_cli_expiry_local_time() {
        assert!(parse_cli_expiry(Some("2030-05-01 13:45:10.123456"), None).is_some());
        assert!(parse_cli_expiry(Some("not a date"), None).is_none());
        assert!(parse_cli_expiry(None, None).is_none());
    }

    #[test]
    fn test_client_secret_token_url() {
        let credential = ClientSecretCredential::new(
            "tenant",
            "client",
            "secret",
            "https://login.example.com/",
            "https://management.azure.com",
            ArmHttpClient::new().unwrap(),
        );
        assert_eq!(
            credential.token_url(),
            "https://login.example.com/tenant/oauth2/v2.0/token"
        );
        assert_eq!(credential.scope, "https://management.azure.com/.default");
    }
}
