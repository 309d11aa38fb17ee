//! ARM Client
//!
//! Main client for interacting with Azure Resource Manager, combining
//! authentication and HTTP functionality.

use super::auth::{ArmCredentials, TokenSource};
use super::http::{ArmError, ArmHttpClient};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Public cloud management endpoint
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// One page of a list response
pub struct Page {
    pub items: Vec<Value>,
    pub next_link: Option<String>,
}

/// Main ARM client
#[derive(Clone)]
pub struct ArmClient {
    credentials: ArmCredentials,
    http: ArmHttpClient,
    endpoint: String,
}

impl ArmClient {
    /// Create a new ARM client
    pub fn new(source: Arc<dyn TokenSource>, endpoint: &str) -> Result<Self, ArmError> {
        Ok(Self {
            credentials: ArmCredentials::new(source),
            http: ArmHttpClient::new()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a full URL for an ARM path such as `/subscriptions/x/...`
    pub fn url(&self, path: &str, api_version: &str, filter: Option<&str>) -> Result<String, ArmError> {
        let mut url = Url::parse(&format!("{}{}", self.endpoint, path))
            .map_err(|e| ArmError::InvalidUrl(format!("{}: {}", path, e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", api_version);
            if let Some(filter) = filter {
                pairs.append_pair("$filter", filter);
            }
        }
        Ok(url.to_string())
    }

    /// Make a GET request with a bearer token. A 401 drops the cached token
    /// and retries once with a fresh one.
    pub async fn get(&self, url: &str) -> Result<Value, ArmError> {
        let token = self.credentials.get_token().await.map_err(ArmError::Auth)?;
        match self.http.get(url, &token).await {
            Err(err) if err.status() == Some(StatusCode::UNAUTHORIZED) => {
                tracing::debug!("token rejected, refreshing and retrying {}", url);
                let token = self.credentials.refresh_token().await.map_err(ArmError::Auth)?;
                self.http.get(url, &token).await
            }
            result => result,
        }
    }

    /// Fetch a single resource
    pub async fn get_resource(&self, path: &str, api_version: &str) -> Result<Value, ArmError> {
        let url = self.url(path, api_version, None)?;
        self.get(&url).await
    }

    /// Fetch one page of a list response
    pub async fn list_page(&self, url: &str) -> Result<Page, ArmError> {
        let response = self.get(url).await?;

        let items = response
            .get("value")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let next_link = response
            .get("nextLink")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(Page { items, next_link })
    }

    /// Fetch all resources of a collection (auto-paginate)
    pub async fn list_resources(
        &self,
        path: &str,
        api_version: &str,
        filter: Option<&str>,
    ) -> Result<Vec<Value>, ArmError> {
        let mut all_items = Vec::new();
        let mut seen_links = HashSet::new();
        let mut url = self.url(path, api_version, filter)?;
        let mut pages = 0;

        loop {
            let page = self.list_page(&url).await?;
            pages += 1;
            all_items.extend(page.items);

            let Some(next) = page.next_link else {
                break;
            };
            if !seen_links.insert(next.clone()) {
                return Err(ArmError::PaginationLoop(next));
            }
            url = next;
        }

        tracing::debug!(
            "Listed {} items from {} in {} page(s)",
            all_items.len(),
            path,
            pages
        );

        Ok(all_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::auth::StaticToken;

    fn client() -> ArmClient {
        ArmClient::new(
            Arc::new(StaticToken("t".to_string())),
            "https://management.azure.com/",
        )
        .unwrap()
    }

    #[test]
    fn test_url_adds_api_version() {
        let url = client()
            .url(
                "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/disks",
                "2023-10-02",
                None,
            )
            .unwrap();
        assert_eq!(
            url,
            "https://management.azure.com/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/disks?api-version=2023-10-02"
        );
    }

    #[test]
    fn test_url_adds_filter() {
        let url = client()
            .url(
                "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Authorization/roleAssignments",
                "2022-04-01",
                Some("atScope()"),
            )
            .unwrap();
        assert!(url.contains("api-version=2022-04-01"));
        assert!(url.contains("%24filter=atScope%28%29"));
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        assert_eq!(client().endpoint(), "https://management.azure.com");
    }
}
