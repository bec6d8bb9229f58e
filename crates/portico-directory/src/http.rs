//! HTTP tenant directory client
//!
//! Looks tenants up against the platform's directory service. One GET
//! per lookup with a tight timeout; there are no retries here because a
//! failed lookup degrades to "no tenant" at the edge rather than
//! failing the request.

use async_trait::async_trait;
use portico_core::{Error, Result, TenantDirectory, TenantSite};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Default lookup timeout. Kept tight so a slow directory degrades the
/// request instead of hanging it.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Directory client over the `/v1/tenants/lookup` endpoint.
pub struct HttpTenantDirectory {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTenantDirectory {
    /// Create a client for a directory service base URL.
    ///
    /// # Errors
    /// - `Error::Directory` if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Directory(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Authenticate lookups with an API key header.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl TenantDirectory for HttpTenantDirectory {
    async fn lookup(&self, domain: &str) -> Result<Option<TenantSite>> {
        let url = format!("{}/v1/tenants/lookup", self.base_url);
        let mut request = self.client.get(&url).query(&[("domain", domain)]);
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Directory(format!("Tenant lookup request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(domain = %domain, "no tenant registered for domain");
                Ok(None)
            }
            status if status.is_success() => {
                let site = response
                    .json::<TenantSite>()
                    .await
                    .map_err(|e| Error::Directory(format!("Invalid tenant payload: {}", e)))?;
                debug!(domain = %domain, tenant = %site.name, "tenant resolved");
                Ok(Some(site))
            }
            status => Err(Error::Directory(format!(
                "Tenant lookup returned status {}",
                status
            ))),
        }
    }
}
