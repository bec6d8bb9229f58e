//! Tenant directory lookup trait
//!
//! The `TenantDirectory` trait abstracts the external tenant directory
//! service. Implementations live in `portico-directory`:
//! - `HttpTenantDirectory`: lookup against the directory HTTP API
//! - `FileTenantDirectory`: file-backed snapshot for dev/small deployments
//! - `CachedDirectory`: injected TTL cache wrapping either of the above

use async_trait::async_trait;
use tracing::warn;

use crate::tenant::{TenantSite, normalize_domain};
use crate::Result;

/// Read-only lookup into the external tenant directory.
///
/// # Example
/// ```no_run
/// # use portico_core::directory::TenantDirectory;
/// # async fn example(directory: &dyn TenantDirectory) -> portico_core::Result<()> {
/// let site = directory.lookup("example.com").await?;
/// if let Some(site) = site {
///     println!("{} is a {} site", site.domain, site.archetype);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Look up the tenant registered for a normalized domain.
    ///
    /// # Arguments
    /// * `domain` - Already-normalized domain (see [`normalize_domain`])
    ///
    /// # Returns
    /// `Ok(None)` when no tenant is registered for the domain.
    ///
    /// # Errors
    /// - `Error::Directory` for malformed directory responses
    /// - `Error::DirectoryUnavailable` for transport failures/timeouts
    async fn lookup(&self, domain: &str) -> Result<Option<TenantSite>>;
}

/// Resolve the tenant for a raw Host header value, degrading to `None`.
///
/// Normalizes the host and performs exactly one lookup. Every lookup error
/// is swallowed: a slow or failed directory degrades the request to "no
/// tenant" rather than failing it. No retries.
pub async fn resolve_tenant(
    directory: &dyn TenantDirectory,
    raw_host: &str,
) -> Option<TenantSite> {
    let domain = normalize_domain(raw_host);
    if domain.is_empty() {
        return None;
    }

    match directory.lookup(&domain).await {
        Ok(site) => site,
        Err(e) => {
            warn!(domain = %domain, error = %e, "tenant lookup failed, continuing without tenant");
            None
        }
    }
}
