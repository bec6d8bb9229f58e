//! TTL cache in front of a tenant directory
//!
//! The cache object is injected explicitly wherever lookups happen;
//! there is no process-wide singleton. Entries are replaced wholesale,
//! never mutated in place, so concurrent readers always see a complete
//! record. Lookup errors are never cached: the next request gets to
//! retry the directory.

use async_trait::async_trait;
use dashmap::DashMap;
use portico_core::{Result, TenantDirectory, TenantSite};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[cfg(feature = "metrics")]
use portico_observability::metrics::Metrics;

/// Cache tuning for [`CachedDirectory`].
#[derive(Debug, Clone)]
pub struct DirectoryCacheConfig {
    /// How long a found tenant stays cached.
    pub ttl: Duration,
    /// How long a not-found result stays cached. Shorter than `ttl` so
    /// newly registered domains come live quickly.
    pub negative_ttl: Duration,
    /// Upper bound on cached domains.
    pub max_entries: usize,
}

impl Default for DirectoryCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            negative_ttl: Duration::from_secs(10),
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    site: Option<TenantSite>,
    expires_at: Instant,
}

/// Caching wrapper around any [`TenantDirectory`].
pub struct CachedDirectory {
    inner: Arc<dyn TenantDirectory>,
    entries: DashMap<String, CacheEntry>,
    config: DirectoryCacheConfig,
    #[cfg(feature = "metrics")]
    metrics: Option<Arc<Metrics>>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn TenantDirectory>, config: DirectoryCacheConfig) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            config,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Record cache hits and misses on the given collector.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of cached domains, expired entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop one domain from the cache.
    pub fn invalidate(&self, domain: &str) {
        self.entries.remove(domain);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn record_hit(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_cache_hit();
        }
    }

    fn record_miss(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_cache_miss();
        }
    }

    /// Returns the cached result for a domain if it is still fresh,
    /// evicting it when expired.
    fn fresh_entry(&self, domain: &str, now: Instant) -> Option<Option<TenantSite>> {
        {
            let entry = self.entries.get(domain)?;
            if entry.expires_at > now {
                return Some(entry.site.clone());
            }
        }
        // Expired. Evict unless a concurrent writer already stored a
        // fresh replacement.
        self.entries.remove_if(domain, |_, entry| entry.expires_at <= now);
        None
    }

    fn store(&self, domain: &str, site: Option<TenantSite>, now: Instant) {
        if self.entries.len() >= self.config.max_entries {
            self.entries.retain(|_, entry| entry.expires_at > now);
            if self.entries.len() >= self.config.max_entries {
                debug!(domain = %domain, "tenant cache at capacity, skipping insert");
                return;
            }
        }

        let ttl = if site.is_some() {
            self.config.ttl
        } else {
            self.config.negative_ttl
        };
        self.entries.insert(
            domain.to_string(),
            CacheEntry {
                site,
                expires_at: now + ttl,
            },
        );
    }
}

#[async_trait]
impl TenantDirectory for CachedDirectory {
    async fn lookup(&self, domain: &str) -> Result<Option<TenantSite>> {
        let now = Instant::now();

        if let Some(site) = self.fresh_entry(domain, now) {
            debug!(domain = %domain, "tenant cache hit");
            self.record_hit();
            return Ok(site);
        }
        self.record_miss();

        let site = self.inner.lookup(domain).await?;
        self.store(domain, site.clone(), now);
        Ok(site)
    }
}
