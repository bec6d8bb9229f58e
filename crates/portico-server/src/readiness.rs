//! Tenant directory readiness probe
//!
//! `/readyz` answers synchronously, so a background task pings the
//! directory on an interval and the checker reports the last observed
//! state. Any lookup that gets an answer counts as reachable; "domain
//! not found" still means the directory is healthy.

use portico_core::TenantDirectory;
use portico_observability::{DependencyStatus, ReadinessChecker};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

/// Probe domain. Never registered; a working directory answers
/// "not found", which is all the probe needs.
const PROBE_DOMAIN: &str = "readiness-probe.invalid";

/// Readiness checker backed by periodic directory lookups.
pub struct DirectoryReadiness {
    ready: AtomicBool,
    detail: RwLock<Option<String>>,
}

impl DirectoryReadiness {
    /// Start probing the directory every `interval`.
    ///
    /// The checker starts out ready so a slow first probe does not fail
    /// readiness checks during startup.
    pub fn start(directory: Arc<dyn TenantDirectory>, interval: Duration) -> Arc<Self> {
        let checker = Arc::new(Self {
            ready: AtomicBool::new(true),
            detail: RwLock::new(None),
        });

        let probe = checker.clone();
        tokio::spawn(async move {
            loop {
                match directory.lookup(PROBE_DOMAIN).await {
                    Ok(_) => probe.mark_ready(),
                    Err(e) => probe.mark_unready(e.to_string()),
                }
                tokio::time::sleep(interval).await;
            }
        });

        checker
    }

    fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::Relaxed) {
            info!("Tenant directory reachable again");
        }
        *self
            .detail
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn mark_unready(&self, detail: String) {
        if self.ready.swap(false, Ordering::Relaxed) {
            warn!("Tenant directory unreachable: {}", detail);
        }
        *self
            .detail
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(detail);
    }
}

impl ReadinessChecker for DirectoryReadiness {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    fn dependency_statuses(&self) -> Vec<DependencyStatus> {
        let ready = self.is_ready();
        vec![DependencyStatus {
            name: "tenant-directory".to_string(),
            status: if ready { "reachable" } else { "unreachable" }.to_string(),
            detail: self
                .detail
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
        }]
    }
}
