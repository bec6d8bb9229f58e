//! Per-request resolved routing context
//!
//! `ResolvedContext` is constructed exactly once per request by the edge
//! orchestrator and propagated read-only to downstream handlers. Downstream
//! consumers treat its contents as routing hints, not verified claims.

use serde::{Deserialize, Serialize};

use crate::session::SessionHint;
use crate::tenant::{TenantId, TenantSite};

/// The routing context resolved for one inbound request.
///
/// Immutable after construction: the orchestrator builds it from the
/// directory lookup, path classification, and session decode, then hands it
/// downstream without further writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedContext {
    /// Owning tenant, if the request's domain resolved to one
    pub tenant: Option<TenantSite>,
    /// Whether the path fell through to the tenant-content resolver
    pub cms_fallback: bool,
    /// Unverified session presence signal, if one decoded
    pub session: Option<SessionHint>,
}

impl ResolvedContext {
    /// Context for a request whose domain resolved to no tenant.
    pub fn anonymous() -> Self {
        Self {
            tenant: None,
            cms_fallback: false,
            session: None,
        }
    }

    /// Build a context for a resolved tenant.
    pub fn for_tenant(tenant: TenantSite) -> Self {
        Self {
            tenant: Some(tenant),
            cms_fallback: false,
            session: None,
        }
    }

    /// Set the CMS fallback flag
    pub fn with_cms_fallback(mut self, cms_fallback: bool) -> Self {
        self.cms_fallback = cms_fallback;
        self
    }

    /// Attach a decoded session hint
    pub fn with_session(mut self, session: Option<SessionHint>) -> Self {
        self.session = session;
        self
    }

    /// The resolved tenant's ID, if any
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant.as_ref().map(|t| t.id)
    }

    /// The resolved tenant's normalized domain, if any
    pub fn tenant_domain(&self) -> Option<&str> {
        self.tenant.as_ref().map(|t| t.domain.as_str())
    }
}
