//! Tenant site model and domain normalization
//!
//! A `TenantSite` is one configured customer site on the shared platform,
//! reachable via its registered domain. The record is sourced from the
//! external tenant directory and is immutable for the lifetime of a request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Unique identifier for a tenant site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Create a new random tenant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a tenant ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a tenant ID from a string
    pub fn from_string(s: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(s)
            .map_err(|e| Error::InvalidTenant(format!("Invalid tenant ID format: {}", e)))?;
        Ok(Self(uuid))
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

/// Structural category of a tenant site.
///
/// The archetype governs which routes are reachable (see the per-archetype
/// route policies in `portico-routing`) and which template bindings apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteArchetype {
    /// Full business directory with listing and detail pages
    Directory,
    /// Single-product landing site
    Landing,
    /// Service-business site with service pages and booking
    Service,
    /// Single static page
    Static,
}

impl fmt::Display for SiteArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SiteArchetype::Directory => "directory",
            SiteArchetype::Landing => "landing",
            SiteArchetype::Service => "service",
            SiteArchetype::Static => "static",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle status of a tenant site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Pending,
}

impl Default for TenantStatus {
    fn default() -> Self {
        TenantStatus::Active
    }
}

/// One configured tenant site, keyed by normalized domain.
///
/// Read-only from the edge's perspective: the record is owned by the tenant
/// directory service and this core never writes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSite {
    /// Directory-assigned identifier, generated when the source record
    /// omits one (hand-authored tenant files)
    #[serde(default)]
    pub id: TenantId,
    /// Registered domain, unique after normalization
    pub domain: String,
    /// Display name
    pub name: String,
    /// Site archetype
    pub archetype: SiteArchetype,
    /// Template binding name (resolved by `portico-templates`, with a
    /// baseline fallback when unrecognized)
    #[serde(default)]
    pub template_name: String,
    /// Opaque theme configuration passed through to the renderer
    #[serde(default)]
    pub theme: serde_json::Value,
    /// Lifecycle status
    #[serde(default)]
    pub status: TenantStatus,
}

impl TenantSite {
    /// Create an active site with a fresh id and no template or theme.
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        archetype: SiteArchetype,
    ) -> Self {
        Self {
            id: TenantId::new(),
            domain: domain.into(),
            name: name.into(),
            archetype,
            template_name: String::new(),
            theme: serde_json::Value::Null,
            status: TenantStatus::Active,
        }
    }

    /// Set the template binding name
    pub fn with_template(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = template_name.into();
        self
    }

    /// Set the theme configuration
    pub fn with_theme(mut self, theme: serde_json::Value) -> Self {
        self.theme = theme;
        self
    }

    /// Set the lifecycle status
    pub fn with_status(mut self, status: TenantStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the site should be served at all
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

/// Normalize an inbound Host header value to the directory's domain key.
///
/// Lowercases, strips a `:port` suffix, and strips one leading `www.`.
/// Idempotent: `normalize_domain(normalize_domain(h)) == normalize_domain(h)`.
pub fn normalize_domain(raw_host: &str) -> String {
    let host = raw_host.trim().to_ascii_lowercase();

    // Host headers may carry a port ("example.com:8443")
    let host = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host.as_str(),
    };

    host.strip_prefix("www.").unwrap_or(host).to_string()
}
