//! Request path classification
//!
//! Separates the platform's own URL surface from paths that may belong
//! to tenant site content. Two tiers:
//!
//! - Enforcement-bypass prefixes: infrastructure and auth machinery the
//!   edge must never gate or rewrite (`/api`, `/static`, ...).
//! - Core app sections: first-party application pages (`/dashboard`,
//!   `/businesses`, ...) that route policies apply to.
//!
//! Anything outside both tiers is potential site content and falls
//! through to the CMS when a tenant is attached.

use once_cell::sync::Lazy;

/// Prefixes exempt from all edge gating.
const BYPASS_PREFIXES: &[&str] = &[
    "/api",
    "/auth",
    "/login",
    "/signup",
    "/admin",
    "/static",
    "/assets",
    "/favicon.ico",
];

/// First-party app sections subject to route policies.
const APP_PREFIXES: &[&str] = &[
    "/dashboard",
    "/account",
    "/businesses",
    "/places",
    "/categories",
    "/search",
];

static PLATFORM: Lazy<AppPathClassifier> = Lazy::new(AppPathClassifier::platform);

/// Matches a path against a prefix, counting the prefix itself and any
/// nested path under it (`/api` matches `/api` and `/api/v1/health`,
/// never `/apiary`).
pub(crate) fn under_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Two-tier classifier over the platform's URL surface.
#[derive(Debug, Clone)]
pub struct AppPathClassifier {
    bypass_prefixes: Vec<String>,
    app_prefixes: Vec<String>,
}

impl AppPathClassifier {
    /// The classifier for the platform's built-in URL surface.
    pub fn platform() -> Self {
        Self::with_prefixes(BYPASS_PREFIXES, APP_PREFIXES)
    }

    /// Builds a classifier from explicit prefix sets.
    pub fn with_prefixes(bypass: &[&str], app: &[&str]) -> Self {
        Self {
            bypass_prefixes: bypass.iter().map(|p| p.to_string()).collect(),
            app_prefixes: app.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The shared platform classifier.
    pub fn shared() -> &'static Self {
        &PLATFORM
    }

    /// Whether the path sits under an enforcement-bypass prefix.
    pub fn is_enforcement_bypassed(&self, path: &str) -> bool {
        self.bypass_prefixes.iter().any(|p| under_prefix(path, p))
    }

    /// Whether the path belongs to the platform's known URL surface,
    /// in either tier.
    pub fn is_known_app_path(&self, path: &str) -> bool {
        self.is_enforcement_bypassed(path)
            || self.app_prefixes.iter().any(|p| under_prefix(path, p))
    }

    /// Whether the path may be tenant site content.
    ///
    /// True exactly when the path is outside both tiers. The root path
    /// `/` is deliberately not listed as a prefix, so a tenant's home
    /// page rides the CMS fallback like any other tenant-authored path.
    pub fn is_potential_site_content(&self, path: &str) -> bool {
        !self.is_known_app_path(path)
    }
}

impl Default for AppPathClassifier {
    fn default() -> Self {
        Self::platform()
    }
}
