//! Edge routing decision table
//!
//! Pure evaluation of the per-request routing outcome. The base table
//! runs in strict order with the first applicable rule winning:
//!
//! 1. Enforcement-bypassed path: allow untouched.
//! 2. Tenant resolved and the path is a known app route the archetype's
//!    policy does not allow: redirect to the tenant root.
//! 3. Tenant resolved and the path is potential site content: allow
//!    with the CMS fallback flag set.
//! 4. No tenant resolved: allow with empty tenant context.
//!
//! A session overlay is evaluated independently and takes precedence
//! over the base outcome: an apparent session on an auth-entry path
//! redirects to the authenticated home, and a missing session on a
//! protected path redirects to the sign-in entry for that prefix with
//! the original path carried as a `next` parameter.
//!
//! The table holds no per-request state and never fails. A path the
//! policy does not cover produces a redirect, never an error.

use portico_core::TenantSite;
use tracing::debug;

use crate::classifier::{AppPathClassifier, under_prefix};
use crate::policy::PolicyTable;

/// Paths where a visitor signs in or up. An apparent session here
/// redirects to [`AUTHED_HOME`] instead of rendering the form.
const AUTH_ENTRY_PREFIXES: &[&str] = &["/login", "/signup", "/admin/login"];

/// Prefixes that expect an apparent session. The auth entries above are
/// carved out so the sign-in pages themselves stay reachable.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/admin"];

/// Landing route for visitors who already appear signed in.
pub const AUTHED_HOME: &str = "/dashboard";

/// Which redirect target a decision picked. The label feeds logs and
/// metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// Known app route the archetype does not allow.
    TenantRoot,
    /// Protected path without an apparent session.
    SignIn,
    /// Protected admin path without an apparent session.
    TenantAdminSignIn,
    /// Auth-entry path with an apparent session.
    AuthedHome,
}

impl RedirectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenantRoot => "tenant_root",
            Self::SignIn => "sign_in",
            Self::TenantAdminSignIn => "tenant_admin_sign_in",
            Self::AuthedHome => "authed_home",
        }
    }
}

impl std::fmt::Display for RedirectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one decision-table evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Let the request through. `cms_fallback` marks paths the
    /// downstream tenant-content resolver should attempt.
    Allow { cms_fallback: bool },
    /// Send the visitor elsewhere.
    Redirect { location: String, kind: RedirectKind },
}

impl RouteOutcome {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// The CMS fallback flag, false for redirects.
    pub fn cms_fallback(&self) -> bool {
        matches!(self, Self::Allow { cms_fallback: true })
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Allow { cms_fallback: true } => "allow_cms_fallback",
            Self::Allow { cms_fallback: false } => "allow",
            Self::Redirect { kind, .. } => kind.as_str(),
        }
    }
}

/// Everything one evaluation looks at. The table only cares whether a
/// session appears to exist, never what it claims.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    /// Request path, without query string.
    pub path: &'a str,
    /// Tenant resolved for the request host, if any.
    pub tenant: Option<&'a TenantSite>,
    /// Whether an unexpired session hint was decoded from the cookies.
    pub session_present: bool,
}

/// The edge decision table: route policies plus the path classifier.
///
/// Built once at startup and shared across requests. Evaluation is a
/// pure function of the input.
#[derive(Debug, Clone)]
pub struct DecisionTable {
    policies: PolicyTable,
    classifier: AppPathClassifier,
}

impl DecisionTable {
    pub fn new(policies: PolicyTable, classifier: AppPathClassifier) -> Self {
        Self {
            policies,
            classifier,
        }
    }

    /// Table over the platform's built-in policies and URL surface.
    pub fn platform() -> Self {
        Self::new(PolicyTable::builtin(), AppPathClassifier::platform())
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn classifier(&self) -> &AppPathClassifier {
        &self.classifier
    }

    /// Evaluates the table for one request.
    pub fn decide(&self, input: &DecisionInput<'_>) -> RouteOutcome {
        if let Some(outcome) = self.session_overlay(input) {
            return outcome;
        }
        self.base_outcome(input)
    }

    /// The session overlay. Fires independently of tenant resolution
    /// and wins over the base table when it fires.
    fn session_overlay(&self, input: &DecisionInput<'_>) -> Option<RouteOutcome> {
        if input.session_present {
            if is_auth_entry(input.path) {
                debug!(path = %input.path, "session present on auth entry, redirecting home");
                return Some(RouteOutcome::Redirect {
                    location: AUTHED_HOME.to_string(),
                    kind: RedirectKind::AuthedHome,
                });
            }
            return None;
        }
        if is_protected(input.path) {
            let (location, kind) = sign_in_for(input.path);
            debug!(path = %input.path, target = %location, "no session on protected path");
            return Some(RouteOutcome::Redirect { location, kind });
        }
        None
    }

    fn base_outcome(&self, input: &DecisionInput<'_>) -> RouteOutcome {
        let path = input.path;

        // Rule 1: infrastructure and auth machinery is never gated.
        if self.classifier.is_enforcement_bypassed(path) {
            debug!(path = %path, rule = 1, "enforcement bypassed");
            return RouteOutcome::Allow {
                cms_fallback: false,
            };
        }

        let Some(tenant) = input.tenant else {
            // Rule 4: no tenant, serve the global fallback surface.
            debug!(path = %path, rule = 4, "no tenant resolved");
            return RouteOutcome::Allow {
                cms_fallback: false,
            };
        };

        // Rule 3: unknown paths on a tenant domain go to the CMS.
        if self.classifier.is_potential_site_content(path) {
            debug!(
                path = %path,
                tenant = %tenant.domain,
                rule = 3,
                "potential site content"
            );
            return RouteOutcome::Allow { cms_fallback: true };
        }

        // Rule 2: known app route, gated by the archetype's policy.
        if self.policies.allows(tenant.archetype, path) {
            return RouteOutcome::Allow {
                cms_fallback: false,
            };
        }
        debug!(
            path = %path,
            tenant = %tenant.domain,
            archetype = %tenant.archetype,
            rule = 2,
            "route not in archetype policy, redirecting to tenant root"
        );
        RouteOutcome::Redirect {
            location: "/".to_string(),
            kind: RedirectKind::TenantRoot,
        }
    }
}

impl Default for DecisionTable {
    fn default() -> Self {
        Self::platform()
    }
}

fn is_auth_entry(path: &str) -> bool {
    AUTH_ENTRY_PREFIXES.iter().any(|p| under_prefix(path, p))
}

fn is_protected(path: &str) -> bool {
    !is_auth_entry(path) && PROTECTED_PREFIXES.iter().any(|p| under_prefix(path, p))
}

/// Sign-in entry for a protected path, keeping admin traffic on the
/// admin sign-in form. The original path rides along as `next`.
fn sign_in_for(path: &str) -> (String, RedirectKind) {
    if under_prefix(path, "/admin") {
        (
            format!("/admin/login?next={}", urlencoding::encode(path)),
            RedirectKind::TenantAdminSignIn,
        )
    } else {
        (
            format!("/login?next={}", urlencoding::encode(path)),
            RedirectKind::SignIn,
        )
    }
}
