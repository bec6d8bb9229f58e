//! Per-archetype route policies
//!
//! Each site archetype carries a fixed set of route patterns describing
//! the app-rendered pages that archetype is allowed to serve. The table
//! is built once at startup; lookups borrow the compiled patterns.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use portico_core::SiteArchetype;
use tracing::debug;

use crate::pattern::{RoutePattern, any_match};

/// The built-in policy table shared by every edge worker.
static BUILTIN: Lazy<PolicyTable> = Lazy::new(PolicyTable::builtin);

/// Maps each [`SiteArchetype`] to its allowed route patterns.
///
/// The directory policy is the widest set and doubles as the fallback:
/// an archetype with no entry is treated as a directory site rather
/// than locked out. Policy gating is a routing concern, not a security
/// boundary, so the table fails open.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: HashMap<SiteArchetype, Vec<RoutePattern>>,
}

impl PolicyTable {
    /// An empty table. Every lookup falls back to no patterns.
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    /// The default policy set for the platform's four archetypes.
    pub fn builtin() -> Self {
        Self::new()
            .with_policy(
                SiteArchetype::Directory,
                &[
                    "/",
                    "/about",
                    "/contact",
                    "/search",
                    "/businesses",
                    "/businesses/[slug]",
                    "/places",
                    "/places/[slug]",
                    "/categories",
                    "/categories/[slug]",
                ],
            )
            .with_policy(SiteArchetype::Landing, &["/", "/about", "/contact"])
            .with_policy(
                SiteArchetype::Service,
                &[
                    "/",
                    "/about",
                    "/contact",
                    "/services",
                    "/services/[slug]",
                    "/booking",
                ],
            )
            .with_policy(SiteArchetype::Static, &["/"])
    }

    /// The shared built-in table.
    pub fn shared() -> &'static Self {
        &BUILTIN
    }

    /// Adds or replaces the policy for one archetype.
    pub fn with_policy(mut self, archetype: SiteArchetype, patterns: &[&str]) -> Self {
        let compiled = patterns.iter().map(|p| RoutePattern::compile(p)).collect();
        self.policies.insert(archetype, compiled);
        self
    }

    /// Returns the patterns for an archetype.
    ///
    /// Falls back to the directory policy when the archetype has no
    /// entry, and to an empty slice when neither is configured.
    pub fn patterns_for(&self, archetype: SiteArchetype) -> &[RoutePattern] {
        if let Some(patterns) = self.policies.get(&archetype) {
            return patterns;
        }
        debug!(
            archetype = %archetype,
            "no route policy for archetype, falling back to directory policy"
        );
        self.policies
            .get(&SiteArchetype::Directory)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the archetype's policy allows the given request path.
    pub fn allows(&self, archetype: SiteArchetype, path: &str) -> bool {
        any_match(self.patterns_for(archetype), path)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::builtin()
    }
}
