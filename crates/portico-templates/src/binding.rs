//! Template binding model
//!
//! A binding describes one UI template: the archetype it was designed
//! for, the routes it can render, its logical-page-to-component map,
//! and its feature flags. Bindings are defined in code and live for the
//! process lifetime.

use std::collections::HashMap;

use portico_core::SiteArchetype;
use portico_routing::{RoutePattern, any_match};
use serde::{Deserialize, Serialize};

/// The renderable page resolved for a path under some binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPage {
    /// Component registered for the page key in the tenant's binding.
    pub component_id: String,
    /// Logical page key the path mapped to.
    pub page_key: String,
}

/// One template's capabilities.
///
/// Routes use the same compiled-pattern matcher as the route policies,
/// so "reachable" and "templated" can never disagree on how a dynamic
/// segment matches.
#[derive(Debug, Clone)]
pub struct TemplateBinding {
    name: String,
    archetype: SiteArchetype,
    routes: Vec<RoutePattern>,
    components: HashMap<String, String>,
    features: HashMap<String, bool>,
}

impl TemplateBinding {
    pub fn new(name: impl Into<String>, archetype: SiteArchetype) -> Self {
        Self {
            name: name.into(),
            archetype,
            routes: Vec::new(),
            components: HashMap::new(),
            features: HashMap::new(),
        }
    }

    /// Set the routes this template can render.
    pub fn with_routes(mut self, patterns: &[&str]) -> Self {
        self.routes = patterns.iter().map(|p| RoutePattern::compile(p)).collect();
        self
    }

    /// Register the component rendering a logical page key.
    pub fn with_component(
        mut self,
        page_key: impl Into<String>,
        component_id: impl Into<String>,
    ) -> Self {
        self.components.insert(page_key.into(), component_id.into());
        self
    }

    /// Set one feature flag.
    pub fn with_feature(mut self, feature: impl Into<String>, enabled: bool) -> Self {
        self.features.insert(feature.into(), enabled);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archetype(&self) -> SiteArchetype {
        self.archetype
    }

    pub fn routes(&self) -> &[RoutePattern] {
        &self.routes
    }

    /// Whether this template can render the path at all.
    pub fn covers(&self, path: &str) -> bool {
        any_match(&self.routes, path)
    }

    /// The component registered for a page key, if any.
    pub fn component_for(&self, page_key: &str) -> Option<&str> {
        self.components.get(page_key).map(String::as_str)
    }

    /// Feature flag lookup. Unknown features are off.
    pub fn feature(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> TemplateBinding {
        TemplateBinding::new("test", SiteArchetype::Landing)
            .with_routes(&["/", "/about", "/items/[slug]"])
            .with_component("home", "TestHome")
            .with_feature("newsletter", true)
            .with_feature("map", false)
    }

    #[test]
    fn covers_uses_the_shared_matcher() {
        let b = binding();
        assert!(b.covers("/"));
        assert!(b.covers("/items/widget"));
        assert!(!b.covers("/items/widget/reviews"));
        assert!(!b.covers("/pricing"));
    }

    #[test]
    fn component_lookup() {
        let b = binding();
        assert_eq!(b.component_for("home"), Some("TestHome"));
        assert_eq!(b.component_for("about"), None);
    }

    #[test]
    fn feature_flags_default_off() {
        let b = binding();
        assert!(b.feature("newsletter"));
        assert!(!b.feature("map"));
        assert!(!b.feature("never-registered"));
    }

    #[test]
    fn resolved_page_serializes() {
        let page = ResolvedPage {
            component_id: "TestHome".to_string(),
            page_key: "home".to_string(),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["component_id"], "TestHome");
        assert_eq!(json["page_key"], "home");
    }
}
