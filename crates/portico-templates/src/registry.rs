//! Template registry and resolution
//!
//! The registry maps template names to bindings. Tenants reference a
//! template by name; an unrecognized or empty name falls back to the
//! baseline binding so tenants created before explicit template
//! configuration keep rendering.

use once_cell::sync::Lazy;
use portico_core::{SiteArchetype, TenantSite};
use std::collections::HashMap;
use tracing::debug;

use crate::binding::{ResolvedPage, TemplateBinding};
use crate::pages::page_key_for;

/// The binding every unrecognized template name falls back to.
pub const BASELINE_TEMPLATE: &str = "meridian";

static BUILTIN: Lazy<TemplateRegistry> = Lazy::new(TemplateRegistry::builtin);

const DIRECTORY_ROUTES: &[&str] = &[
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
];

const LANDING_ROUTES: &[&str] = &["/", "/about", "/contact"];

const SERVICE_ROUTES: &[&str] = &[
    "/",
    "/about",
    "/contact",
    "/services",
    "/services/[slug]",
    "/booking",
];

/// Process-lifetime template registry.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    bindings: HashMap<String, TemplateBinding>,
}

impl TemplateRegistry {
    /// An empty registry. Every resolution fails until bindings are
    /// registered, including the baseline.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// The platform's shipped bindings.
    pub fn builtin() -> Self {
        Self::new()
            .register(
                TemplateBinding::new(BASELINE_TEMPLATE, SiteArchetype::Directory)
                    .with_routes(DIRECTORY_ROUTES)
                    .with_component("home", "MeridianHome")
                    .with_component("about", "MeridianAbout")
                    .with_component("contact", "MeridianContact")
                    .with_component("search", "MeridianSearch")
                    .with_component("business-index", "MeridianBusinessIndex")
                    .with_component("business-detail", "MeridianBusinessDetail")
                    .with_component("place-index", "MeridianPlaceIndex")
                    .with_component("place-detail", "MeridianPlaceDetail")
                    .with_component("category-index", "MeridianCategoryIndex")
                    .with_feature("search", true)
                    .with_feature("map", false),
            )
            .register(
                TemplateBinding::new("harbor", SiteArchetype::Directory)
                    .with_routes(DIRECTORY_ROUTES)
                    .with_component("home", "HarborHome")
                    .with_component("about", "HarborAbout")
                    .with_component("contact", "HarborContact")
                    .with_component("search", "HarborSearch")
                    .with_component("business-index", "HarborBusinessIndex")
                    .with_component("business-detail", "HarborBusinessDetail")
                    .with_component("place-index", "HarborPlaceIndex")
                    .with_component("place-detail", "HarborPlaceDetail")
                    .with_component("category-index", "HarborCategoryIndex")
                    .with_feature("search", true)
                    .with_feature("map", true),
            )
            .register(
                TemplateBinding::new("launchpad", SiteArchetype::Landing)
                    .with_routes(LANDING_ROUTES)
                    .with_component("home", "LaunchpadHome")
                    .with_component("about", "LaunchpadAbout")
                    .with_component("contact", "LaunchpadContact")
                    .with_feature("newsletter", true),
            )
            .register(
                TemplateBinding::new("atelier", SiteArchetype::Service)
                    .with_routes(SERVICE_ROUTES)
                    .with_component("home", "AtelierHome")
                    .with_component("about", "AtelierAbout")
                    .with_component("contact", "AtelierContact")
                    .with_component("service-index", "AtelierServiceIndex")
                    .with_component("booking", "AtelierBooking")
                    .with_feature("online-booking", true),
            )
            .register(
                TemplateBinding::new("placard", SiteArchetype::Static)
                    .with_routes(&["/"])
                    .with_component("home", "PlacardHome"),
            )
    }

    /// The shared built-in registry.
    pub fn shared() -> &'static Self {
        &BUILTIN
    }

    /// Adds or replaces a binding under its own name.
    pub fn register(mut self, binding: TemplateBinding) -> Self {
        self.bindings.insert(binding.name().to_string(), binding);
        self
    }

    /// Looks up a binding by name, falling back to the baseline.
    ///
    /// `None` only when the baseline itself is unregistered, which the
    /// built-in registry never is.
    pub fn binding(&self, name: &str) -> Option<&TemplateBinding> {
        if let Some(binding) = self.bindings.get(name) {
            return Some(binding);
        }
        if !name.is_empty() {
            debug!(template = %name, "unknown template name, using baseline binding");
        }
        self.bindings.get(BASELINE_TEMPLATE)
    }

    /// The binding serving a tenant, honoring the baseline fallback.
    pub fn binding_for(&self, tenant: &TenantSite) -> Option<&TemplateBinding> {
        self.binding(&tenant.template_name)
    }

    /// Resolves the renderable page for a path under a tenant's binding.
    ///
    /// `None` means the template cannot serve the path (not covered by
    /// its routes, no logical page key, or no component registered for
    /// the key) and the caller should use the legacy render path.
    pub fn resolve(&self, path: &str, tenant: &TenantSite) -> Option<ResolvedPage> {
        let binding = self.binding_for(tenant)?;
        if !binding.covers(path) {
            return None;
        }
        let page_key = page_key_for(path)?;
        let component_id = binding.component_for(page_key)?;
        Some(ResolvedPage {
            component_id: component_id.to_string(),
            page_key: page_key.to_string(),
        })
    }

    /// Pure feature-flag lookup through the tenant's binding.
    pub fn feature_enabled(&self, feature: &str, tenant: &TenantSite) -> bool {
        self.binding_for(tenant)
            .map(|binding| binding.feature(feature))
            .unwrap_or(false)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
