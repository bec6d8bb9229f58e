//! Decision-table behavior through the assembled edge middleware
//!
//! Each test drives real requests through `edge_middleware` backed by a
//! directory stub, then asserts on what the downstream echo handler saw
//! in headers and extensions.

mod common;

use axum::http::StatusCode;
use common::*;
use portico_core::{SiteArchetype, TenantSite};
use portico_ingress::EdgeState;
use portico_routing::{AppPathClassifier, DecisionTable, PolicyTable};

#[tokio::test]
async fn landing_site_serves_unknown_paths_through_the_cms_fallback() {
    let site = tenant("brightsigns.test", SiteArchetype::Landing);
    let app = edge_app(EdgeState::new(StaticDirectory::with_site(site)));

    let response = send(app, "brightsigns.test", "/pricing", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("x-portico-cms-fallback").unwrap(), "true");
    assert_eq!(
        headers.get("x-portico-tenant-domain").unwrap(),
        "brightsigns.test"
    );
    assert!(headers.get("x-portico-tenant-id").is_some());
    assert_eq!(headers.get("x-test-context").unwrap(), "attached");

    // The full record rides along as JSON for the renderer.
    let record: TenantSite =
        serde_json::from_slice(headers.get("x-portico-tenant").unwrap().as_bytes()).unwrap();
    assert_eq!(record.archetype, SiteArchetype::Landing);
    assert_eq!(record.domain, "brightsigns.test");
}

#[tokio::test]
async fn service_site_redirects_foreign_app_routes_to_its_root() {
    let site = tenant("atelier-clean.test", SiteArchetype::Service);
    let app = edge_app(EdgeState::new(StaticDirectory::with_site(site)));

    for uri in ["/businesses", "/places/old-town", "/categories"] {
        let response = send(app.clone(), "atelier-clean.test", uri, None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(location(&response), "/", "{uri}");
    }
}

#[tokio::test]
async fn unknown_host_passes_through_with_empty_context() {
    let app = edge_app(EdgeState::new(StaticDirectory::empty()));

    for uri in ["/", "/about", "/search"] {
        let response = send(app.clone(), "unclaimed.test", uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let headers = response.headers();
        assert_eq!(headers.get("x-portico-cms-fallback").unwrap(), "false");
        assert!(headers.get("x-portico-tenant").is_none());
        assert!(headers.get("x-portico-tenant-domain").is_none());
        assert_eq!(headers.get("x-test-context").unwrap(), "attached");
    }
}

#[tokio::test]
async fn bypass_prefixes_skip_policy_even_for_narrow_archetypes() {
    // The static archetype's policy covers only "/", but infrastructure
    // paths are never gated.
    let site = tenant("placard.test", SiteArchetype::Static);
    let app = edge_app(EdgeState::new(StaticDirectory::with_site(site)));

    for uri in ["/api/forms/contact", "/static/app.css", "/favicon.ico"] {
        let response = send(app.clone(), "placard.test", uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let headers = response.headers();
        assert_eq!(headers.get("x-portico-cms-fallback").unwrap(), "false");
        // Tenant context still propagates on bypassed paths.
        assert_eq!(
            headers.get("x-portico-tenant-domain").unwrap(),
            "placard.test"
        );
    }
}

#[tokio::test]
async fn policy_allowed_app_routes_pass_without_cms_fallback() {
    let site = tenant("harborside.test", SiteArchetype::Directory);
    let app = edge_app(EdgeState::new(StaticDirectory::with_site(site)));

    let response = send(app, "harborside.test", "/businesses/pier-bakery", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("x-portico-cms-fallback").unwrap(), "false");
    assert_eq!(
        headers.get("x-portico-tenant-domain").unwrap(),
        "harborside.test"
    );
}

#[tokio::test]
async fn host_normalization_reaches_the_registered_tenant() {
    let site = tenant("harborside.test", SiteArchetype::Directory);
    let app = edge_app(EdgeState::new(StaticDirectory::with_site(site)));

    let response = send(app, "WWW.Harborside.TEST:8443", "/about", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-portico-tenant-domain").unwrap(),
        "harborside.test"
    );
}

#[tokio::test]
async fn deployments_can_narrow_an_archetypes_route_policy() {
    let decisions = DecisionTable::new(
        PolicyTable::new().with_policy(SiteArchetype::Directory, &["/"]),
        AppPathClassifier::platform(),
    );
    let site = tenant("harborside.test", SiteArchetype::Directory);
    let state = EdgeState::new(StaticDirectory::with_site(site)).with_decisions(decisions);
    let app = edge_app(state);

    // Allowed by the built-in directory policy, not by this one.
    let response = send(app.clone(), "harborside.test", "/businesses/pier-bakery", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    let response = send(app, "harborside.test", "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn directory_failures_degrade_to_the_global_surface() {
    let app = edge_app(EdgeState::new(std::sync::Arc::new(UnreachableDirectory)));

    let response = send(app, "harborside.test", "/about", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers.get("x-portico-tenant-domain").is_none());
    assert_eq!(headers.get("x-portico-cms-fallback").unwrap(), "false");
}
