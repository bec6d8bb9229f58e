//! Directory backends wired into the live edge
//!
//! The edge only ever sees `Arc<dyn TenantDirectory>`; these tests swap
//! the real backends in behind it: the HTTP client against a wiremock
//! directory service, the TTL cache, and the file-backed snapshot.

mod common;

use axum::http::StatusCode;
use common::*;
use portico_core::TenantSite;
use portico_directory::{
    CachedDirectory, DirectoryCacheConfig, FileTenantDirectory, HttpTenantDirectory,
};
use portico_ingress::EdgeState;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn harborside_payload() -> serde_json::Value {
    json!({
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "domain": "harborside.test",
        "name": "Harborside Collective",
        "archetype": "directory",
        "template_name": "harbor"
    })
}

#[tokio::test]
async fn http_directory_resolves_tenants_through_the_edge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tenants/lookup"))
        .and(query_param("domain", "harborside.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(harborside_payload()))
        .mount(&server)
        .await;

    let directory = HttpTenantDirectory::new(server.uri()).unwrap();
    let app = edge_app(EdgeState::new(Arc::new(directory)));

    let response = send(app, "harborside.test", "/about", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let record: TenantSite = serde_json::from_slice(
        response
            .headers()
            .get("x-portico-tenant")
            .unwrap()
            .as_bytes(),
    )
    .unwrap();
    assert_eq!(record.template_name, "harbor");
    assert_eq!(record.id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
}

#[tokio::test]
async fn unregistered_domains_pass_through_without_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tenants/lookup"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let directory = HttpTenantDirectory::new(server.uri()).unwrap();
    let app = edge_app(EdgeState::new(Arc::new(directory)));

    let response = send(app, "unclaimed.test", "/about", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers.get("x-portico-tenant").is_none());
    assert_eq!(headers.get("x-portico-cms-fallback").unwrap(), "false");
}

#[tokio::test]
async fn hosts_are_normalized_before_the_lookup_wire_call() {
    let server = MockServer::start().await;
    // The matcher only accepts the normalized form; a raw Host value on
    // the wire would fall through to the unmatched 404.
    Mock::given(method("GET"))
        .and(path("/v1/tenants/lookup"))
        .and(query_param("domain", "harborside.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(harborside_payload()))
        .mount(&server)
        .await;

    let directory = HttpTenantDirectory::new(server.uri()).unwrap();
    let app = edge_app(EdgeState::new(Arc::new(directory)));

    let response = send(app, "WWW.Harborside.TEST:8443", "/about", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-portico-tenant-domain").unwrap(),
        "harborside.test"
    );
}

#[tokio::test]
async fn not_found_lookups_are_negatively_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tenants/lookup"))
        .and(query_param("domain", "unclaimed.test"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let http = HttpTenantDirectory::new(server.uri()).unwrap();
    let cached = CachedDirectory::new(Arc::new(http), DirectoryCacheConfig::default());
    let app = edge_app(EdgeState::new(Arc::new(cached)));

    for _ in 0..2 {
        let response = send(app.clone(), "unclaimed.test", "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-portico-tenant").is_none());
    }

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn slow_directories_hit_the_timeout_and_degrade() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tenants/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(harborside_payload())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let directory =
        HttpTenantDirectory::with_timeout(server.uri(), Duration::from_millis(50)).unwrap();
    let app = edge_app(EdgeState::new(Arc::new(directory)));

    let response = send(app, "harborside.test", "/about", None).await;

    // Served without tenant context instead of hanging on the lookup.
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-portico-tenant").is_none());
}

#[tokio::test]
async fn a_tenants_file_serves_the_edge() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        r#"
tenants:
  - domain: pier-and-main.test
    name: Pier & Main
    archetype: directory
    template_name: harbor
  - domain: www.atelier-clean.test
    name: Atelier Cleaning Co
    archetype: service
    template_name: atelier
"#,
    )
    .unwrap();

    let directory = FileTenantDirectory::new(file.path()).await.unwrap();
    let app = edge_app(EdgeState::new(Arc::new(directory)));

    // Directory archetype serves its listing pages.
    let response = send(app.clone(), "pier-and-main.test", "/businesses", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-portico-tenant-domain").unwrap(),
        "pier-and-main.test"
    );

    // The www-prefixed record was keyed by its normalized domain.
    let response = send(app.clone(), "atelier-clean.test", "/businesses", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    let response = send(app, "somewhere-else.test", "/businesses", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-portico-tenant").is_none());
}
