//! Common fixtures for the edge integration tests

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use portico_core::{Error, Result, SiteArchetype, TenantDirectory, TenantSite};
use portico_ingress::{EdgeState, ResolvedContextExt, edge_middleware};
use std::sync::Arc;
use tower::ServiceExt;

/// Directory stub holding at most one registered tenant, keyed by its
/// normalized domain like the real backends.
#[allow(dead_code)]
pub struct StaticDirectory {
    site: Option<TenantSite>,
}

#[allow(dead_code)]
impl StaticDirectory {
    pub fn with_site(site: TenantSite) -> Arc<Self> {
        Arc::new(Self { site: Some(site) })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self { site: None })
    }
}

#[async_trait]
impl TenantDirectory for StaticDirectory {
    async fn lookup(&self, domain: &str) -> Result<Option<TenantSite>> {
        Ok(self.site.clone().filter(|site| site.domain == domain))
    }
}

/// Directory stub that fails every lookup.
#[allow(dead_code)]
pub struct UnreachableDirectory;

#[async_trait]
impl TenantDirectory for UnreachableDirectory {
    async fn lookup(&self, _domain: &str) -> Result<Option<TenantSite>> {
        Err(Error::DirectoryUnavailable("connection refused".to_string()))
    }
}

/// One configured tenant site for a scenario.
#[allow(dead_code)]
pub fn tenant(domain: &str, archetype: SiteArchetype) -> TenantSite {
    TenantSite::new(domain, "Scenario Tenant", archetype)
}

/// Downstream handler standing in for the renderer. Echoes the
/// edge-owned request headers back as response headers so tests can
/// assert on what the edge attached, and marks whether the resolved
/// context extension arrived.
#[allow(dead_code)]
pub async fn echo_context(req: Request) -> Response {
    let mut headers = HeaderMap::new();
    for (name, value) in req.headers() {
        if name.as_str().starts_with("x-portico-") {
            headers.insert(name.clone(), value.clone());
        }
    }
    if req.extensions().get::<ResolvedContextExt>().is_some() {
        headers.insert("x-test-context", HeaderValue::from_static("attached"));
    }
    (StatusCode::OK, headers, "downstream").into_response()
}

/// Edge middleware in front of the echo handler, the minimal deployment
/// shape without the renderer proxy.
#[allow(dead_code)]
pub fn edge_app(state: EdgeState) -> Router {
    Router::new()
        .fallback(echo_context)
        .layer(middleware::from_fn_with_state(state, edge_middleware))
}

/// Drive one request through an app.
#[allow(dead_code)]
pub async fn send(app: Router, host: &str, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri).header(header::HOST, host);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// The Location header, empty when absent.
#[allow(dead_code)]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn unsigned_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = serde_json::json!({"sub": "visitor-1", "exp": exp});
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}

/// A bearer token whose claims are two hours from expiry.
#[allow(dead_code)]
pub fn live_token() -> String {
    unsigned_jwt((chrono::Utc::now() + chrono::Duration::hours(2)).timestamp())
}

/// Array-envelope auth cookie, the shape current dashboard builds set.
#[allow(dead_code)]
pub fn array_envelope_cookie() -> String {
    format!(
        "pt-main-auth-token={}",
        urlencoding::encode(&serde_json::json!([live_token(), "refresh"]).to_string())
    )
}

/// Object-envelope auth cookie from older dashboard builds.
#[allow(dead_code)]
pub fn object_envelope_cookie() -> String {
    format!(
        "pt-legacy-auth-token={}",
        urlencoding::encode(&serde_json::json!({"access_token": live_token()}).to_string())
    )
}

/// Auth cookie whose token expired an hour ago.
#[allow(dead_code)]
pub fn expired_cookie() -> String {
    let token = unsigned_jwt((chrono::Utc::now() - chrono::Duration::hours(1)).timestamp());
    format!(
        "pt-main-auth-token={}",
        urlencoding::encode(&serde_json::json!([token]).to_string())
    )
}
