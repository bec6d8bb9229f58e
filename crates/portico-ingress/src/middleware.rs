//! Request correlation and baseline response headers
//!
//! `request_context_middleware` mints a request ID for every inbound
//! request and stamps it on both the forwarded request and the response,
//! so edge logs, upstream renderer logs, and the client all share one
//! handle. Inbound `x-request-id` values are dropped; the ID is
//! edge-owned, like the `x-portico-*` context headers.
//!
//! `security_headers_middleware` applies the baseline header set to every
//! response the edge emits, redirects included.

use crate::types::RequestMetadata;
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// Response header carrying the edge-minted request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Baseline headers for every edge response. Tenant sites are served to
/// the public internet; the set leans conservative and individual
/// deployments relax it at the CDN if they must.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
];

/// Extension carrying the request metadata collected at ingress.
#[derive(Clone)]
pub struct RequestMetadataExt(pub RequestMetadata);

/// Mints the request ID, collects client metadata, and stamps the ID on
/// the forwarded request and the response.
pub async fn request_context_middleware(mut req: Request, next: Next) -> Response {
    req.headers_mut().remove(REQUEST_ID_HEADER);

    let mut metadata = RequestMetadata::new();

    if let Some(host) = header_str(req.headers(), header::HOST.as_str()) {
        metadata = metadata.with_host(host.to_string());
    }

    // Client IP from x-forwarded-for (first hop) or x-real-ip
    if let Some(forwarded_for) = header_str(req.headers(), "x-forwarded-for") {
        let client_ip = forwarded_for
            .split(',')
            .next()
            .unwrap_or(forwarded_for)
            .trim()
            .to_string();
        metadata = metadata.with_client_ip(client_ip);
    } else if let Some(real_ip) = header_str(req.headers(), "x-real-ip") {
        metadata = metadata.with_client_ip(real_ip.to_string());
    }

    if let Some(user_agent) = header_str(req.headers(), header::USER_AGENT.as_str()) {
        metadata = metadata.with_user_agent(user_agent.to_string());
    }

    let request_id = metadata.request_id.clone();
    let id_value: HeaderValue = request_id.to_string().parse().unwrap();

    // The upstream renderer logs the same ID the client sees
    req.headers_mut()
        .insert(REQUEST_ID_HEADER, id_value.clone());
    req.extensions_mut().insert(RequestMetadataExt(metadata));

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, id_value);
    response
}

/// Applies the baseline security header set to the response.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(*name, HeaderValue::from_static(value));
    }

    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
