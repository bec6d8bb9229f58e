//! Upstream renderer proxy
//!
//! Forwards allowed requests to the rendering upstream untouched apart
//! from hop-by-hop header filtering. The edge middleware has already
//! attached the `x-portico-*` context headers by the time a request
//! reaches this handler, and the upstream's response comes back as-is,
//! including its error pages.

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use portico_observability::metrics::Metrics;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Renderer proxy error
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Body read error: {0}")]
    BodyReadError(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = format!(
            "{{\"error\": \"upstream_proxy_error\", \"message\": \"{}\"}}",
            self
        );

        (StatusCode::BAD_GATEWAY, body).into_response()
    }
}

/// The rendering upstream requests are forwarded to
#[derive(Debug, Clone)]
pub struct UpstreamRenderer {
    /// Base URL of the renderer (e.g., "http://renderer:3000")
    base_url: String,
    /// HTTP client
    client: Arc<Client>,
}

impl UpstreamRenderer {
    /// Create a new upstream renderer target
    pub fn new(base_url: String, client: Arc<Client>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a path, query string included
    fn build_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }
}

/// Add a fallback route proxying every unmatched path to the renderer.
pub fn with_renderer(
    router: Router,
    renderer: Arc<UpstreamRenderer>,
    metrics: Option<Arc<Metrics>>,
) -> Router {
    router.fallback(move |req: Request| {
        let renderer = renderer.clone();
        let metrics = metrics.clone();
        async move {
            let started = Instant::now();
            let result = forward(&renderer, req).await;
            if let Some(metrics) = &metrics {
                let label = if result.is_ok() { "ok" } else { "error" };
                metrics.record_upstream(label, started.elapsed().as_secs_f64());
            }
            result
        }
    })
}

/// Forward one request to the renderer and return its response.
///
/// # Errors
/// Returns `ProxyError` when the request body cannot be read or the
/// upstream round trip fails; both map to a 502 response.
pub async fn forward(renderer: &UpstreamRenderer, req: Request) -> Result<Response, ProxyError> {
    let (parts, body) = req.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = renderer.build_url(path_and_query);

    debug!("Renderer proxy: {} {} -> {}", parts.method, path_and_query, url);

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read request body: {}", e);
            return Err(ProxyError::BodyReadError(e.to_string()));
        }
    };

    // Filter hop-by-hop headers; reqwest sets Host from the URL
    let mut upstream_headers = HeaderMap::new();
    for (name, value) in parts.headers.iter() {
        if is_hop_by_hop_header(name.as_str()) || name == header::HOST {
            continue;
        }
        upstream_headers.append(name.clone(), value.clone());
    }

    let response = renderer
        .client
        .request(parts.method, &url)
        .headers(upstream_headers)
        .body(body_bytes)
        .send()
        .await?;

    let status = response.status();
    let mut response_headers = HeaderMap::new();
    for (name, value) in response.headers().iter() {
        if is_hop_by_hop_header(name.as_str()) {
            continue;
        }
        response_headers.append(name.clone(), value.clone());
    }

    let response_bytes = response.bytes().await?;

    debug!(
        "Renderer proxy response: {} bytes, status: {}",
        response_bytes.len(),
        status
    );

    let mut out = Response::new(Body::from(response_bytes));
    *out.status_mut() = status;
    *out.headers_mut() = response_headers;

    Ok(out)
}

/// Check if a header is a hop-by-hop header that should not be forwarded
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
