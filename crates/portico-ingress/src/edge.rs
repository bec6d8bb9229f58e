//! Edge orchestrator middleware
//!
//! The per-request pipeline: resolve the tenant from the Host header,
//! decode the session hint from the cookies, evaluate the routing
//! decision table, then either emit a redirect or forward the request
//! with the resolved context attached.
//!
//! Context propagation is one-way. Inbound `x-portico-*` headers are
//! stripped before the resolved values are set, so downstream handlers
//! can read them as edge-owned routing hints. They are hints, not
//! verified claims: nothing here checks a signature.

use crate::middleware::RequestMetadataExt;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use portico_core::{ResolvedContext, SessionHint, TenantDirectory, resolve_tenant};
use portico_observability::metrics::Metrics;
use portico_routing::{DecisionInput, DecisionTable, RouteOutcome};
use portico_session::detect_session;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Header carrying the serialized tenant record.
pub const TENANT_HEADER: &str = "x-portico-tenant";
/// Header carrying the tenant ID.
pub const TENANT_ID_HEADER: &str = "x-portico-tenant-id";
/// Header carrying the tenant's registered domain.
pub const TENANT_DOMAIN_HEADER: &str = "x-portico-tenant-domain";
/// Header carrying the CMS fallback flag.
pub const CMS_FALLBACK_HEADER: &str = "x-portico-cms-fallback";

/// Every header under this prefix belongs to the edge. Inbound values
/// are dropped unconditionally.
const CONTEXT_HEADER_PREFIX: &str = "x-portico-";

/// Extension key for the resolved routing context
#[derive(Clone)]
pub struct ResolvedContextExt(pub ResolvedContext);

/// Shared state for the edge middleware
#[derive(Clone)]
pub struct EdgeState {
    directory: Arc<dyn TenantDirectory>,
    decisions: Arc<DecisionTable>,
    metrics: Option<Arc<Metrics>>,
}

impl EdgeState {
    /// State over the platform decision table, without metrics.
    pub fn new(directory: Arc<dyn TenantDirectory>) -> Self {
        Self {
            directory,
            decisions: Arc::new(DecisionTable::platform()),
            metrics: None,
        }
    }

    /// Replace the decision table.
    pub fn with_decisions(mut self, decisions: DecisionTable) -> Self {
        self.decisions = Arc::new(decisions);
        self
    }

    /// Attach a metrics collector.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn directory(&self) -> &Arc<dyn TenantDirectory> {
        &self.directory
    }
}

/// The edge pipeline, mounted with `middleware::from_fn_with_state`.
pub async fn edge_middleware(
    State(state): State<EdgeState>,
    mut req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let path = req.uri().path().to_string();
    let host = request_host(&req).to_string();

    let lookup_started = Instant::now();
    let tenant = resolve_tenant(state.directory.as_ref(), &host).await;
    if let Some(metrics) = &state.metrics {
        let result = if tenant.is_some() { "found" } else { "none" };
        metrics.record_tenant_lookup(result, lookup_started.elapsed().as_secs_f64());
    }

    let session = session_hint(req.headers());
    if let Some(metrics) = &state.metrics {
        metrics.record_session_hint(session.is_some());
    }

    let outcome = state.decisions.decide(&DecisionInput {
        path: &path,
        tenant: tenant.as_ref(),
        session_present: session.is_some(),
    });

    if let Some(metrics) = &state.metrics {
        let archetype = tenant
            .as_ref()
            .map(|t| t.archetype.to_string())
            .unwrap_or_else(|| "none".to_string());
        metrics.record_decision(outcome.label(), &archetype, started.elapsed().as_secs_f64());
    }

    match outcome {
        RouteOutcome::Redirect { location, kind } => {
            debug!(path = %path, host = %host, location = %location, kind = %kind, "edge redirect");
            redirect_response(&location)
        }
        RouteOutcome::Allow { cms_fallback } => {
            let context = match tenant {
                Some(tenant) => ResolvedContext::for_tenant(tenant),
                None => ResolvedContext::anonymous(),
            }
            .with_cms_fallback(cms_fallback)
            .with_session(session);

            let request_id = req
                .extensions()
                .get::<RequestMetadataExt>()
                .map(|m| m.0.request_id.to_string());
            debug!(
                path = %path,
                host = %host,
                request_id = request_id.as_deref().unwrap_or("-"),
                tenant = context.tenant_domain().unwrap_or("-"),
                cms_fallback = context.cms_fallback,
                "request forwarded with context"
            );

            propagate_context(req.headers_mut(), &context);
            req.extensions_mut().insert(ResolvedContextExt(context));
            next.run(req).await
        }
    }
}

/// The request's host, from the Host header or the HTTP/2 authority.
fn request_host(req: &Request) -> &str {
    if let Some(host) = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
    {
        return host;
    }
    req.uri().host().unwrap_or("")
}

/// Scans every Cookie header for an apparent session.
fn session_hint(headers: &HeaderMap) -> Option<SessionHint> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(detect_session)
}

/// Strips inbound edge-owned headers and sets the resolved ones.
fn propagate_context(headers: &mut HeaderMap, context: &ResolvedContext) {
    let inbound: Vec<_> = headers
        .keys()
        .filter(|name| name.as_str().starts_with(CONTEXT_HEADER_PREFIX))
        .cloned()
        .collect();
    for name in inbound {
        headers.remove(&name);
    }

    let fallback = if context.cms_fallback { "true" } else { "false" };
    headers.insert(CMS_FALLBACK_HEADER, HeaderValue::from_static(fallback));

    if let Some(id) = context.tenant_id() {
        set_header(headers, TENANT_ID_HEADER, &id.to_string());
    }
    if let Some(domain) = context.tenant_domain() {
        set_header(headers, TENANT_DOMAIN_HEADER, domain);
    }

    let Some(tenant) = &context.tenant else {
        return;
    };
    match serde_json::to_string(tenant) {
        Ok(json) => set_header(headers, TENANT_HEADER, &json),
        Err(e) => warn!(domain = %tenant.domain, error = %e, "tenant record failed to serialize"),
    }
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => warn!(header = name, "propagated value not header-safe, skipping"),
    }
}

/// A temporary redirect preserving the request method.
fn redirect_response(location: &str) -> Response {
    let value = HeaderValue::from_str(location).unwrap_or_else(|_| {
        warn!(location = %location, "redirect location not header-safe, falling back to root");
        HeaderValue::from_static("/")
    });

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
    response.headers_mut().insert(header::LOCATION, value);
    response
}
