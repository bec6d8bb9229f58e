//! Portico Edge Ingress
//!
//! This crate provides the HTTP edge pipeline:
//! - Orchestrator middleware: tenant resolution, session hint decoding,
//!   decision-table evaluation, context propagation
//! - Request ID and security header middleware
//! - Pass-through proxy to the rendering upstream

pub mod edge;
pub mod middleware;
pub mod proxy;
pub mod types;

pub use edge::{
    CMS_FALLBACK_HEADER, EdgeState, ResolvedContextExt, TENANT_DOMAIN_HEADER, TENANT_HEADER,
    TENANT_ID_HEADER, edge_middleware,
};
pub use middleware::{
    REQUEST_ID_HEADER, RequestMetadataExt, request_context_middleware, security_headers_middleware,
};
pub use proxy::{ProxyError, UpstreamRenderer, forward, with_renderer};
pub use types::{IngressError, IngressResult, RequestId, RequestMetadata};
