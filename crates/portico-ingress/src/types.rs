//! Ingress plumbing types
//!
//! Request IDs, per-request metadata, and the error surface for the
//! edge's own HTTP handlers. Edge decisions never error (they degrade);
//! `IngressError` exists for the internal endpoints mounted next to the
//! proxy fallback.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Edge-minted correlation ID.
///
/// Stamped on the forwarded request and the response so the client, the
/// edge, and the rendering upstream log the same handle. The format is
/// `edge-<micros>-<seq>`, both hex; time-ordered enough to eyeball in a
/// log tail, cheap enough to mint per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Mint a fresh ID.
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let micros = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_micros();

        Self(format!("edge-{micros:x}-{seq:x}"))
    }

    /// Wrap an ID received from elsewhere, e.g. a test fixture.
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from the edge's own handler surfaces.
#[derive(Debug, Error)]
pub enum IngressError {
    /// The request is missing or malformed in a way the caller can fix
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Something on our side broke
    #[error("internal error: {0}")]
    Internal(String),
}

impl IngressError {
    fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            IngressError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            IngressError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            IngressError::InvalidRequest(_) => "invalid_request",
            IngressError::Internal(_) => "internal_error",
        }
    }
}

impl axum::response::IntoResponse for IngressError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "type": self.kind(),
                "code": status.as_u16(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

pub type IngressResult<T> = Result<T, IngressError>;

/// What the edge learned about a request on the way in.
///
/// Carried as a request extension; downstream handlers read it for log
/// correlation, never for routing decisions.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Edge-minted request ID
    pub request_id: RequestId,
    /// Raw Host header, before normalization
    pub host: Option<String>,
    /// Client IP as reported by the fronting proxy
    pub client_ip: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
    /// Arrival timestamp, epoch seconds
    pub timestamp: i64,
}

impl RequestMetadata {
    pub fn new() -> Self {
        Self {
            request_id: RequestId::generate(),
            host: None,
            client_ip: None,
            user_agent: None,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs() as i64,
        }
    }

    pub fn with_host(mut self, host: String) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_client_ip(mut self, ip: String) -> Self {
        self.client_ip = Some(ip);
        self
    }

    pub fn with_user_agent(mut self, ua: String) -> Self {
        self.user_agent = Some(ua);
        self
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new()
    }
}
