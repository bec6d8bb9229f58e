//! Portico Session Presence Detection
//!
//! This crate provides best-effort, unverified session detection for
//! the edge:
//! - Auth-token cookie selection by naming convention
//! - Ordered envelope decoding (array and object token envelopes)
//! - Claim peeking without signature verification
//!
//! The result is a routing hint for redirect decisions, never an
//! authorization signal.

pub mod cookie;
pub mod decoder;

// Re-export commonly used types
pub use cookie::{auth_token_candidates, is_auth_token_cookie, parse_cookie_header};
pub use decoder::{detect_session, detect_session_at, peek_claims};
