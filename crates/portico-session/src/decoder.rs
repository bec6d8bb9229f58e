//! Session token decoding
//!
//! Turns auth-token cookie values into a [`SessionHint`]. Cookie values
//! arrive in one of several envelope formats; the envelope decoders run
//! in a fixed order and the first one to produce a bearer token wins,
//! so supporting a new format means adding one function to the list.
//!
//! The bearer token's claims are read without signature verification.
//! That is a deliberate limitation, not an oversight: the output drives
//! UX-level redirects only and must never be used as an authorization
//! boundary. Verification belongs to the session issuer downstream.
//!
//! Every decoding step is tolerant. Any failure on a candidate means
//! "try the next candidate" and the overall result degrades to no
//! session; nothing in this module errors outward or panics.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use portico_core::SessionHint;
use tracing::debug;

use crate::cookie::auth_token_candidates;

/// One envelope decoder: cookie value in, bearer token out.
pub type EnvelopeDecoder = fn(&str) -> Option<String>;

/// The envelope formats the platform has shipped, tried in order.
pub const ENVELOPE_DECODERS: &[(&str, EnvelopeDecoder)] = &[
    ("array_envelope", decode_array_envelope),
    ("object_envelope", decode_object_envelope),
];

/// JSON array whose first element is the access token.
fn decode_array_envelope(value: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(value).ok()?;
    let token = parsed.as_array()?.first()?.as_str()?;
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// JSON object carrying an `access_token` string field.
fn decode_object_envelope(value: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(value).ok()?;
    let token = parsed.as_object()?.get("access_token")?.as_str()?;
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Decodes one base64 token segment, accepting both the URL-safe
/// unpadded alphabet JWTs normally use and padded standard base64 from
/// older token issuers.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| STANDARD.decode(segment))
        .ok()
}

/// Reads `exp` and `sub` from a bearer token without verifying it.
///
/// The token must have the three-segment shape; the middle segment is
/// base64-decoded and parsed as JSON. A missing or non-integer `exp`
/// claim fails the peek. A missing `sub` yields an empty subject.
pub fn peek_claims(token: &str) -> Option<SessionHint> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = decode_segment(segments[1])?;
    let claims: serde_json::Value = serde_json::from_slice(&payload).ok()?;

    let exp = claims.get("exp")?.as_i64()?;
    let expires_at = DateTime::from_timestamp(exp, 0)?;
    let subject = claims
        .get("sub")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Some(SessionHint {
        subject,
        expires_at,
    })
}

/// Runs one cookie value through URL decoding, the envelope decoders,
/// and the claim peek. `None` on any failure or an expired claim.
fn decode_candidate(raw_value: &str, now: DateTime<Utc>) -> Option<SessionHint> {
    let value = urlencoding::decode(raw_value).ok()?;

    let token = ENVELOPE_DECODERS.iter().find_map(|(format, decoder)| {
        let token = decoder(&value)?;
        debug!(format, "decoded auth token envelope");
        Some(token)
    })?;

    let hint = peek_claims(&token)?;
    if hint.is_expired(now) {
        debug!(subject = %hint.subject, "auth token candidate expired, trying next");
        return None;
    }
    Some(hint)
}

/// Detects an apparent session from a `Cookie` header value.
///
/// Scans auth-token cookies in header order and returns the first
/// candidate with an unexpired claim.
///
/// # Example
///
/// ```
/// let hint = portico_session::detect_session("theme=dark; other=1");
/// assert!(hint.is_none());
/// ```
pub fn detect_session(cookie_header: &str) -> Option<SessionHint> {
    detect_session_at(cookie_header, Utc::now())
}

/// [`detect_session`] against an explicit clock.
pub fn detect_session_at(cookie_header: &str, now: DateTime<Utc>) -> Option<SessionHint> {
    auth_token_candidates(cookie_header)
        .iter()
        .find_map(|value| decode_candidate(value, now))
}
