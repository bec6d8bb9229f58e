//! Unverified session presence hint
//!
//! `SessionHint` is the output of the session presence decoder: a best-effort
//! "a login appears to exist" signal peeked from an inbound auth cookie
//! without any signature verification. It exists only to drive UX-level
//! redirects (send signed-in visitors past the sign-in page, send signed-out
//! visitors to it).
//!
//! The type is deliberately distinct from any verified-identity type and
//! implements no identity traits. Consumers MUST NOT treat it as an
//! authorization boundary; the session issuer/verifier re-verifies tokens
//! cryptographically before trusting identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A decoded-but-unverified session signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHint {
    /// Subject claim as found in the token payload
    pub subject: String,
    /// Expiry claim as found in the token payload
    pub expires_at: DateTime<Utc>,
}

impl SessionHint {
    /// Whether the hinted session has already expired at `now`.
    ///
    /// An expired hint is treated as no session by every consumer.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
