//! Route pattern compilation and matching
//!
//! Patterns are plain paths with optional dynamic segments written in
//! bracket syntax (`/businesses/[slug]`). Each pattern is compiled once
//! into a segment list at construction time so the per-request match is
//! a straight slice walk with no parsing or allocation.

use serde::{Deserialize, Serialize};

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request path segment exactly.
    Literal(String),
    /// Matches any single non-empty path segment.
    Wildcard,
}

/// A precompiled route pattern.
///
/// Compilation never fails: every string is a valid pattern, and a
/// segment is dynamic exactly when it is written as `[name]`. The
/// bracket name itself is documentation only and does not affect
/// matching.
///
/// # Example
///
/// ```
/// use portico_routing::RoutePattern;
///
/// let pattern = RoutePattern::compile("/businesses/[slug]");
/// assert!(pattern.matches("/businesses/harbor-cafe"));
/// assert!(!pattern.matches("/businesses/harbor-cafe/reviews"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compiles a pattern string into its segment list.
    pub fn compile(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|part| {
                if part.len() >= 2 && part.starts_with('[') && part.ends_with(']') {
                    Segment::Wildcard
                } else {
                    Segment::Literal(part.to_string())
                }
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The original pattern string this was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The compiled segment list.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether this pattern contains any dynamic segment.
    pub fn is_dynamic(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Wildcard))
    }

    /// Matches a request path against this pattern.
    ///
    /// An exact string match short-circuits before any segment walk.
    /// Otherwise the path must have the same number of `/`-separated
    /// segments as the pattern, literals must match exactly, and each
    /// wildcard must line up with a non-empty segment.
    pub fn matches(&self, path: &str) -> bool {
        if path == self.raw {
            return true;
        }

        let mut parts = path.split('/');
        let mut segments = self.segments.iter();
        loop {
            match (segments.next(), parts.next()) {
                (Some(Segment::Literal(lit)), Some(part)) => {
                    if lit != part {
                        return false;
                    }
                }
                (Some(Segment::Wildcard), Some(part)) => {
                    if part.is_empty() {
                        return false;
                    }
                }
                (None, None) => return true,
                // Segment count mismatch in either direction.
                _ => return false,
            }
        }
    }
}

impl From<String> for RoutePattern {
    fn from(pattern: String) -> Self {
        Self::compile(&pattern)
    }
}

impl From<RoutePattern> for String {
    fn from(pattern: RoutePattern) -> Self {
        pattern.raw
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for RoutePattern {}

/// Returns true when any pattern in the slice matches the path.
pub fn any_match(patterns: &[RoutePattern], path: &str) -> bool {
    patterns.iter().any(|p| p.matches(path))
}
