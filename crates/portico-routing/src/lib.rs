//! Portico Routing Engine
//!
//! This crate provides the edge routing logic for Portico:
//! - Precompiled route patterns with dynamic segments
//! - Per-archetype route policies
//! - Two-tier request path classification
//! - The per-request decision table (allow / redirect / CMS fallback)

pub mod classifier;
pub mod decision;
pub mod pattern;
pub mod policy;

// Re-export commonly used types
pub use classifier::AppPathClassifier;
pub use decision::{AUTHED_HOME, DecisionInput, DecisionTable, RedirectKind, RouteOutcome};
pub use pattern::{RoutePattern, Segment, any_match};
pub use policy::PolicyTable;
