//! Portico Template Resolution
//!
//! This crate maps request paths to renderable pages:
//! - Template bindings (routes, components, feature flags) per template
//! - Logical page key table with dynamic detail-page prefixes
//! - A registry with baseline fallback for unrecognized template names
//!
//! Route coverage reuses the compiled-pattern matcher from
//! `portico-routing`, so template coverage and route policy can never
//! disagree about dynamic segments.

pub mod binding;
pub mod pages;
pub mod registry;

// Re-export commonly used types
pub use binding::{ResolvedPage, TemplateBinding};
pub use pages::page_key_for;
pub use registry::{BASELINE_TEMPLATE, TemplateRegistry};
