//! Portico Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Portico:
//! - Tenant site model (domain, archetype, template, status)
//! - Tenant directory lookup trait
//! - Unverified session hint type
//! - Per-request resolved context
//! - Core error types

pub mod context;
pub mod directory;
pub mod error;
pub mod session;
pub mod tenant;

pub use context::ResolvedContext;
pub use directory::{TenantDirectory, resolve_tenant};
pub use error::{Error, Result};
pub use session::SessionHint;
pub use tenant::{SiteArchetype, TenantId, TenantSite, TenantStatus, normalize_domain};
