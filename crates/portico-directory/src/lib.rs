//! Portico Tenant Directory
//!
//! This crate provides the tenant directory backends:
//! - HTTP directory client against the control-plane lookup API
//! - File-backed directory with hot reload for development and tests
//! - TTL cache wrapper shared by both

pub mod cache;
pub mod file;
pub mod http;

pub use cache::{CachedDirectory, DirectoryCacheConfig};
pub use file::FileTenantDirectory;
pub use http::HttpTenantDirectory;
