//! Error types for Portico Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    // Directory errors
    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration not found")]
    ConfigNotFound,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
