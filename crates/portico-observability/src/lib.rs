//! Portico Observability
//!
//! This crate provides observability features:
//! - Metrics collection (Prometheus)
//! - Distributed tracing (OpenTelemetry)
//! - Health endpoints

pub mod health;
pub mod metrics;
pub mod tracing;

pub use health::{DependencyStatus, HealthState, ReadinessChecker, health_router};
pub use metrics::Metrics;
pub use self::tracing::{TracerConfig, init_tracer_provider};
