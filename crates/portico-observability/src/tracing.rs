//! OpenTelemetry tracer setup and edge span annotation
//!
//! The provider is initialized once at startup when tracing is enabled
//! in the server config; exporter wiring is left to the deployment.
//! [`EdgeSpanAttributes`] collects the per-request fields worth putting
//! on a span (tenant, archetype, outcome, request ID, template) under
//! the `portico.*` namespace.

use opentelemetry::{
    KeyValue,
    trace::{Span, Status},
};
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

/// Tracer configuration
#[derive(Debug, Clone)]
pub struct TracerConfig {
    /// Service name
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Sampling rate (0.0-1.0)
    pub sampling_rate: f64,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: "portico".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            sampling_rate: 1.0,
        }
    }
}

/// Build the tracer provider for the configured sampling rate.
pub fn init_tracer_provider(config: TracerConfig) -> SdkTracerProvider {
    let resource = Resource::builder()
        .with_service_name(config.service_name)
        .with_attribute(KeyValue::new("service.version", config.service_version))
        .build();

    let sampler = if config.sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if config.sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(config.sampling_rate)
    };

    SdkTracerProvider::builder()
        .with_resource(resource)
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(sampler)
        .build()
}

/// Per-request span attributes under the `portico.*` namespace.
///
/// Built up as the edge learns things about a request, then applied in
/// one call with [`EdgeSpanAttributes::annotate`]. Absent fields stay
/// off the span entirely.
#[derive(Debug, Clone, Default)]
pub struct EdgeSpanAttributes {
    /// Normalized tenant domain
    pub tenant_domain: Option<String>,
    /// Tenant archetype
    pub archetype: Option<String>,
    /// Decision outcome label
    pub outcome: Option<String>,
    /// Request ID
    pub request_id: Option<String>,
    /// Template binding name
    pub template: Option<String>,
}

impl EdgeSpanAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant_domain(mut self, domain: impl Into<String>) -> Self {
        self.tenant_domain = Some(domain.into());
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// The collected attributes as OpenTelemetry key-value pairs.
    pub fn to_key_values(&self) -> Vec<KeyValue> {
        let fields = [
            ("portico.tenant_domain", &self.tenant_domain),
            ("portico.archetype", &self.archetype),
            ("portico.outcome", &self.outcome),
            ("portico.request_id", &self.request_id),
            ("portico.template", &self.template),
        ];

        fields
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| KeyValue::new(key, v)))
            .collect()
    }

    /// Apply every collected attribute to `span`.
    pub fn annotate(&self, span: &mut impl Span) {
        for kv in self.to_key_values() {
            span.set_attribute(kv);
        }
    }
}

/// Mark a span failed. The message lands both in the span status and in
/// `error.message`, since some backends only index one of the two.
pub fn record_error(span: &mut impl Span, error: &str) {
    span.set_status(Status::error(error.to_string()));
    span.set_attribute(KeyValue::new("error.message", error.to_string()));
}

/// Mark a span successful.
pub fn record_success(span: &mut impl Span) {
    span.set_status(Status::Ok);
}
