//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for Portico:
//! - Edge decision counts by outcome and archetype
//! - Tenant directory lookup counts, latency, and cache efficiency
//! - Session hint detection counts
//! - Template resolution counts
//! - Upstream renderer latency

use prometheus::{
    Counter, CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};
use std::sync::Arc;

/// Metrics collector for Portico
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    // Edge decision metrics
    /// Decision outcomes by outcome label and tenant archetype
    pub edge_decisions_total: CounterVec,
    /// Decision evaluation duration (classification + policy + session)
    pub edge_decision_duration_seconds: Histogram,

    // Tenant directory metrics
    /// Directory lookups by result (found, none)
    pub tenant_lookups_total: CounterVec,
    /// Directory lookup duration, cache misses included
    pub tenant_lookup_duration_seconds: Histogram,
    /// Lookups served from the in-process cache
    pub tenant_lookup_cache_hits_total: Counter,
    /// Lookups that had to reach the directory
    pub tenant_lookup_cache_misses_total: Counter,

    // Session metrics
    /// Session hint scans by result (detected, absent)
    pub session_hints_total: CounterVec,

    // Template metrics
    /// Template resolutions by template name and result
    pub template_resolutions_total: CounterVec,

    // Upstream metrics
    /// Renderer round-trip duration by result (ok, error)
    pub upstream_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let edge_decisions_total = CounterVec::new(
            Opts::new(
                "portico_edge_decisions_total",
                "Edge routing decisions by outcome and tenant archetype",
            ),
            &["outcome", "archetype"],
        )?;

        let edge_decision_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "portico_edge_decision_duration_seconds",
                "Edge decision evaluation duration in seconds",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025]),
        )?;

        let tenant_lookups_total = CounterVec::new(
            Opts::new(
                "portico_tenant_lookups_total",
                "Tenant directory lookups by result",
            ),
            &["result"],
        )?;

        let tenant_lookup_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "portico_tenant_lookup_duration_seconds",
                "Tenant directory lookup duration in seconds",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5]),
        )?;

        let tenant_lookup_cache_hits_total = Counter::with_opts(Opts::new(
            "portico_tenant_lookup_cache_hits_total",
            "Tenant lookups served from the in-process cache",
        ))?;

        let tenant_lookup_cache_misses_total = Counter::with_opts(Opts::new(
            "portico_tenant_lookup_cache_misses_total",
            "Tenant lookups that reached the directory",
        ))?;

        let session_hints_total = CounterVec::new(
            Opts::new(
                "portico_session_hints_total",
                "Session hint scans by result",
            ),
            &["result"],
        )?;

        let template_resolutions_total = CounterVec::new(
            Opts::new(
                "portico_template_resolutions_total",
                "Template resolutions by template name and result",
            ),
            &["template", "result"],
        )?;

        let upstream_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "portico_upstream_duration_seconds",
                "Upstream renderer round-trip duration in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["result"],
        )?;

        // Register all metrics
        registry.register(Box::new(edge_decisions_total.clone()))?;
        registry.register(Box::new(edge_decision_duration_seconds.clone()))?;
        registry.register(Box::new(tenant_lookups_total.clone()))?;
        registry.register(Box::new(tenant_lookup_duration_seconds.clone()))?;
        registry.register(Box::new(tenant_lookup_cache_hits_total.clone()))?;
        registry.register(Box::new(tenant_lookup_cache_misses_total.clone()))?;
        registry.register(Box::new(session_hints_total.clone()))?;
        registry.register(Box::new(template_resolutions_total.clone()))?;
        registry.register(Box::new(upstream_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            edge_decisions_total,
            edge_decision_duration_seconds,
            tenant_lookups_total,
            tenant_lookup_duration_seconds,
            tenant_lookup_cache_hits_total,
            tenant_lookup_cache_misses_total,
            session_hints_total,
            template_resolutions_total,
            upstream_duration_seconds,
        })
    }

    /// Get the Prometheus registry for exporting metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record one edge decision
    pub fn record_decision(&self, outcome: &str, archetype: &str, duration_secs: f64) {
        self.edge_decisions_total
            .with_label_values(&[outcome, archetype])
            .inc();
        self.edge_decision_duration_seconds.observe(duration_secs);
    }

    /// Record a tenant directory lookup
    pub fn record_tenant_lookup(&self, result: &str, duration_secs: f64) {
        self.tenant_lookups_total
            .with_label_values(&[result])
            .inc();
        self.tenant_lookup_duration_seconds.observe(duration_secs);
    }

    /// Record a lookup served from cache
    pub fn record_cache_hit(&self) {
        self.tenant_lookup_cache_hits_total.inc();
    }

    /// Record a lookup that reached the directory
    pub fn record_cache_miss(&self) {
        self.tenant_lookup_cache_misses_total.inc();
    }

    /// Record the result of one session hint scan
    pub fn record_session_hint(&self, detected: bool) {
        let result = if detected { "detected" } else { "absent" };
        self.session_hints_total.with_label_values(&[result]).inc();
    }

    /// Record one template resolution
    pub fn record_template_resolution(&self, template: &str, resolved: bool) {
        let result = if resolved { "resolved" } else { "unsupported" };
        self.template_resolutions_total
            .with_label_values(&[template, result])
            .inc();
    }

    /// Record one upstream renderer round trip
    pub fn record_upstream(&self, result: &str, duration_secs: f64) {
        self.upstream_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }
}
