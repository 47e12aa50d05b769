// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics for the articulation front end.
//!
//! Tracks outbound fetches per operation: how many, how many failed, and how
//! long they took.

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::Arc;

use crate::catalog::Operation;
use crate::error::AppError;

/// Metrics collector for the scraper
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,

    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_latency: HistogramVec,
}

fn metric_error(action: &str, e: prometheus::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("Failed to {} metric: {}", action, e))
}

impl Metrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let upstream_requests = IntCounterVec::new(
            Opts::new(
                "assist_upstream_requests_total",
                "Total number of fetches issued against the articulation API",
            ),
            &["operation"],
        )
        .map_err(|e| metric_error("create", e))?;

        let upstream_failures = IntCounterVec::new(
            Opts::new(
                "assist_upstream_failures_total",
                "Total number of fetches that ended in an error",
            ),
            &["operation", "kind"],
        )
        .map_err(|e| metric_error("create", e))?;

        let upstream_latency = HistogramVec::new(
            HistogramOpts::new(
                "assist_upstream_latency_seconds",
                "Duration of fetches against the articulation API in seconds",
            )
            .buckets(vec![
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.0, 5.0, 10.0,
            ]),
            &["operation"],
        )
        .map_err(|e| metric_error("create", e))?;

        registry
            .register(Box::new(upstream_requests.clone()))
            .map_err(|e| metric_error("register", e))?;
        registry
            .register(Box::new(upstream_failures.clone()))
            .map_err(|e| metric_error("register", e))?;
        registry
            .register(Box::new(upstream_latency.clone()))
            .map_err(|e| metric_error("register", e))?;

        Ok(Self {
            registry: Arc::new(registry),
            upstream_requests,
            upstream_failures,
            upstream_latency,
        })
    }

    /// Record an outbound fetch
    pub fn record_upstream_request(&self, operation: Operation) {
        self.upstream_requests
            .with_label_values(&[operation.name()])
            .inc();
    }

    /// Record a failed fetch, labelled with the error kind
    pub fn record_upstream_failure(&self, operation: Operation, kind: &str) {
        self.upstream_failures
            .with_label_values(&[operation.name(), kind])
            .inc();
    }

    /// Observe latency for a fetch in seconds
    pub fn record_upstream_latency(&self, operation: Operation, seconds: f64) {
        self.upstream_latency
            .with_label_values(&[operation.name()])
            .observe(seconds);
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> Result<String, AppError> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;

        String::from_utf8(buffer).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to convert metrics to string: {}",
                e
            ))
        })
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_includes_labelled_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_upstream_request(Operation::Agreements);
        metrics.record_upstream_failure(Operation::Agreements, "fetch");
        metrics.record_upstream_latency(Operation::Agreements, 0.02);

        let text = metrics.export().unwrap();
        assert!(text.contains(r#"assist_upstream_requests_total{operation="agreements"} 1"#));
        assert_eq!(
            metrics
                .upstream_failures
                .with_label_values(&["agreements", "fetch"])
                .get(),
            1
        );
        assert!(text.contains("assist_upstream_latency_seconds_bucket"));
    }

    #[test]
    fn registries_are_independent() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.record_upstream_request(Operation::InstitutionAgreements);

        assert_eq!(
            second
                .upstream_requests
                .with_label_values(&["institution_agreements"])
                .get(),
            0
        );
    }
}
