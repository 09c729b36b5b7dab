// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics for the Warcraft Logs proxy.

use prometheus::core::Collector;
use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::sync::Arc;

use crate::error::AppError;

#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,

    // Token metrics
    pub token_renewals: IntCounter,
    pub token_cache_hits: IntCounter,

    // Upstream GraphQL metrics
    pub upstream_requests: IntCounter,
    pub upstream_failures: IntCounter,
    pub upstream_latency: Histogram,

    pub gear_degradations: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let token_renewals = register(
            &registry,
            IntCounter::with_opts(Opts::new(
                "wcl_token_renewals_total",
                "Total number of OAuth client-credentials exchanges",
            )),
        )?;

        let token_cache_hits = register(
            &registry,
            IntCounter::with_opts(Opts::new(
                "wcl_token_cache_hits_total",
                "Total number of requests served by the cached access token",
            )),
        )?;

        let upstream_requests = register(
            &registry,
            IntCounter::with_opts(Opts::new(
                "wcl_upstream_requests_total",
                "Total number of GraphQL requests sent upstream",
            )),
        )?;

        let upstream_failures = register(
            &registry,
            IntCounter::with_opts(Opts::new(
                "wcl_upstream_failures_total",
                "Total number of GraphQL requests that failed",
            )),
        )?;

        let upstream_latency = register(
            &registry,
            Histogram::with_opts(
                HistogramOpts::new(
                    "wcl_upstream_latency_seconds",
                    "Duration of GraphQL requests in seconds",
                )
                .buckets(vec![
                    0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.0, 5.0, 10.0, 15.0,
                ]),
            ),
        )?;

        let gear_degradations = register(
            &registry,
            IntCounter::with_opts(Opts::new(
                "wcl_gear_degradations_total",
                "Total number of gear lookups answered with an empty gear list after a failure",
            )),
        )?;

        Ok(Self {
            registry: Arc::new(registry),
            token_renewals,
            token_cache_hits,
            upstream_requests,
            upstream_failures,
            upstream_latency,
            gear_degradations,
        })
    }

    pub fn record_token_renewal(&self) {
        self.token_renewals.inc();
    }

    pub fn record_token_cache_hit(&self) {
        self.token_cache_hits.inc();
    }

    pub fn record_upstream_request(&self) {
        self.upstream_requests.inc();
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures.inc();
    }

    /// Observe latency for a GraphQL request in seconds
    pub fn record_upstream_latency(&self, seconds: f64) {
        self.upstream_latency.observe(seconds);
    }

    pub fn record_gear_degradation(&self) {
        self.gear_degradations.inc();
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

fn register<M>(registry: &Registry, metric: prometheus::Result<M>) -> Result<M, AppError>
where
    M: Collector + Clone + 'static,
{
    let metric = metric
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create metric: {}", e)))?;
    registry
        .register(Box::new(metric.clone()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to register metric: {}", e)))?;
    Ok(metric)
}
