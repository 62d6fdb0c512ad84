//! # Prometheus Metrics
//!
//! Operational metrics for the ledger node, scraped at `/metrics` on the
//! metrics port. Everything lives in a dedicated registry under the
//! `wallet` prefix.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Prometheus handles for the node.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Invocations by `operation` and `outcome` (`ok` or an error kind).
    pub invocations_total: IntCounterVec,
    /// Commits lost to a concurrent invocation.
    pub commit_conflicts_total: IntCounter,
    /// Wallet records in the store.
    pub wallets: IntGauge,
    /// Invocation latency in seconds, by `operation`.
    pub invocation_latency_seconds: HistogramVec,
}

impl NodeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("wallet".into()), None)?;

        let invocations_total = IntCounterVec::new(
            Opts::new("invocations_total", "Ledger invocations by operation and outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(invocations_total.clone()))?;

        let commit_conflicts_total = IntCounter::new(
            "commit_conflicts_total",
            "Invocations aborted because a concurrent commit changed their read-set",
        )?;
        registry.register(Box::new(commit_conflicts_total.clone()))?;

        let wallets = IntGauge::new("wallets", "Number of wallet records in the store")?;
        registry.register(Box::new(wallets.clone()))?;

        let invocation_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "invocation_latency_seconds",
                "Time to execute and commit one invocation, in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
            &["operation"],
        )?;
        registry.register(Box::new(invocation_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            invocations_total,
            commit_conflicts_total,
            wallets,
            invocation_latency_seconds,
        })
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<NodeMetrics>;

/// `GET /metrics`.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
