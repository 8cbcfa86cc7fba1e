//! Prometheus metrics for the service.
//!
//! [`init_metrics`] installs the global recorder once; [`metrics_handler`]
//! renders it on `/metrics`. The `record_*` helpers name the engine's
//! business metrics so handlers and the scan loop share one vocabulary.

use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use imperium_lib::{QueueKind, ScanReport, ShipClass};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` (default true) and `METRICS_PATH`.
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());
        Self { enabled, path }
    }
}

/// Install the Prometheus recorder.
///
/// # Errors
///
/// Fails when metrics are disabled, when a recorder is already installed, or
/// when the exporter cannot be built.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// `GET /metrics` in Prometheus exposition format.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => write!(f, "failed to install metrics recorder: {e}"),
        }
    }
}

impl std::error::Error for MetricsError {}

pub fn record_blueprint_calculated(class: ShipClass) {
    metrics::counter!(
        "imperium_blueprints_calculated_total",
        "ship_class" => class.as_str()
    )
    .increment(1);
}

/// `reason` is one of the labels produced by [`crate::error_reason`].
pub fn record_blueprint_rejected(reason: &'static str) {
    metrics::counter!("imperium_blueprints_rejected_total", "reason" => reason).increment(1);
}

pub fn record_construction_queued(kind: QueueKind, quantity: u32) {
    metrics::counter!("imperium_construction_queued_total", "kind" => kind.as_str())
        .increment(u64::from(quantity));
}

pub fn record_research_started(research_level: u32) {
    metrics::counter!(
        "imperium_research_started_total",
        "level" => research_level.to_string()
    )
    .increment(1);
}

pub fn record_research_failed(reason: &'static str) {
    metrics::counter!("imperium_research_failed_total", "reason" => reason).increment(1);
}

/// Record one construction scan pass.
pub fn record_scan(report: &ScanReport, elapsed: Duration) {
    metrics::histogram!("imperium_scan_duration_seconds").record(elapsed.as_secs_f64());
    metrics::counter!("imperium_construction_completed_total")
        .increment(report.completed as u64);
    metrics::counter!("imperium_construction_skipped_total").increment(report.skipped as u64);
    metrics::counter!("imperium_construction_failed_total").increment(report.failed as u64);
    metrics::gauge!("imperium_construction_pending").set(report.not_due as f64);
}
