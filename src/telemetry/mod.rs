//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{
    increment, init_metrics, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, LogFormat::from_json_flag(config.json_logs))?;

    if let Some(port) = config.metrics_port {
        init_metrics(port)?;
    }

    Ok(())
}
