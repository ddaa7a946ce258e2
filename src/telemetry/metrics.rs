//! Prometheus metrics

use std::net::SocketAddr;
use std::time::Duration;

/// Duration metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One full pipeline run
    PipelineRun,
    /// Market listing across all pages
    MarketFetch,
    /// Order book aggregation stage
    Aggregation,
    /// Volatility derivation stage
    MetricDerivation,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Markets in the listing
    ListedMarkets,
    /// Markets with two-sided pricing
    ProcessedMarkets,
    /// Rows in the full view
    RankedMarkets,
    /// Rows in the low-volatility view
    LowVolatilityMarkets,
    /// Unix time of the last successful run
    LastSuccessTimestamp,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Runs that completed
    RunsSucceeded,
    /// Runs that returned an error
    RunsFailed,
    /// Snapshot files that could not be written
    SnapshotFailures,
    /// Worksheets written
    SheetsUpdated,
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::PipelineRun => "market_scanner_run_duration_seconds",
            LatencyMetric::MarketFetch => "market_scanner_market_fetch_seconds",
            LatencyMetric::Aggregation => "market_scanner_aggregation_seconds",
            LatencyMetric::MetricDerivation => "market_scanner_metric_derivation_seconds",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::ListedMarkets => "market_scanner_listed_markets",
            GaugeMetric::ProcessedMarkets => "market_scanner_processed_markets",
            GaugeMetric::RankedMarkets => "market_scanner_ranked_markets",
            GaugeMetric::LowVolatilityMarkets => "market_scanner_low_volatility_markets",
            GaugeMetric::LastSuccessTimestamp => "market_scanner_last_success_timestamp",
        }
    }
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::RunsSucceeded => "market_scanner_runs_succeeded_total",
            CounterMetric::RunsFailed => "market_scanner_runs_failed_total",
            CounterMetric::SnapshotFailures => "market_scanner_snapshot_failures_total",
            CounterMetric::SheetsUpdated => "market_scanner_sheets_updated_total",
        }
    }
}

/// Record a duration measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(metric.name()).record(duration.as_secs_f64());
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Increment a counter
pub fn increment(metric: CounterMetric, by: u64) {
    metrics::counter!(metric.name()).increment(by);
}

/// Serve `/metrics` on `port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(addr = %addr, "Prometheus exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        let names = [
            LatencyMetric::PipelineRun.name(),
            GaugeMetric::LastSuccessTimestamp.name(),
            CounterMetric::SnapshotFailures.name(),
        ];
        assert!(names.iter().all(|n| n.starts_with("market_scanner_")));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_latency(LatencyMetric::Aggregation, Duration::from_millis(5));
        set_gauge(GaugeMetric::RankedMarkets, 3.0);
        increment(CounterMetric::RunsSucceeded, 1);
    }
}
