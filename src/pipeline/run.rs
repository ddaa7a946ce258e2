//! One end-to-end scan: fetch, aggregate, derive, rank, persist, mirror

use super::PipelineContext;
use crate::data::{SnapshotWriter, Tabular};
use crate::market::{aggregate_results, fetch_all_markets};
use crate::ranking::{derive_rows, full_view, low_volatility_view};
use crate::telemetry::{
    increment, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use std::path::PathBuf;
use std::time::Instant;

/// Snapshot file prefixes, in the order they are written
pub const ALL_MARKETS_RAW: &str = "all_markets_raw";
pub const ALL_RESULTS_ORDERBOOK: &str = "all_results_orderbook";
pub const PROCESSED_MARKETS: &str = "processed_markets";
pub const FINAL_PROCESSED_MARKETS: &str = "final_processed_markets";
pub const LOW_VOLATILITY_MARKETS: &str = "low_volatility_markets";

/// What one run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub timestamp: String,
    pub listed: usize,
    pub results: usize,
    pub processed: usize,
    pub ranked: usize,
    pub low_volatility: usize,
    /// Snapshot files written, in write order
    pub snapshots: Vec<PathBuf>,
    pub snapshot_failures: usize,
    /// Worksheets written; zero when the mirror was skipped
    pub sheets_updated: usize,
}

/// Collects snapshot outcomes for the summary
struct Persister<'a> {
    writer: &'a SnapshotWriter,
    timestamp: &'a str,
    written: Vec<PathBuf>,
    failures: usize,
}

impl<'a> Persister<'a> {
    fn save<T: Tabular>(&mut self, rows: &[T], prefix: &str) {
        match self.writer.save(rows, prefix, self.timestamp) {
            Some(path) => self.written.push(path),
            None => {
                self.failures += 1;
                increment(CounterMetric::SnapshotFailures, 1);
            }
        }
    }
}

/// Run the whole pipeline once, stamping every snapshot with `timestamp`.
///
/// Snapshot failures are logged and counted; any other failure aborts the
/// run with whatever was already written left in place.
pub async fn run_once(ctx: &PipelineContext, timestamp: &str) -> anyhow::Result<RunSummary> {
    let started = Instant::now();
    let source = ctx.source.as_ref();
    let mut persister = Persister {
        writer: &ctx.snapshots,
        timestamp,
        written: Vec::new(),
        failures: 0,
    };

    let stage = Instant::now();
    let markets = fetch_all_markets(source).await?;
    record_latency(LatencyMetric::MarketFetch, stage.elapsed());
    set_gauge(GaugeMetric::ListedMarkets, markets.len() as f64);
    persister.save(&markets, ALL_MARKETS_RAW);

    let stage = Instant::now();
    let aggregation = aggregate_results(source, &markets, &ctx.thresholds).await?;
    record_latency(LatencyMetric::Aggregation, stage.elapsed());
    set_gauge(GaugeMetric::ProcessedMarkets, aggregation.processed.len() as f64);
    persister.save(&aggregation.results, ALL_RESULTS_ORDERBOOK);
    persister.save(&aggregation.processed, PROCESSED_MARKETS);

    let stage = Instant::now();
    let rows = derive_rows(source, &aggregation.processed).await?;
    record_latency(LatencyMetric::MetricDerivation, stage.elapsed());

    let full = full_view(&rows);
    let low_volatility =
        low_volatility_view(&rows, &ctx.thresholds, ctx.low_volatility_strategy);
    set_gauge(GaugeMetric::RankedMarkets, full.len() as f64);
    set_gauge(GaugeMetric::LowVolatilityMarkets, low_volatility.len() as f64);
    persister.save(&full, FINAL_PROCESSED_MARKETS);
    persister.save(&low_volatility, LOW_VOLATILITY_MARKETS);

    let mut sheets_updated = 0;
    match &ctx.mirror {
        Some(mirror) if full.len() > ctx.thresholds.mirror_min_rows => {
            sheets_updated = mirror
                .publish(&full, &low_volatility, &aggregation.processed)
                .await?;
            increment(CounterMetric::SheetsUpdated, sheets_updated as u64);
        }
        Some(_) => tracing::info!(
            rows = full.len(),
            min_rows = ctx.thresholds.mirror_min_rows,
            "Not updating worksheets, too few rows"
        ),
        None => tracing::debug!("Worksheet mirror disabled"),
    }

    record_latency(LatencyMetric::PipelineRun, started.elapsed());
    tracing::info!(
        timestamp,
        listed = markets.len(),
        processed = aggregation.processed.len(),
        ranked = full.len(),
        low_volatility = low_volatility.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Pipeline run complete"
    );

    Ok(RunSummary {
        timestamp: timestamp.to_string(),
        listed: markets.len(),
        results: aggregation.results.len(),
        processed: aggregation.processed.len(),
        ranked: full.len(),
        low_volatility: low_volatility.len(),
        snapshots: persister.written,
        snapshot_failures: persister.failures,
        sheets_updated,
    })
}
