//! End-to-end integration tests

use market_scanner::config::{Config, RankingStrategy, Thresholds};
use market_scanner::data::{SnapshotWriter, Tabular};
use market_scanner::market::mock::{book, history, sample_market, sample_row, MockMarketSource};
use market_scanner::market::MarketResult;
use market_scanner::pipeline::{
    run_once, PipelineContext, FINAL_PROCESSED_MARKETS, LOW_VOLATILITY_MARKETS,
};
use market_scanner::ranking::{full_view, low_volatility_view, RankedRow};
use market_scanner::sheets::mock::RecordingWorksheet;
use market_scanner::sheets::{SheetMirror, SheetTarget};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const TS: &str = "20240315_080000";

/// `n` two-sided markets with distinct book depth. Every third market has a
/// flat history; the rest oscillate.
fn populated_source(n: usize) -> Arc<MockMarketSource> {
    let source = Arc::new(MockMarketSource::new().with_page_size(25));
    for i in 0..n {
        let market = sample_market(&format!("0x{:03}", i));
        let depth = Decimal::from(100 * (i as i64 + 1));
        source.set_book(book(
            &market.token1,
            &[(dec!(0.49), depth)],
            &[(dec!(0.51), depth)],
        ));

        let swing = 0.01 * (i % 3) as f64;
        let prices: Vec<f64> = (0..40)
            .map(|k| if k % 2 == 0 { 0.50 } else { 0.50 + swing })
            .collect();
        source.set_history(&market.token1, history(&prices, 10));
        source.add_market(market);
    }
    source
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

fn column(headers: &[String], name: &str) -> usize {
    headers.iter().position(|h| h == name).unwrap()
}

#[tokio::test]
async fn test_full_pipeline_with_mirror() {
    let dir = TempDir::new().unwrap();
    let source = populated_source(60);

    let all = RecordingWorksheet::new("All Markets");
    let volatility = RecordingWorksheet::new("Volatility Markets");
    let full_markets = RecordingWorksheet::new("Full Markets");
    let mirror = SheetMirror::new()
        .with_sheet(SheetTarget::AllMarkets, Box::new(all.clone()))
        .with_sheet(SheetTarget::VolatilityMarkets, Box::new(volatility.clone()))
        .with_sheet(SheetTarget::FullMarkets, Box::new(full_markets.clone()));

    let ctx = PipelineContext::new(source.clone(), SnapshotWriter::new(dir.path()))
        .with_mirror(mirror);
    let summary = run_once(&ctx, TS).await.unwrap();

    assert_eq!(summary.listed, 60);
    assert_eq!(summary.processed, 60);
    assert_eq!(summary.ranked, 60);
    assert_eq!(summary.low_volatility, 20);
    assert_eq!(summary.snapshots.len(), 5);
    assert_eq!(summary.sheets_updated, 3);
    assert_eq!(source.page_requests(), 3);
    assert_eq!(source.book_requests(), 60);
    assert_eq!(source.history_requests(), 60);

    assert_eq!(all.writes().len(), 1);
    assert_eq!(all.last_write().unwrap().len(), 61);
    assert_eq!(volatility.last_write().unwrap().len(), 21);
    let full_grid = full_markets.last_write().unwrap();
    assert_eq!(full_grid.len(), 61);
    assert_eq!(full_grid[0], MarketResult::HEADERS);
}

#[tokio::test]
async fn test_views_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    let ctx = PipelineContext::new(populated_source(30), SnapshotWriter::new(dir.path()));
    run_once(&ctx, TS).await.unwrap();

    let full_path = dir.path().join(format!("{}_{}.csv", FINAL_PROCESSED_MARKETS, TS));
    let (headers, rows) = read_csv(&full_path);
    assert_eq!(headers, RankedRow::HEADERS);
    assert_eq!(rows.len(), 30);

    let gm = column(&headers, "gm_reward_per_100");
    let rewards: Vec<f64> = rows.iter().map(|r| r[gm].parse().unwrap()).collect();
    assert!(rewards.windows(2).all(|w| w[0] >= w[1]));

    let low_path = dir.path().join(format!("{}_{}.csv", LOW_VOLATILITY_MARKETS, TS));
    let (headers, rows) = read_csv(&low_path);
    let sum = column(&headers, "volatility_sum");
    let ratio = column(&headers, "volatility/reward");
    assert_eq!(rows.len(), 10);
    for row in &rows {
        assert!(row[sum].parse::<f64>().unwrap() < 20.0);
        assert_eq!(row[ratio], "n/a");
    }
}

/// Rows read back from a view's CSV match the view's records, in order
fn assert_csv_matches(path: &Path, view: &[RankedRow]) {
    let (headers, rows) = read_csv(path);
    assert_eq!(headers, RankedRow::HEADERS);
    assert_eq!(rows.len(), view.len());
    for (i, (read, expected)) in rows.iter().zip(view).enumerate() {
        assert_eq!(read, &expected.record(), "row {} differs", i);
    }
}

#[test]
fn test_views_survive_csv_in_order() {
    let dir = TempDir::new().unwrap();
    let writer = SnapshotWriter::new(dir.path());

    // Equal rewards at several volatilities, so row order depends on the tie-break
    let rows = vec![
        sample_row("0xtie_high", 4.0, 18.5),
        sample_row("0xbest", 9.0, 25.0),
        sample_row("0xtie_low", 4.0, 3.25),
        sample_row("0xtie_mid", 4.0, 11.0),
        sample_row("0xcalm", 1.5, 0.0),
        sample_row("0xwild", 4.0, 40.0),
    ];
    let full = full_view(&rows);
    let low = low_volatility_view(&rows, &Thresholds::default(), RankingStrategy::Reward);

    let full_path = writer.write(&full, FINAL_PROCESSED_MARKETS, TS).unwrap();
    let low_path = writer.write(&low, LOW_VOLATILITY_MARKETS, TS).unwrap();

    assert_csv_matches(&full_path, &full);
    assert_csv_matches(&low_path, &low);

    let ids: Vec<&str> = low.iter().map(RankedRow::condition_id).collect();
    assert_eq!(ids, vec!["0xtie_low", "0xtie_mid", "0xtie_high", "0xcalm"]);
}

#[tokio::test]
async fn test_volatility_sum_is_three_windows() {
    let dir = TempDir::new().unwrap();
    let ctx = PipelineContext::new(populated_source(6), SnapshotWriter::new(dir.path()));
    run_once(&ctx, TS).await.unwrap();

    let path = dir.path().join(format!("{}_{}.csv", FINAL_PROCESSED_MARKETS, TS));
    let (headers, rows) = read_csv(&path);
    let value = |row: &Vec<String>, name: &str| -> f64 {
        row[column(&headers, name)].parse().unwrap()
    };
    for row in &rows {
        let expected = value(row, "24_hour") + value(row, "7_day") + value(row, "14_day");
        assert!((value(row, "volatility_sum") - expected).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_small_run_skips_mirror() {
    let dir = TempDir::new().unwrap();
    let sheet = RecordingWorksheet::new("All Markets");
    let mirror = SheetMirror::new().with_sheet(SheetTarget::AllMarkets, Box::new(sheet.clone()));
    let ctx = PipelineContext::new(populated_source(50), SnapshotWriter::new(dir.path()))
        .with_mirror(mirror);

    let summary = run_once(&ctx, TS).await.unwrap();

    assert_eq!(summary.ranked, 50);
    assert_eq!(summary.sheets_updated, 0);
    assert!(sheet.writes().is_empty());
}

#[tokio::test]
async fn test_composite_strategy_keeps_low_volatility_set() {
    let dir = TempDir::new().unwrap();
    let ctx = PipelineContext::new(populated_source(12), SnapshotWriter::new(dir.path()))
        .with_strategy(RankingStrategy::Composite)
        .with_thresholds(Thresholds::default());

    let summary = run_once(&ctx, TS).await.unwrap();
    assert_eq!(summary.low_volatility, 4);
}

#[tokio::test]
async fn test_empty_listing_writes_headers_only() {
    let dir = TempDir::new().unwrap();
    let ctx = PipelineContext::new(
        Arc::new(MockMarketSource::new()),
        SnapshotWriter::new(dir.path()),
    );
    let summary = run_once(&ctx, TS).await.unwrap();

    assert_eq!(summary.snapshots.len(), 5);
    let path = dir.path().join(format!("{}_{}.csv", LOW_VOLATILITY_MARKETS, TS));
    let (headers, rows) = read_csv(&path);
    assert_eq!(headers.len(), 30);
    assert!(rows.is_empty());
}

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.schedule.interval_secs, 3600);
    assert_eq!(config.thresholds.mirror_min_rows, 50);
    assert!(!config.sheets.enabled);
}
