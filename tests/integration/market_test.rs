//! Integration tests for market discovery and ranking

use market_scanner::config::{RankingStrategy, Thresholds};
use market_scanner::market::mock::{book, sample_market, sample_row, MockMarketSource};
use market_scanner::market::{aggregate_results, fetch_all_markets, ClobClient, CLOB_API_URL};
use market_scanner::ranking::{full_view, low_volatility_view, RankedRow};
use rust_decimal_macros::dec;

fn rewards(rows: &[RankedRow]) -> Vec<f64> {
    rows.iter().map(RankedRow::gm_reward_per_100).collect()
}

#[test]
fn test_clob_client_creation() {
    let client = ClobClient::new().unwrap();
    assert_eq!(client.config().base_url, CLOB_API_URL);
}

#[tokio::test]
async fn test_listing_follows_cursors() {
    let source = MockMarketSource::new().with_page_size(7);
    for i in 0..20 {
        source.add_market(sample_market(&format!("0x{:02}", i)));
    }

    let markets = fetch_all_markets(&source).await.unwrap();

    assert_eq!(markets.len(), 20);
    assert_eq!(markets[19].condition_id, "0x19");
    assert_eq!(source.page_requests(), 3);
}

#[tokio::test]
async fn test_aggregation_drops_missing_books() {
    let source = MockMarketSource::new();
    let quoted = sample_market("0xquoted");
    let missing = sample_market("0xmissing");
    source.set_book(book(
        &quoted.token1,
        &[(dec!(0.30), dec!(200))],
        &[(dec!(0.33), dec!(200))],
    ));

    let aggregation = aggregate_results(&source, &[quoted, missing], &Thresholds::default())
        .await
        .unwrap();

    assert_eq!(aggregation.results.len(), 1);
    assert_eq!(aggregation.unavailable, 1);
    assert_eq!(aggregation.results[0].spread, dec!(0.03));
}

#[test]
fn test_three_market_scenario() {
    let rows = vec![
        sample_row("0xa", 5.0, 10.0),
        sample_row("0xb", 10.0, 25.0),
        sample_row("0xc", 2.0, 15.0),
    ];

    assert_eq!(rewards(&full_view(&rows)), vec![10.0, 5.0, 2.0]);

    let low = low_volatility_view(&rows, &Thresholds::default(), RankingStrategy::Reward);
    assert_eq!(rewards(&low), vec![5.0, 2.0]);
    let sums: Vec<f64> = low.iter().map(|r| r.volatility_sum).collect();
    assert_eq!(sums, vec![10.0, 15.0]);
}

#[test]
fn test_custom_cutoff() {
    let rows = vec![sample_row("0xa", 5.0, 10.0), sample_row("0xb", 10.0, 25.0)];
    let thresholds = Thresholds {
        volatility_cutoff: 30.0,
        ..Thresholds::default()
    };
    let low = low_volatility_view(&rows, &thresholds, RankingStrategy::Reward);
    assert_eq!(rewards(&low), vec![10.0, 5.0]);
}
