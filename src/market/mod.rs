//! Market discovery module
//!
//! Lists reward-eligible markets from the CLOB REST API and turns their
//! order books into per-market reward figures.

mod aggregator;
mod clob;
mod fetcher;
pub mod mock;

pub use aggregator::{aggregate_results, Aggregation, MarketResult};
pub use clob::{ClobClient, ClobConfig, ClobError, CLOB_API_URL, USDC_ADDRESS};
pub use fetcher::fetch_all_markets;

use crate::data::Tabular;
use crate::orderbook::OrderBook;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A binary market listed for liquidity rewards
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    /// Unique condition identifier
    pub condition_id: String,
    /// Market question
    pub question: String,
    /// URL slug
    pub market_slug: String,
    /// Outcome label of the first token
    pub answer1: String,
    /// Outcome label of the second token
    pub answer2: String,
    /// First token identifier
    pub token1: String,
    /// Second token identifier
    pub token2: String,
    /// Minimum price increment
    pub tick_size: Decimal,
    /// Minimum order size that qualifies for rewards
    pub min_size: Decimal,
    /// Maximum distance from the midpoint that earns rewards, in cents
    pub max_spread: Decimal,
    /// Daily USDC reward pool for the market
    pub rewards_daily_rate: Decimal,
    /// Whether the market belongs to a negative-risk event
    pub neg_risk: bool,
    /// Resolution date as reported by the API
    pub end_date_iso: Option<String>,
}

impl Tabular for Market {
    const HEADERS: &'static [&'static str] = &[
        "condition_id",
        "question",
        "market_slug",
        "answer1",
        "answer2",
        "token1",
        "token2",
        "tick_size",
        "min_size",
        "max_spread",
        "rewards_daily_rate",
        "neg_risk",
        "end_date_iso",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.condition_id.clone(),
            self.question.clone(),
            self.market_slug.clone(),
            self.answer1.clone(),
            self.answer2.clone(),
            self.token1.clone(),
            self.token2.clone(),
            self.tick_size.to_string(),
            self.min_size.to_string(),
            self.max_spread.to_string(),
            self.rewards_daily_rate.to_string(),
            self.neg_risk.to_string(),
            self.end_date_iso.clone().unwrap_or_default(),
        ]
    }
}

/// One page of the market listing
#[derive(Debug, Clone, Default)]
pub struct MarketPage {
    pub markets: Vec<Market>,
    /// Cursor for the following page; `None` once the listing is exhausted
    pub next_cursor: Option<String>,
}

/// A single historical price sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Read-only access to the trading API
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch one page of the market listing starting at `cursor`
    async fn fetch_markets_page(&self, cursor: Option<&str>) -> anyhow::Result<MarketPage>;
    /// Fetch a token's book; `None` when the API has no book for it
    async fn fetch_order_book(&self, token_id: &str) -> anyhow::Result<Option<OrderBook>>;
    /// Fetch a token's price history, oldest first
    async fn fetch_price_history(&self, token_id: &str) -> anyhow::Result<Vec<PricePoint>>;
}
