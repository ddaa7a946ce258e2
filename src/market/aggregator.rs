//! Per-market order book results

use super::{Market, MarketSource};
use crate::config::Thresholds;
use crate::data::Tabular;
use crate::model::{estimate_rewards, RewardParams, RewardQuote};
use crate::orderbook::OrderBook;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A market joined with its book-derived pricing and reward estimate
#[derive(Debug, Clone, PartialEq)]
pub struct MarketResult {
    pub market: Market,
    /// Best bid of the first token, zero when the side is empty
    pub best_bid: Decimal,
    /// Best ask of the first token, zero when the side is empty
    pub best_ask: Decimal,
    /// `|best_ask - best_bid|`
    pub spread: Decimal,
    pub rewards: RewardQuote,
}

impl MarketResult {
    /// Join a market with its first token's book
    pub fn from_book(market: Market, book: &OrderBook, maker_reward_share: f64) -> Self {
        let best_bid = book.best_bid().unwrap_or(Decimal::ZERO);
        let best_ask = book.best_ask().unwrap_or(Decimal::ZERO);
        let params = RewardParams {
            tick_size: market.tick_size,
            max_spread: market.max_spread,
            daily_rate: market.rewards_daily_rate.to_f64().unwrap_or(0.0) * maker_reward_share,
        };
        let rewards = estimate_rewards(book, &params);

        Self {
            market,
            best_bid,
            best_ask,
            spread: (best_ask - best_bid).abs(),
            rewards,
        }
    }

    /// Both sides of the book are quoted
    pub fn has_two_sided_pricing(&self) -> bool {
        self.best_bid > Decimal::ZERO && self.best_ask > Decimal::ZERO
    }
}

impl Tabular for MarketResult {
    const HEADERS: &'static [&'static str] = &[
        "question",
        "answer1",
        "answer2",
        "spread",
        "rewards_daily_rate",
        "gm_reward_per_100",
        "sm_reward_per_100",
        "bid_reward_per_100",
        "ask_reward_per_100",
        "min_size",
        "best_bid",
        "best_ask",
        "max_spread",
        "tick_size",
        "neg_risk",
        "market_slug",
        "end_date_iso",
        "token1",
        "token2",
        "condition_id",
    ];

    fn record(&self) -> Vec<String> {
        let m = &self.market;
        vec![
            m.question.clone(),
            m.answer1.clone(),
            m.answer2.clone(),
            self.spread.to_string(),
            m.rewards_daily_rate.to_string(),
            self.rewards.gm_reward_per_100.to_string(),
            self.rewards.sm_reward_per_100.to_string(),
            self.rewards.bid_reward_per_100.to_string(),
            self.rewards.ask_reward_per_100.to_string(),
            m.min_size.to_string(),
            self.best_bid.to_string(),
            self.best_ask.to_string(),
            m.max_spread.to_string(),
            m.tick_size.to_string(),
            m.neg_risk.to_string(),
            m.market_slug.clone(),
            m.end_date_iso.clone().unwrap_or_default(),
            m.token1.clone(),
            m.token2.clone(),
            m.condition_id.clone(),
        ]
    }
}

/// Output of the aggregation stage
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// One row per market that had a book, in listing order
    pub results: Vec<MarketResult>,
    /// Rows with two-sided pricing, best `gm_reward_per_100` first
    pub processed: Vec<MarketResult>,
    /// Markets dropped because the API had no usable book
    pub unavailable: usize,
}

/// Fetch every market's book in turn and estimate its rewards.
///
/// Markets without a book (or with an empty one) are dropped; any other API
/// error aborts the stage.
pub async fn aggregate_results(
    source: &dyn MarketSource,
    markets: &[Market],
    thresholds: &Thresholds,
) -> anyhow::Result<Aggregation> {
    let mut aggregation = Aggregation::default();

    for market in markets {
        let book = match source.fetch_order_book(&market.token1).await? {
            Some(book) if !book.is_empty() => book,
            _ => {
                tracing::debug!(
                    condition_id = %market.condition_id,
                    token_id = %market.token1,
                    "No order book, dropping market"
                );
                aggregation.unavailable += 1;
                continue;
            }
        };

        aggregation.results.push(MarketResult::from_book(
            market.clone(),
            &book,
            thresholds.maker_reward_share,
        ));
    }

    let mut processed: Vec<MarketResult> = aggregation
        .results
        .iter()
        .filter(|r| r.has_two_sided_pricing())
        .cloned()
        .collect();
    processed.sort_by(|a, b| {
        b.rewards
            .gm_reward_per_100
            .total_cmp(&a.rewards.gm_reward_per_100)
    });
    aggregation.processed = processed;

    tracing::info!(
        results = aggregation.results.len(),
        processed = aggregation.processed.len(),
        unavailable = aggregation.unavailable,
        "Aggregated order book results"
    );
    Ok(aggregation)
}
