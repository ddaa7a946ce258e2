//! In-memory market source for tests.
//!
//! Serves canned listings, books and price histories without network
//! access and counts the requests it receives.

use super::{Market, MarketPage, MarketResult, MarketSource, PricePoint};
use crate::model::{RewardQuote, VolatilityWindow};
use crate::ranking::RankedRow;
use crate::orderbook::{OrderBook, PriceLevel};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    markets: Vec<Market>,
    books: HashMap<String, OrderBook>,
    histories: HashMap<String, Vec<PricePoint>>,
    listing_error: Option<String>,
    failing_books: HashSet<String>,
    failing_histories: HashSet<String>,
    page_requests: usize,
    book_requests: usize,
    history_requests: usize,
}

/// Mock trading API
#[derive(Debug)]
pub struct MockMarketSource {
    page_size: usize,
    state: Mutex<MockState>,
}

impl MockMarketSource {
    /// Create an empty source serving up to 500 markets per page
    pub fn new() -> Self {
        Self {
            page_size: 500,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Change the listing page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// List a market
    pub fn add_market(&self, market: Market) {
        self.state().markets.push(market);
    }

    /// Serve `book` for its token
    pub fn set_book(&self, book: OrderBook) {
        self.state().books.insert(book.token_id.clone(), book);
    }

    /// Serve `history` for `token_id`
    pub fn set_history(&self, token_id: &str, history: Vec<PricePoint>) {
        self.state().histories.insert(token_id.to_string(), history);
    }

    /// Make every listing request fail with `message`
    pub fn fail_listing(&self, message: &str) {
        self.state().listing_error = Some(message.to_string());
    }

    /// Make book requests for `token_id` fail
    pub fn fail_book(&self, token_id: &str) {
        self.state().failing_books.insert(token_id.to_string());
    }

    /// Make history requests for `token_id` fail
    pub fn fail_history(&self, token_id: &str) {
        self.state().failing_histories.insert(token_id.to_string());
    }

    pub fn page_requests(&self) -> usize {
        self.state().page_requests
    }

    pub fn book_requests(&self) -> usize {
        self.state().book_requests
    }

    pub fn history_requests(&self) -> usize {
        self.state().history_requests
    }
}

impl Default for MockMarketSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketSource for MockMarketSource {
    async fn fetch_markets_page(&self, cursor: Option<&str>) -> anyhow::Result<MarketPage> {
        let mut state = self.state();
        state.page_requests += 1;
        if let Some(message) = &state.listing_error {
            anyhow::bail!("mock listing error: {}", message);
        }

        let start: usize = match cursor {
            Some(c) => c.parse()?,
            None => 0,
        };
        let end = (start + self.page_size).min(state.markets.len());
        let markets = state.markets.get(start..end).unwrap_or_default().to_vec();
        let next_cursor = (end < state.markets.len()).then(|| end.to_string());

        Ok(MarketPage {
            markets,
            next_cursor,
        })
    }

    async fn fetch_order_book(&self, token_id: &str) -> anyhow::Result<Option<OrderBook>> {
        let mut state = self.state();
        state.book_requests += 1;
        if state.failing_books.contains(token_id) {
            anyhow::bail!("mock book error for {}", token_id);
        }
        Ok(state.books.get(token_id).cloned())
    }

    async fn fetch_price_history(&self, token_id: &str) -> anyhow::Result<Vec<PricePoint>> {
        let mut state = self.state();
        state.history_requests += 1;
        if state.failing_histories.contains(token_id) {
            anyhow::bail!("mock history error for {}", token_id);
        }
        Ok(state.histories.get(token_id).cloned().unwrap_or_default())
    }
}

/// A market with tokens `{id}-yes` / `{id}-no`, 0.01 ticks, a 3c reward
/// spread and a 100 USDC daily pool
pub fn sample_market(condition_id: &str) -> Market {
    Market {
        condition_id: condition_id.to_string(),
        question: format!("Question {}?", condition_id),
        market_slug: format!("question-{}", condition_id),
        answer1: "Yes".to_string(),
        answer2: "No".to_string(),
        token1: format!("{}-yes", condition_id),
        token2: format!("{}-no", condition_id),
        tick_size: Decimal::new(1, 2),
        min_size: Decimal::from(50),
        max_spread: Decimal::from(3),
        rewards_daily_rate: Decimal::from(100),
        neg_risk: false,
        end_date_iso: Some("2030-01-01T00:00:00Z".to_string()),
    }
}

/// Build a book from `(price, size)` pairs
pub fn book(token_id: &str, bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> OrderBook {
    let levels = |side: &[(Decimal, Decimal)]| {
        side.iter()
            .map(|&(price, size)| PriceLevel { price, size })
            .collect()
    };
    OrderBook::from_levels(token_id, levels(bids), levels(asks))
}

/// Fixed epoch for generated histories
pub fn history_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// One sample every `step_minutes`, starting at [`history_start`]
pub fn history(prices: &[f64], step_minutes: i64) -> Vec<PricePoint> {
    let start = history_start();
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            timestamp: start + Duration::minutes(step_minutes * i as i64),
            price,
        })
        .collect()
}

/// A ranked row for [`sample_market`] with the given reward and a
/// volatility sum carried entirely by the 24h window
pub fn sample_row(condition_id: &str, gm_reward_per_100: f64, volatility_sum: f64) -> RankedRow {
    let result = MarketResult {
        market: sample_market(condition_id),
        best_bid: Decimal::new(48, 2),
        best_ask: Decimal::new(52, 2),
        spread: Decimal::new(4, 2),
        rewards: RewardQuote::from_sides(gm_reward_per_100, gm_reward_per_100),
    };
    let volatility = VolatilityWindow {
        twenty_four_hour: volatility_sum,
        volatility_price: 0.5,
        ..VolatilityWindow::default()
    };
    RankedRow::new(result, volatility)
}
