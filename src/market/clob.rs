//! CLOB REST client
//!
//! Lists reward-eligible markets (`/sampling-markets`), per-token order books
//! (`/book`) and per-token price history (`/prices-history`). All endpoints
//! used here are public and need no API credentials.

use super::{Market, MarketPage, MarketSource, PricePoint};
use crate::config::ApiConfig;
use crate::orderbook::{OrderBook, PriceLevel};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// CLOB API base URL
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";

/// Polygon USDC; the reward rate paid in this asset is the one reported
pub const USDC_ADDRESS: &str = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174";

/// Cursor the API returns once the listing is exhausted
const END_CURSOR: &str = "LTE=";

/// CLOB API errors
#[derive(Debug, Error)]
pub enum ClobError {
    /// Non-success HTTP status
    #[error("CLOB {endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    /// A field could not be parsed
    #[error("CLOB {endpoint} returned malformed {field}: {value}")]
    Malformed {
        endpoint: &'static str,
        field: &'static str,
        value: String,
    },
}

/// Configuration for the CLOB client
#[derive(Debug, Clone)]
pub struct ClobConfig {
    /// Base URL for the CLOB API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// `interval` parameter of `/prices-history`
    pub history_interval: String,
    /// `fidelity` parameter of `/prices-history`, in minutes
    pub history_fidelity: u32,
}

impl Default for ClobConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ClobConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.clob_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(api.timeout_secs),
            history_interval: api.history_interval.clone(),
            history_fidelity: api.history_fidelity,
        }
    }
}

/// Client for the Polymarket CLOB REST API
pub struct ClobClient {
    config: ClobConfig,
    client: Client,
}

impl ClobClient {
    /// Create a client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(ClobConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClobConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClobConfig {
        &self.config
    }
}

#[async_trait]
impl MarketSource for ClobClient {
    async fn fetch_markets_page(&self, cursor: Option<&str>) -> anyhow::Result<MarketPage> {
        let url = format!("{}/sampling-markets", self.config.base_url);
        tracing::debug!(url = %url, cursor = ?cursor, "Fetching market page");

        let mut request = self.client.get(&url);
        if let Some(cursor) = cursor {
            request = request.query(&[("next_cursor", cursor)]);
        }
        let response = ensure_success("/sampling-markets", request.send().await?).await?;
        let page: WireMarketPage = response.json().await?;

        let total = page.data.len();
        let markets: Vec<Market> = page.data.into_iter().filter_map(convert_market).collect();
        if markets.len() < total {
            tracing::debug!(
                skipped = total - markets.len(),
                "Skipped listed markets without two tokens"
            );
        }

        Ok(MarketPage {
            markets,
            next_cursor: page
                .next_cursor
                .filter(|c| !c.is_empty() && c != END_CURSOR),
        })
    }

    async fn fetch_order_book(&self, token_id: &str) -> anyhow::Result<Option<OrderBook>> {
        let url = format!("{}/book", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("token_id", token_id)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success("/book", response).await?;
        let book: WireBook = response.json().await?;

        Ok(Some(OrderBook::from_levels(
            token_id,
            parse_levels(&book.bids)?,
            parse_levels(&book.asks)?,
        )))
    }

    async fn fetch_price_history(&self, token_id: &str) -> anyhow::Result<Vec<PricePoint>> {
        let url = format!("{}/prices-history", self.config.base_url);
        let fidelity = self.config.history_fidelity.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("interval", self.config.history_interval.as_str()),
                ("market", token_id),
                ("fidelity", fidelity.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success("/prices-history", response).await?;
        let history: WireHistory = response.json().await?;

        history
            .history
            .into_iter()
            .map(|point| {
                let timestamp = Utc.timestamp_opt(point.t, 0).single().ok_or_else(|| {
                    ClobError::Malformed {
                        endpoint: "/prices-history",
                        field: "t",
                        value: point.t.to_string(),
                    }
                })?;
                Ok(PricePoint {
                    timestamp,
                    price: point.p,
                })
            })
            .collect()
    }
}

async fn ensure_success(endpoint: &'static str, response: Response) -> Result<Response, ClobError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClobError::Status {
        endpoint,
        status,
        body,
    })
}

/// `/sampling-markets` response
#[derive(Debug, Deserialize)]
struct WireMarketPage {
    #[serde(default)]
    data: Vec<WireMarket>,
    next_cursor: Option<String>,
}

/// Market as listed by the CLOB
#[derive(Debug, Deserialize)]
struct WireMarket {
    condition_id: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    market_slug: String,
    end_date_iso: Option<String>,
    #[serde(default)]
    neg_risk: bool,
    minimum_tick_size: Option<Decimal>,
    #[serde(default)]
    tokens: Vec<WireToken>,
    rewards: Option<WireRewards>,
}

#[derive(Debug, Deserialize)]
struct WireToken {
    token_id: String,
    #[serde(default)]
    outcome: String,
}

#[derive(Debug, Default, Deserialize)]
struct WireRewards {
    #[serde(default)]
    rates: Option<Vec<WireRate>>,
    min_size: Option<Decimal>,
    max_spread: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct WireRate {
    asset_address: String,
    rewards_daily_rate: Decimal,
}

/// `/book` response
#[derive(Debug, Deserialize)]
struct WireBook {
    #[serde(default)]
    bids: Vec<WireLevel>,
    #[serde(default)]
    asks: Vec<WireLevel>,
}

/// Price level; the API sends both fields as strings
#[derive(Debug, Deserialize)]
struct WireLevel {
    price: String,
    size: String,
}

/// `/prices-history` response
#[derive(Debug, Deserialize)]
struct WireHistory {
    #[serde(default)]
    history: Vec<WirePoint>,
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    t: i64,
    p: f64,
}

/// Convert a listed market; `None` unless it has two tokens
fn convert_market(wire: WireMarket) -> Option<Market> {
    let mut tokens = wire.tokens.into_iter();
    let first = tokens.next()?;
    let second = tokens.next()?;

    let rewards = wire.rewards.unwrap_or_default();
    let rewards_daily_rate = rewards
        .rates
        .unwrap_or_default()
        .into_iter()
        .find(|r| r.asset_address.eq_ignore_ascii_case(USDC_ADDRESS))
        .map(|r| r.rewards_daily_rate)
        .unwrap_or(Decimal::ZERO);

    Some(Market {
        condition_id: wire.condition_id,
        question: wire.question,
        market_slug: wire.market_slug,
        answer1: first.outcome,
        answer2: second.outcome,
        token1: first.token_id,
        token2: second.token_id,
        tick_size: wire.minimum_tick_size.unwrap_or(Decimal::new(1, 2)),
        min_size: rewards.min_size.unwrap_or(Decimal::ZERO),
        max_spread: rewards.max_spread.unwrap_or(Decimal::ZERO),
        rewards_daily_rate,
        neg_risk: wire.neg_risk,
        end_date_iso: wire.end_date_iso,
    })
}

fn parse_levels(levels: &[WireLevel]) -> Result<Vec<PriceLevel>, ClobError> {
    levels
        .iter()
        .map(|level| {
            Ok(PriceLevel {
                price: parse_decimal("price", &level.price)?,
                size: parse_decimal("size", &level.size)?,
            })
        })
        .collect()
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, ClobError> {
    Decimal::from_str(value).map_err(|_| ClobError::Malformed {
        endpoint: "/book",
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MARKET_JSON: &str = r#"{
        "condition_id": "0xabc",
        "question": "Will it rain tomorrow?",
        "market_slug": "will-it-rain-tomorrow",
        "end_date_iso": "2025-01-01T00:00:00Z",
        "neg_risk": true,
        "minimum_order_size": 5,
        "minimum_tick_size": 0.001,
        "tokens": [
            {"token_id": "111", "outcome": "Yes", "price": 0.41},
            {"token_id": "222", "outcome": "No", "price": 0.59}
        ],
        "rewards": {
            "rates": [
                {"asset_address": "0xOTHER", "rewards_daily_rate": 99},
                {"asset_address": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", "rewards_daily_rate": 25}
            ],
            "min_size": 100,
            "max_spread": 3.5
        },
        "active": true,
        "closed": false
    }"#;

    #[test]
    fn test_clob_config_default() {
        let config = ClobConfig::default();
        assert_eq!(config.base_url, CLOB_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.history_interval, "1m");
        assert_eq!(config.history_fidelity, 10);
    }

    #[test]
    fn test_clob_config_trims_trailing_slash() {
        let api = ApiConfig {
            clob_url: "https://clob.example.com/".to_string(),
            ..ApiConfig::default()
        };
        let client = ClobClient::with_config(ClobConfig::from(&api)).unwrap();
        assert_eq!(client.config().base_url, "https://clob.example.com");
    }

    #[test]
    fn test_convert_market() {
        let wire: WireMarket = serde_json::from_str(MARKET_JSON).unwrap();
        let market = convert_market(wire).unwrap();

        assert_eq!(market.condition_id, "0xabc");
        assert_eq!(market.answer1, "Yes");
        assert_eq!(market.answer2, "No");
        assert_eq!(market.token1, "111");
        assert_eq!(market.token2, "222");
        assert_eq!(market.tick_size, dec!(0.001));
        assert_eq!(market.min_size, dec!(100));
        assert_eq!(market.max_spread, dec!(3.5));
        assert_eq!(market.rewards_daily_rate, dec!(25));
        assert!(market.neg_risk);
    }

    #[test]
    fn test_convert_market_without_rewards() {
        let json = r#"{
            "condition_id": "0xdef",
            "question": "Q",
            "tokens": [{"token_id": "1", "outcome": "Up"}, {"token_id": "2", "outcome": "Down"}],
            "rewards": null
        }"#;
        let wire: WireMarket = serde_json::from_str(json).unwrap();
        let market = convert_market(wire).unwrap();
        assert_eq!(market.rewards_daily_rate, Decimal::ZERO);
        assert_eq!(market.max_spread, Decimal::ZERO);
        assert_eq!(market.tick_size, dec!(0.01));
    }

    #[test]
    fn test_convert_market_single_token() {
        let json = r#"{"condition_id": "0x1", "tokens": [{"token_id": "1", "outcome": "Yes"}]}"#;
        let wire: WireMarket = serde_json::from_str(json).unwrap();
        assert!(convert_market(wire).is_none());
    }

    #[test]
    fn test_page_cursor_parsing() {
        let json = format!(r#"{{"data": [{}], "next_cursor": "MTAw", "count": 1}}"#, MARKET_JSON);
        let page: WireMarketPage = serde_json::from_str(&json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("MTAw"));
    }

    #[test]
    fn test_parse_levels() {
        let book: WireBook = serde_json::from_str(
            r#"{"market": "0xabc", "asset_id": "111",
                "bids": [{"price": "0.40", "size": "120.5"}],
                "asks": [{"price": "0.45", "size": "30"}]}"#,
        )
        .unwrap();
        let bids = parse_levels(&book.bids).unwrap();
        assert_eq!(bids[0].price, dec!(0.40));
        assert_eq!(bids[0].size, dec!(120.5));
        assert_eq!(parse_levels(&book.asks).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_levels_malformed() {
        let levels = vec![WireLevel {
            price: "abc".to_string(),
            size: "1".to_string(),
        }];
        let err = parse_levels(&levels).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_history_parsing() {
        let history: WireHistory =
            serde_json::from_str(r#"{"history": [{"t": 1700000000, "p": 0.42}]}"#).unwrap();
        assert_eq!(history.history.len(), 1);
        assert_eq!(history.history[0].t, 1_700_000_000);

        let empty: WireHistory = serde_json::from_str("{}").unwrap();
        assert!(empty.history.is_empty());
    }
}
