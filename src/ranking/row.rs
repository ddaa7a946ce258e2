//! Ranked rows: a processed market joined with its volatility windows

use crate::data::Tabular;
use crate::market::{MarketResult, MarketSource};
use crate::model::{round_dp, Lookback, VolatilityEstimator, VolatilityWindow};

/// Text written when the volatility/reward ratio is undefined
pub const RATIO_UNDEFINED: &str = "n/a";

/// One fully derived row of the final views
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub result: MarketResult,
    pub volatility: VolatilityWindow,
    /// 24h + 7d + 14d
    pub volatility_sum: f64,
    /// `gm_reward_per_100 / volatility_sum` as text, or [`RATIO_UNDEFINED`]
    pub volatility_reward: String,
}

impl RankedRow {
    pub fn new(result: MarketResult, volatility: VolatilityWindow) -> Self {
        let volatility_sum = round_dp(volatility.sum(), 2);
        let volatility_reward =
            volatility_reward_text(result.rewards.gm_reward_per_100, volatility_sum);
        Self {
            result,
            volatility,
            volatility_sum,
            volatility_reward,
        }
    }

    pub fn gm_reward_per_100(&self) -> f64 {
        self.result.rewards.gm_reward_per_100
    }

    pub fn condition_id(&self) -> &str {
        &self.result.market.condition_id
    }
}

/// Reward per unit of volatility, rounded to 2 dp
pub fn volatility_reward_text(gm_reward_per_100: f64, volatility_sum: f64) -> String {
    if volatility_sum == 0.0 {
        return RATIO_UNDEFINED.to_string();
    }
    let ratio = gm_reward_per_100 / volatility_sum;
    if !ratio.is_finite() {
        return RATIO_UNDEFINED.to_string();
    }
    round_dp(ratio, 2).to_string()
}

impl Tabular for RankedRow {
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
        "volatility_sum",
        "volatility/reward",
        "min_size",
        "1_hour",
        "3_hour",
        "6_hour",
        "12_hour",
        "24_hour",
        "7_day",
        "14_day",
        "30_day",
        "best_bid",
        "best_ask",
        "volatility_price",
        "max_spread",
        "tick_size",
        "neg_risk",
        "market_slug",
        "token1",
        "token2",
        "condition_id",
    ];

    fn record(&self) -> Vec<String> {
        let r = &self.result;
        let m = &r.market;
        let mut record = vec![
            m.question.clone(),
            m.answer1.clone(),
            m.answer2.clone(),
            r.spread.to_string(),
            m.rewards_daily_rate.to_string(),
            r.rewards.gm_reward_per_100.to_string(),
            r.rewards.sm_reward_per_100.to_string(),
            r.rewards.bid_reward_per_100.to_string(),
            r.rewards.ask_reward_per_100.to_string(),
            self.volatility_sum.to_string(),
            self.volatility_reward.clone(),
            m.min_size.to_string(),
        ];
        record.extend(
            Lookback::ALL
                .iter()
                .map(|&lookback| self.volatility.get(lookback).to_string()),
        );
        record.extend([
            r.best_bid.to_string(),
            r.best_ask.to_string(),
            self.volatility.volatility_price.to_string(),
            m.max_spread.to_string(),
            m.tick_size.to_string(),
            m.neg_risk.to_string(),
            m.market_slug.clone(),
            m.token1.clone(),
            m.token2.clone(),
            m.condition_id.clone(),
        ]);
        record
    }
}

/// Attach volatility windows to every processed market.
///
/// The history of the first token is used. Markets with no history are
/// skipped; a failed history request aborts the stage.
pub async fn derive_rows(
    source: &dyn MarketSource,
    processed: &[MarketResult],
) -> anyhow::Result<Vec<RankedRow>> {
    let mut rows = Vec::with_capacity(processed.len());

    for result in processed {
        let history = source
            .fetch_price_history(&result.market.token1)
            .await?;
        let estimator = VolatilityEstimator::from_history(&history);

        let Some(window) = estimator.windows() else {
            tracing::debug!(
                condition_id = %result.market.condition_id,
                token_id = %result.market.token1,
                "Empty price history, skipping market"
            );
            continue;
        };

        rows.push(RankedRow::new(result.clone(), window));
    }

    tracing::info!(
        processed = processed.len(),
        rows = rows.len(),
        "Derived volatility metrics"
    );
    Ok(rows)
}
