//! Liquidity-reward estimate per 100 USDC of resting size
//!
//! A maker quote at price `p` scores `S = ((v - s) / v)^2` where `s` is the
//! distance to the midpoint and `v` the market's max incentive spread. The
//! daily pool is split across sides and levels in proportion to
//! `S * size`, with our own 100 USDC (`100 / p` shares) added to every level.

use super::round_dp;
use crate::orderbook::OrderBook;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Best reward per 100 on each side plus their means
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardQuote {
    pub bid_reward_per_100: f64,
    pub ask_reward_per_100: f64,
    /// Simple mean of the two sides
    pub sm_reward_per_100: f64,
    /// Geometric mean of the two sides; zero unless both sides pay
    pub gm_reward_per_100: f64,
}

impl RewardQuote {
    pub fn from_sides(bid: f64, ask: f64) -> Self {
        let bid = round_dp(bid, 2);
        let ask = round_dp(ask, 2);
        Self {
            bid_reward_per_100: bid,
            ask_reward_per_100: ask,
            sm_reward_per_100: round_dp((bid + ask) / 2.0, 2),
            gm_reward_per_100: round_dp((bid * ask).sqrt(), 2),
        }
    }
}

/// Reward parameters of one market
#[derive(Debug, Clone, Copy)]
pub struct RewardParams {
    pub tick_size: Decimal,
    /// Max incentive spread in cents
    pub max_spread: Decimal,
    /// Daily pool already scaled by the maker share
    pub daily_rate: f64,
}

/// Estimate the best reward per 100 on both sides of `book`
pub fn estimate_rewards(book: &OrderBook, params: &RewardParams) -> RewardQuote {
    let v = params.max_spread / Decimal::ONE_HUNDRED;
    let tick = params.tick_size;
    if v <= Decimal::ZERO || tick <= Decimal::ZERO || params.daily_rate <= 0.0 {
        return RewardQuote::default();
    }

    let best_bid = book.best_bid().unwrap_or(Decimal::ZERO);
    let best_ask = book.best_ask().unwrap_or(Decimal::ZERO);
    let midpoint = (best_bid + best_ask) / Decimal::TWO;
    if midpoint <= Decimal::ZERO {
        return RewardQuote::default();
    }

    let bids: Vec<(Decimal, Decimal)> = bid_ladder(best_ask, midpoint, v, tick)
        .into_iter()
        .map(|p| (p, book.bid_size_at(p)))
        .collect();
    let asks: Vec<(Decimal, Decimal)> = ask_ladder(best_bid, midpoint, v, tick)
        .into_iter()
        .map(|p| (p, book.ask_size_at(p)))
        .collect();

    RewardQuote::from_sides(
        best_reward_per_100(&bids, midpoint, v, params.daily_rate),
        best_reward_per_100(&asks, midpoint, v, params.daily_rate),
    )
}

/// Tick-grid bid prices inside the incentive band, never crossing the ask
pub fn bid_ladder(best_ask: Decimal, midpoint: Decimal, v: Decimal, tick: Decimal) -> Vec<Decimal> {
    let low = (midpoint - v).max(tick);
    let mut high = midpoint;
    if best_ask > Decimal::ZERO {
        high = high.min(best_ask - tick);
    }
    grid(low, high, tick)
}

/// Tick-grid ask prices inside the incentive band, never crossing the bid
pub fn ask_ladder(best_bid: Decimal, midpoint: Decimal, v: Decimal, tick: Decimal) -> Vec<Decimal> {
    let mut low = midpoint;
    if best_bid > Decimal::ZERO {
        low = low.max(best_bid + tick);
    }
    let high = (midpoint + v).min(Decimal::ONE - tick);
    grid(low, high, tick)
}

/// Every multiple of `tick` in `[low, high]`
fn grid(low: Decimal, high: Decimal, tick: Decimal) -> Vec<Decimal> {
    let mut price = (low / tick).ceil() * tick;
    let last = (high / tick).floor() * tick;
    let mut prices = Vec::new();
    while price <= last {
        prices.push(price.normalize());
        price += tick;
    }
    prices
}

/// Highest reward per 100 over a ladder of `(price, resting size)` levels
fn best_reward_per_100(levels: &[(Decimal, Decimal)], midpoint: Decimal, v: Decimal, daily: f64) -> f64 {
    let scored: Vec<(f64, f64, f64)> = levels
        .iter()
        .filter_map(|&(price, size)| {
            let p = price.to_f64()?;
            if p <= 0.0 {
                return None;
            }
            let s = (price - midpoint).abs();
            let score = if s >= v {
                0.0
            } else {
                ((v - s) / v).to_f64()?.powi(2)
            };
            let ours = 100.0 / p;
            let total = size.to_f64()? + ours;
            Some((score * total, total, ours))
        })
        .collect();

    let q_sum: f64 = scored.iter().map(|(q, _, _)| q).sum();
    if q_sum <= 0.0 {
        return 0.0;
    }

    scored
        .iter()
        .map(|&(q, total, ours)| q / q_sum * daily / 2.0 * ours / total)
        .fold(0.0, f64::max)
}
