//! Final views and ranking strategies

use super::RankedRow;
use crate::config::{Band, RankingStrategy, Thresholds};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Order by descending reward; equal rewards keep lower volatility first
pub fn sort_by_reward(rows: &mut [RankedRow]) {
    rows.sort_by(|a, b| a.volatility_sum.total_cmp(&b.volatility_sum));
    // Stable, so the volatility order survives among equal rewards
    rows.sort_by(|a, b| b.gm_reward_per_100().total_cmp(&a.gm_reward_per_100()));
}

/// Every row, best reward first
pub fn full_view(rows: &[RankedRow]) -> Vec<RankedRow> {
    let mut view = rows.to_vec();
    sort_by_reward(&mut view);
    view
}

/// Rows under the volatility cutoff, ordered by `strategy`
pub fn low_volatility_view(
    rows: &[RankedRow],
    thresholds: &Thresholds,
    strategy: RankingStrategy,
) -> Vec<RankedRow> {
    let mut view: Vec<RankedRow> = rows
        .iter()
        .filter(|row| row.volatility_sum < thresholds.volatility_cutoff)
        .cloned()
        .collect();

    match strategy {
        RankingStrategy::Reward => sort_by_reward(&mut view),
        RankingStrategy::Composite => view = composite_rank(view, thresholds),
    }
    view
}

/// Order rows by descending composite score.
///
/// `composite = z(reward) - z(volatility) + bid proximity + ask proximity`
pub fn composite_rank(rows: Vec<RankedRow>, thresholds: &Thresholds) -> Vec<RankedRow> {
    let scores = composite_scores(&rows, thresholds);
    let mut scored: Vec<(f64, RankedRow)> = scores.into_iter().zip(rows).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, row)| row).collect()
}

/// Composite score of every row, in input order
pub fn composite_scores(rows: &[RankedRow], thresholds: &Thresholds) -> Vec<f64> {
    let rewards: Vec<f64> = rows.iter().map(RankedRow::gm_reward_per_100).collect();
    let volatilities: Vec<f64> = rows.iter().map(|r| r.volatility_sum).collect();
    let z_reward = z_scores(&rewards);
    let z_volatility = z_scores(&volatilities);

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let bid = proximity_score(row.result.best_bid, thresholds);
            let ask = proximity_score(row.result.best_ask, thresholds);
            z_reward[i] - z_volatility[i] + bid + ask
        })
        .collect()
}

/// Standard scores using the sample standard deviation.
///
/// A zero or undefined deviation yields 0 for every value.
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return vec![0.0; values.len()];
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();

    if std == 0.0 || !std.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / std).collect()
}

/// How far into a sweet-spot band `price` sits, from 0.0 to 1.0.
///
/// The cheap band scores highest at its lower edge, the expensive band at
/// its upper edge; prices outside both score 0.
pub fn proximity_score(price: Decimal, thresholds: &Thresholds) -> f64 {
    let low = &thresholds.low_band;
    let high = &thresholds.high_band;

    let score = if low.contains(price) {
        band_fraction(low.upper - price, low)
    } else if high.contains(price) {
        band_fraction(price - high.lower, high)
    } else {
        return 0.0;
    };
    score.unwrap_or(0.0)
}

fn band_fraction(distance: Decimal, band: &Band) -> Option<f64> {
    let width = band.width();
    if width.is_zero() {
        return None;
    }
    (distance / width).to_f64()
}
