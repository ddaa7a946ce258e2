//! Metric model module
//!
//! Reward-per-100 estimates from order books and realized volatility from
//! price histories

mod rewards;
mod volatility;

pub use rewards::{ask_ladder, bid_ladder, estimate_rewards, RewardParams, RewardQuote};
pub use volatility::{Lookback, VolatilityEstimator, VolatilityWindow, ANNUALIZATION_MINUTES};

/// Round half away from zero to `dp` decimal places
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(1.234, 2), 1.23);
        assert_eq!(round_dp(1.235001, 2), 1.24);
        assert_eq!(round_dp(-0.456, 1), -0.5);
        assert_eq!(round_dp(7.0, 2), 7.0);
    }
}
