//! Volatility estimation module
//!
//! Realized volatility of a token's price history over fixed lookbacks

use super::round_dp;
use crate::market::PricePoint;
use chrono::{DateTime, Duration, Utc};

/// Minute-sampled trading year used to annualize per-sample returns
pub const ANNUALIZATION_MINUTES: f64 = 60.0 * 24.0 * 252.0;

/// Lookback windows reported for every market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookback {
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
    OneDay,
    SevenDays,
    FourteenDays,
    ThirtyDays,
}

impl Lookback {
    pub const ALL: [Lookback; 8] = [
        Lookback::OneHour,
        Lookback::ThreeHours,
        Lookback::SixHours,
        Lookback::TwelveHours,
        Lookback::OneDay,
        Lookback::SevenDays,
        Lookback::FourteenDays,
        Lookback::ThirtyDays,
    ];

    pub fn duration(self) -> Duration {
        match self {
            Lookback::OneHour => Duration::hours(1),
            Lookback::ThreeHours => Duration::hours(3),
            Lookback::SixHours => Duration::hours(6),
            Lookback::TwelveHours => Duration::hours(12),
            Lookback::OneDay => Duration::hours(24),
            Lookback::SevenDays => Duration::days(7),
            Lookback::FourteenDays => Duration::days(14),
            Lookback::ThirtyDays => Duration::days(30),
        }
    }

    /// Column name in snapshot files
    pub fn column(self) -> &'static str {
        match self {
            Lookback::OneHour => "1_hour",
            Lookback::ThreeHours => "3_hour",
            Lookback::SixHours => "6_hour",
            Lookback::TwelveHours => "12_hour",
            Lookback::OneDay => "24_hour",
            Lookback::SevenDays => "7_day",
            Lookback::FourteenDays => "14_day",
            Lookback::ThirtyDays => "30_day",
        }
    }
}

/// Annualized volatility per lookback, attached to one market
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolatilityWindow {
    pub one_hour: f64,
    pub three_hour: f64,
    pub six_hour: f64,
    pub twelve_hour: f64,
    pub twenty_four_hour: f64,
    pub seven_day: f64,
    pub fourteen_day: f64,
    pub thirty_day: f64,
    /// Last price in the history the windows were computed from
    pub volatility_price: f64,
}

impl VolatilityWindow {
    pub fn get(&self, lookback: Lookback) -> f64 {
        match lookback {
            Lookback::OneHour => self.one_hour,
            Lookback::ThreeHours => self.three_hour,
            Lookback::SixHours => self.six_hour,
            Lookback::TwelveHours => self.twelve_hour,
            Lookback::OneDay => self.twenty_four_hour,
            Lookback::SevenDays => self.seven_day,
            Lookback::FourteenDays => self.fourteen_day,
            Lookback::ThirtyDays => self.thirty_day,
        }
    }

    fn set(&mut self, lookback: Lookback, value: f64) {
        let slot = match lookback {
            Lookback::OneHour => &mut self.one_hour,
            Lookback::ThreeHours => &mut self.three_hour,
            Lookback::SixHours => &mut self.six_hour,
            Lookback::TwelveHours => &mut self.twelve_hour,
            Lookback::OneDay => &mut self.twenty_four_hour,
            Lookback::SevenDays => &mut self.seven_day,
            Lookback::FourteenDays => &mut self.fourteen_day,
            Lookback::ThirtyDays => &mut self.thirty_day,
        };
        *slot = value;
    }

    /// 24h + 7d + 14d; the other windows are informational
    pub fn sum(&self) -> f64 {
        self.twenty_four_hour + self.seven_day + self.fourteen_day
    }
}

/// Log-return volatility estimator over a fixed price history
pub struct VolatilityEstimator {
    /// Log return ending at each sample, keyed by that sample's time
    returns: Vec<(DateTime<Utc>, f64)>,
    /// Most recent sample
    last: Option<(DateTime<Utc>, f64)>,
}

impl VolatilityEstimator {
    /// Build from raw history; prices are rounded to cents first
    pub fn from_history(history: &[PricePoint]) -> Self {
        let mut points: Vec<(DateTime<Utc>, f64)> = history
            .iter()
            .map(|p| (p.timestamp, round_dp(p.price, 2)))
            .collect();
        points.sort_by_key(|(ts, _)| *ts);

        let returns = points
            .windows(2)
            .filter_map(|pair| {
                let (_, prev) = pair[0];
                let (ts, curr) = pair[1];
                let r = (curr / prev).ln();
                r.is_finite().then_some((ts, r))
            })
            .collect();

        Self {
            returns,
            last: points.last().copied(),
        }
    }

    /// Last price of the history
    pub fn last_price(&self) -> Option<f64> {
        self.last.map(|(_, p)| p)
    }

    /// Annualized volatility of the returns within `lookback` of the last sample.
    ///
    /// Fewer than two returns in the window yields 0.
    pub fn estimate(&self, lookback: Duration) -> f64 {
        let Some((end, _)) = self.last else {
            return 0.0;
        };
        let start = end - lookback;
        let window: Vec<f64> = self
            .returns
            .iter()
            .filter(|(ts, _)| *ts >= start && *ts <= end)
            .map(|(_, r)| *r)
            .collect();

        if window.len() < 2 {
            return 0.0;
        }

        // Sample standard deviation
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        round_dp(variance.sqrt() * ANNUALIZATION_MINUTES.sqrt(), 2)
    }

    /// All lookback windows; `None` when the history was empty
    pub fn windows(&self) -> Option<VolatilityWindow> {
        let volatility_price = self.last_price()?;
        let mut window = VolatilityWindow {
            volatility_price,
            ..VolatilityWindow::default()
        };
        for lookback in Lookback::ALL {
            window.set(lookback, self.estimate(lookback.duration()));
        }
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::mock::history;

    #[test]
    fn test_empty_history() {
        let estimator = VolatilityEstimator::from_history(&[]);
        assert!(estimator.last_price().is_none());
        assert!(estimator.windows().is_none());
        assert_eq!(estimator.estimate(Duration::days(1)), 0.0);
    }

    #[test]
    fn test_single_return_is_zero() {
        let estimator = VolatilityEstimator::from_history(&history(&[0.50, 0.55], 10));
        assert_eq!(estimator.estimate(Duration::days(30)), 0.0);
        assert_eq!(estimator.last_price(), Some(0.55));
    }

    #[test]
    fn test_constant_price() {
        let estimator = VolatilityEstimator::from_history(&history(&[0.40; 20], 10));
        let windows = estimator.windows().unwrap();
        assert_eq!(windows.sum(), 0.0);
        assert_eq!(windows.volatility_price, 0.40);
    }

    #[test]
    fn test_oscillating_price() {
        let prices: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 0.50 } else { 0.52 }).collect();
        let estimator = VolatilityEstimator::from_history(&history(&prices, 10));
        let vol = estimator.estimate(Duration::days(1));

        // |ln(0.52/0.50)| alternating sign, sample std ~0.0396, annualized x ~602
        assert!(vol > 20.0 && vol < 26.0, "vol = {}", vol);
    }

    #[test]
    fn test_short_lookback_ignores_old_moves() {
        // Volatile first day, flat afterwards
        let mut prices: Vec<f64> = (0..144).map(|i| if i % 2 == 0 { 0.30 } else { 0.40 }).collect();
        prices.extend(std::iter::repeat(0.35).take(144));
        let estimator = VolatilityEstimator::from_history(&history(&prices, 10));
        let windows = estimator.windows().unwrap();

        assert_eq!(windows.one_hour, 0.0);
        assert_eq!(windows.twelve_hour, 0.0);
        assert!(windows.seven_day > 0.0);
        assert_eq!(windows.seven_day, windows.thirty_day);
    }

    #[test]
    fn test_prices_rounded_to_cents() {
        let estimator =
            VolatilityEstimator::from_history(&history(&[0.501, 0.499, 0.502, 0.498], 10));
        assert_eq!(estimator.estimate(Duration::days(1)), 0.0);
    }

    #[test]
    fn test_sum_uses_three_windows() {
        let window = VolatilityWindow {
            one_hour: 100.0,
            three_hour: 100.0,
            six_hour: 100.0,
            twelve_hour: 100.0,
            twenty_four_hour: 1.5,
            seven_day: 2.25,
            fourteen_day: 3.0,
            thirty_day: 100.0,
            volatility_price: 0.5,
        };
        assert_eq!(window.sum(), 6.75);
    }

    #[test]
    fn test_lookback_columns() {
        let columns: Vec<&str> = Lookback::ALL.iter().map(|l| l.column()).collect();
        assert_eq!(
            columns,
            vec!["1_hour", "3_hour", "6_hour", "12_hour", "24_hour", "7_day", "14_day", "30_day"]
        );
        assert_eq!(Lookback::FourteenDays.duration(), Duration::days(14));
    }

    #[test]
    fn test_unordered_history() {
        let mut points = history(&[0.50, 0.52, 0.50, 0.52, 0.50], 10);
        points.reverse();
        let estimator = VolatilityEstimator::from_history(&points);
        assert_eq!(estimator.last_price(), Some(0.50));
        assert!(estimator.estimate(Duration::days(1)) > 0.0);
    }
}
