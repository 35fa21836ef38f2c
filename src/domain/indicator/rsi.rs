//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses simple rolling means (not Wilder's smoothing) of gains and losses:
//! - delta[0] = 0, delta[i] = C[i] - C[i-1]
//! - gain = max(delta, 0), loss = max(-delta, 0)
//! - avg_gain/avg_loss = trailing mean over n values
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If both are 0 (flat window): RSI = 50
//!
//! Warmup: first (n-1) values are missing.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let closes = series.closes();

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    let values = avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) => Some(rsi_from_averages(g, l)),
            _ => None,
        })
        .collect();

    IndicatorSeries::from_values(IndicatorType::Rsi(period), &series.dates(), values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::series;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn rsi_empty_series() {
        let s = calculate_rsi(&series(&[]), 14);
        assert!(s.is_empty());
    }

    #[test]
    fn rsi_single_point() {
        let s = calculate_rsi(&series(&[100.0]), 14);
        assert_eq!(s.len(), 1);
        assert!(s.value_at(0).is_none());
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let s = calculate_rsi(&series(&prices), 14);

        assert_eq!(s.len(), 15);
        for i in 0..13 {
            assert!(s.value_at(i).is_none(), "index {} should be missing", i);
        }
        assert!(s.value_at(13).is_some());
        assert!(s.value_at(14).is_some());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let s = calculate_rsi(&series(&prices), 14);
        assert_relative_eq!(s.value_at(14).unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let s = calculate_rsi(&series(&prices), 14);
        assert_relative_eq!(s.value_at(14).unwrap(), 0.0);
    }

    #[test]
    fn rsi_flat_prices_is_50() {
        let s = calculate_rsi(&series(&[42.0; 20]), 14);
        for i in 13..20 {
            assert_relative_eq!(s.value_at(i).unwrap(), 50.0);
        }
    }

    #[test]
    fn rsi_known_calculation() {
        // deltas: 0, +1, -1, +2
        let s = calculate_rsi(&series(&[10.0, 11.0, 10.0, 12.0]), 3);

        // window [0, +1, -1]: avg gain 1/3, avg loss 1/3
        assert_relative_eq!(s.value_at(2).unwrap(), 50.0, epsilon = 1e-10);
        // window [+1, -1, +2]: avg gain 1, avg loss 1/3 -> RS 3
        assert_relative_eq!(s.value_at(3).unwrap(), 75.0, epsilon = 1e-10);
    }

    #[test]
    fn rsi_zero_period() {
        let s = calculate_rsi(&series(&[100.0, 101.0]), 0);
        assert_eq!(s.len(), 2);
        assert_eq!(s.valid_count(), 0);
    }

    #[test]
    fn rsi_indicator_type() {
        let s = calculate_rsi(&series(&[100.0]), DEFAULT_PERIOD);
        assert_eq!(s.indicator_type, IndicatorType::Rsi(14));
    }

    proptest! {
        #[test]
        fn rsi_stays_in_range(
            prices in prop::collection::vec(0.01f64..10_000.0, 1..120),
            period in 1usize..30,
        ) {
            let s = calculate_rsi(&series(&prices), period);
            for point in &s.values {
                if let Some(rsi) = point.value {
                    prop_assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
                }
            }
        }
    }
}
