//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i])
//! Warmup: first (n-1) values are missing.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

/// Trailing mean over `window` values. A zero window yields all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

pub fn calculate_sma(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::from_values(
        IndicatorType::Sma(period),
        &series.dates(),
        rolling_mean(&series.closes(), period),
    )
}
