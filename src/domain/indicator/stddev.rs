//! Rolling standard deviation.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) values are missing.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn rolling_stddev(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let variance = slice
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / window as f64;
            Some(variance.sqrt())
        })
        .collect()
}

pub fn calculate_stddev(series: &PriceSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::from_values(
        IndicatorType::Stddev(period),
        &series.dates(),
        rolling_stddev(&series.closes(), period),
    )
}
