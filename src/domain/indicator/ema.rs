//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first observation, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: every index is defined (unadjusted recurrence).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

/// Raw EMA over `values`. Empty when `period` is 0.
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;

    for (i, &value) in values.iter().enumerate() {
        ema = if i == 0 {
            value
        } else {
            value * k + ema * (1.0 - k)
        };
        out.push(ema);
    }
    out
}

pub fn calculate_ema(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let values = if period == 0 {
        vec![None; series.len()]
    } else {
        ema_values(&series.closes(), period)
            .into_iter()
            .map(Some)
            .collect()
    };
    IndicatorSeries::from_values(IndicatorType::Ema(period), &series.dates(), values)
}
