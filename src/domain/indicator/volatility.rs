//! Annualized volatility of log returns.
//!
//! r[i] = ln(C[i] / C[i-1])
//! vol = sample_stddev(r) * sqrt(periods_per_year)
//!
//! Sample standard deviation divides by (N-1), so at least two returns are
//! needed. Anything undefined comes back as 0.0.

use crate::domain::price_series::PriceSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub fn annualized_volatility(series: &PriceSeries, periods_per_year: f64) -> f64 {
    let returns: Vec<f64> = series
        .points()
        .windows(2)
        .map(|w| (w[1].close / w[0].close).ln())
        .filter(|r| r.is_finite())
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let vol = variance.sqrt() * periods_per_year.max(0.0).sqrt();

    if vol.is_finite() { vol } else { 0.0 }
}
