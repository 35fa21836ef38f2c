//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) values are missing.

use crate::domain::indicator::{rolling_mean, rolling_stddev, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BollingerBands {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

pub fn calculate_bollinger(series: &PriceSeries, period: usize, multiplier: f64) -> BollingerBands {
    let dates = series.dates();
    let closes = series.closes();
    let middle = rolling_mean(&closes, period);
    let stddev = rolling_stddev(&closes, period);

    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, sd)| match (m, sd) {
                (Some(m), Some(sd)) => Some(m + sign * multiplier * sd),
                _ => None,
            })
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    let stddev_mult_x100 = (multiplier * 100.0).round() as u32;
    BollingerBands {
        upper: IndicatorSeries::from_values(
            IndicatorType::BollingerUpper {
                period,
                stddev_mult_x100,
            },
            &dates,
            upper,
        ),
        middle: IndicatorSeries::from_values(
            IndicatorType::BollingerMiddle { period },
            &dates,
            middle,
        ),
        lower: IndicatorSeries::from_values(
            IndicatorType::BollingerLower {
                period,
                stddev_mult_x100,
            },
            &dates,
            lower,
        ),
    }
}
