//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! All EMAs are seeded with their first input, so no index is missing.

use crate::domain::indicator::{ema_values, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn calculate_macd(
    series: &PriceSeries,
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let dates = series.dates();
    let line_type = IndicatorType::MacdLine { fast, slow };
    let signal_type = IndicatorType::MacdSignal {
        fast,
        slow,
        signal: signal_period,
    };
    let histogram_type = IndicatorType::MacdHistogram {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        let missing = vec![None; dates.len()];
        return MacdSeries {
            line: IndicatorSeries::from_values(line_type, &dates, missing.clone()),
            signal: IndicatorSeries::from_values(signal_type, &dates, missing.clone()),
            histogram: IndicatorSeries::from_values(histogram_type, &dates, missing),
        };
    }

    let closes = series.closes();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_values(&line, signal_period);
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line: IndicatorSeries::from_values(line_type, &dates, line.into_iter().map(Some).collect()),
        signal: IndicatorSeries::from_values(
            signal_type,
            &dates,
            signal.into_iter().map(Some).collect(),
        ),
        histogram: IndicatorSeries::from_values(
            histogram_type,
            &dates,
            histogram.into_iter().map(Some).collect(),
        ),
    }
}

pub fn calculate_macd_default(series: &PriceSeries) -> MacdSeries {
    calculate_macd(series, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
