//! The full indicator bundle computed for a price series.

use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    macd, rsi, IndicatorSeries,
};
use crate::domain::indicator::volatility::TRADING_DAYS_PER_YEAR;
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_SMA_PERIOD: usize = 50;
pub const DEFAULT_EMA_PERIOD: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub sma_period: usize,
    pub ema_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub periods_per_year: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            sma_period: DEFAULT_SMA_PERIOD,
            ema_period: DEFAULT_EMA_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_multiplier: bollinger::DEFAULT_MULTIPLIER,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Every series is aligned index-for-index with the input price series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorSet {
    pub rsi: IndicatorSeries,
    pub sma: IndicatorSeries,
    pub ema: IndicatorSeries,
    pub macd: IndicatorSeries,
    pub macd_signal: IndicatorSeries,
    pub macd_histogram: IndicatorSeries,
    pub bollinger_upper: IndicatorSeries,
    pub bollinger_middle: IndicatorSeries,
    pub bollinger_lower: IndicatorSeries,
}

impl IndicatorSet {
    pub fn all(&self) -> [&IndicatorSeries; 9] {
        [
            &self.rsi,
            &self.sma,
            &self.ema,
            &self.macd,
            &self.macd_signal,
            &self.macd_histogram,
            &self.bollinger_upper,
            &self.bollinger_middle,
            &self.bollinger_lower,
        ]
    }
}

pub fn compute_indicators(series: &PriceSeries, params: &IndicatorParams) -> IndicatorSet {
    let macd = calculate_macd(series, params.macd_fast, params.macd_slow, params.macd_signal);
    let bands = calculate_bollinger(series, params.bollinger_period, params.bollinger_multiplier);

    IndicatorSet {
        rsi: calculate_rsi(series, params.rsi_period),
        sma: calculate_sma(series, params.sma_period),
        ema: calculate_ema(series, params.ema_period),
        macd: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        bollinger_upper: bands.upper,
        bollinger_middle: bands.middle,
        bollinger_lower: bands.lower,
    }
}
