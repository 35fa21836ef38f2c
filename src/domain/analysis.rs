//! Per-ticker analysis: the operations a dashboard calls, and the combined
//! report built from them.

use crate::domain::config::AnalysisConfig;
use crate::domain::forecast::{ForecastPipeline, ForecastResult};
use crate::domain::indicator::volatility::TRADING_DAYS_PER_YEAR;
use crate::domain::indicator::{annualized_volatility, compute_price_targets, PriceTargetBand};
use crate::domain::indicator_set::{self, IndicatorParams, IndicatorSet};
use crate::domain::price_series::PriceSeries;

/// Move of the last close against the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PriceChange {
    pub last: f64,
    pub previous: f64,
    pub change: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StockReport {
    pub ticker: String,
    pub history: PriceSeries,
    pub indicators: IndicatorSet,
    pub volatility: f64,
    pub targets: Option<PriceTargetBand>,
    pub change: Option<PriceChange>,
    pub forecast: ForecastResult,
}

pub fn compute_indicators(series: &PriceSeries) -> IndicatorSet {
    indicator_set::compute_indicators(series, &IndicatorParams::default())
}

pub fn compute_volatility(series: &PriceSeries) -> f64 {
    annualized_volatility(series, TRADING_DAYS_PER_YEAR)
}

pub fn last_change(series: &PriceSeries) -> Option<PriceChange> {
    let points = series.points();
    if points.len() < 2 {
        return None;
    }
    let last = points[points.len() - 1].close;
    let previous = points[points.len() - 2].close;
    let change = last - previous;
    Some(PriceChange {
        last,
        previous,
        change,
        change_pct: change / previous * 100.0,
    })
}

pub fn analyze(
    ticker: &str,
    series: PriceSeries,
    pipeline: &ForecastPipeline,
    config: &AnalysisConfig,
) -> StockReport {
    let indicators = indicator_set::compute_indicators(&series, &config.indicators);
    let volatility = annualized_volatility(&series, config.indicators.periods_per_year);
    let targets = series
        .last()
        .map(|p| compute_price_targets(p.close, volatility));
    let change = last_change(&series);
    let forecast = pipeline.predict_trend(&series, config.days_ahead);

    StockReport {
        ticker: ticker.to_string(),
        history: series,
        indicators,
        volatility,
        targets,
        change,
        forecast,
    }
}
