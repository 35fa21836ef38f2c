//! Deterministic forecast projections.
//!
//! These never fail: a series with fewer than two observations projects to
//! an empty forecast. Projected prices are clamped at zero.

use crate::domain::forecast::{FallbackMethod, ForecastPoint};
use crate::domain::price_series::{following_days, PriceSeries};

/// Trend length used by exponential smoothing.
const SMOOTHING_TREND_WINDOW: usize = 10;

/// Least-squares line through `(index, value)` pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// `None` for fewer than two values.
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.len() < 2 {
            return None;
        }
        let n = values.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn linear_trend(series: &PriceSeries, days_ahead: usize) -> Vec<ForecastPoint> {
    let (Some(fit), Some(last)) = (LinearFit::fit(&series.closes()), series.last()) else {
        return Vec::new();
    };
    let last_x = (series.len() - 1) as f64;

    following_days(last.date, days_ahead)
        .into_iter()
        .enumerate()
        .map(|(i, date)| ForecastPoint {
            date,
            price: fit.at(last_x + (i + 1) as f64).max(0.0),
        })
        .collect()
}

/// Simple exponential smoothing plus the average step of the most recent
/// observations as trend.
pub fn exponential_smoothing(
    series: &PriceSeries,
    days_ahead: usize,
    alpha: f64,
) -> Vec<ForecastPoint> {
    let closes = series.closes();
    let Some(last) = series.last() else {
        return Vec::new();
    };
    if closes.len() < 2 {
        return Vec::new();
    }

    let smoothed = closes[1..]
        .iter()
        .fold(closes[0], |s, &c| alpha * c + (1.0 - alpha) * s);

    let recent = &closes[closes.len().saturating_sub(SMOOTHING_TREND_WINDOW)..];
    let trend = (recent[recent.len() - 1] - recent[0]) / recent.len() as f64;

    following_days(last.date, days_ahead)
        .into_iter()
        .enumerate()
        .map(|(i, date)| ForecastPoint {
            date,
            price: (smoothed + trend * (i + 1) as f64).max(0.0),
        })
        .collect()
}

pub fn project(method: FallbackMethod, series: &PriceSeries, days_ahead: usize) -> Vec<ForecastPoint> {
    match method {
        FallbackMethod::LinearTrend => linear_trend(series, days_ahead),
        FallbackMethod::ExponentialSmoothing { alpha } => {
            exponential_smoothing(series, days_ahead, alpha)
        }
    }
}
