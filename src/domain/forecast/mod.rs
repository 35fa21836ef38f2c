//! Price forecasting: result types, deterministic projections and the
//! degrading pipeline that wraps a learned backend.

pub mod pipeline;
pub mod trend;

pub use pipeline::{BackendState, BackendStatus, ForecastConfig, ForecastPipeline};
pub use trend::{exponential_smoothing, linear_trend, project, LinearFit};

use crate::domain::error::BackendError;
use chrono::NaiveDate;
use std::fmt;

pub const DEFAULT_DAYS_AHEAD: usize = 30;
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FallbackMethod {
    LinearTrend,
    ExponentialSmoothing { alpha: f64 },
}

impl fmt::Display for FallbackMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackMethod::LinearTrend => write!(f, "linear"),
            FallbackMethod::ExponentialSmoothing { alpha } => write!(f, "smoothing({})", alpha),
        }
    }
}

/// Which path produced a forecast.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ForecastSource {
    Backend {
        name: String,
    },
    Fallback {
        method: FallbackMethod,
        cause: BackendError,
    },
    /// Nothing to forecast: zero horizon, no observations, or a horizon past
    /// the last representable date.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ForecastResult {
    pub points: Vec<ForecastPoint>,
    pub source: ForecastSource,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ForecastSource::Fallback { .. })
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

impl fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastSource::Backend { name } => write!(f, "backend {}", name),
            ForecastSource::Fallback { method, cause } => {
                write!(f, "fallback {} ({})", method, cause)
            }
            ForecastSource::Skipped => write!(f, "skipped"),
        }
    }
}
