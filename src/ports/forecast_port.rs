//! Forecast backend port traits.
//!
//! A backend is an opaque, expensive-to-load model. The pipeline only ever
//! talks to it through these two traits.

use crate::domain::error::BackendError;
use crate::domain::forecast::ForecastPoint;
use crate::domain::price_series::PriceSeries;
use std::sync::Arc;

pub trait ForecastBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Predict `horizon_days` prices, one per calendar day after the last
    /// observation of `series`.
    fn predict(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
    ) -> Result<Vec<ForecastPoint>, BackendError>;
}

/// Acquires a backend. Called once at startup and again whenever the
/// pipeline is degraded, so implementations must tolerate repeated calls.
pub trait BackendLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn ForecastBackend>, BackendError>;
}
