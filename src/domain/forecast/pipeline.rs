//! Forecast pipeline with graceful degradation.
//!
//! The pipeline is either `Primed` (holding a loaded backend) or `Degraded`
//! (holding the reason the last load failed). `predict_trend` is total: any
//! backend problem (unavailable, error, panic, timeout, malformed output)
//! is logged and answered with a deterministic projection of the same shape.
//!
//! A degraded pipeline retries its loader once per call, so a backend that
//! comes back is picked up without a restart.

use crate::domain::error::BackendError;
use crate::domain::forecast::trend::project;
use crate::domain::forecast::{
    FallbackMethod, ForecastPoint, ForecastResult, ForecastSource, DEFAULT_SMOOTHING_ALPHA,
};
use crate::domain::price_series::{following_days, PriceSeries};
use crate::ports::forecast_port::{BackendLoader, ForecastBackend};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub fallback: FallbackMethod,
    /// Only the most recent `lookback` observations are used. `None` = all.
    pub lookback: Option<usize>,
    pub timeout: Duration,
    /// Drop a primed backend after a failed call so the next call reloads it.
    pub demote_on_failure: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackMethod::LinearTrend,
            lookback: None,
            timeout: DEFAULT_TIMEOUT,
            demote_on_failure: false,
        }
    }
}

impl ForecastConfig {
    pub fn smoothing() -> Self {
        Self {
            fallback: FallbackMethod::ExponentialSmoothing {
                alpha: DEFAULT_SMOOTHING_ALPHA,
            },
            ..Self::default()
        }
    }
}

pub enum BackendState {
    Primed(Arc<dyn ForecastBackend>),
    Degraded { reason: BackendError },
}

impl fmt::Debug for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendState::Primed(backend) => f.debug_tuple("Primed").field(&backend.name()).finish(),
            BackendState::Degraded { reason } => {
                f.debug_struct("Degraded").field("reason", reason).finish()
            }
        }
    }
}

/// Snapshot of the pipeline state, detached from the backend itself.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendStatus {
    Primed { backend: String },
    Degraded { reason: BackendError },
}

impl From<&BackendState> for BackendStatus {
    fn from(state: &BackendState) -> Self {
        match state {
            BackendState::Primed(backend) => BackendStatus::Primed {
                backend: backend.name().to_string(),
            },
            BackendState::Degraded { reason } => BackendStatus::Degraded {
                reason: reason.clone(),
            },
        }
    }
}

pub struct ForecastPipeline {
    loader: Box<dyn BackendLoader>,
    state: RwLock<BackendState>,
    config: ForecastConfig,
}

impl ForecastPipeline {
    /// Loads the backend once; the pipeline starts in whichever state that
    /// produces.
    pub fn new(loader: Box<dyn BackendLoader>, config: ForecastConfig) -> Self {
        let state = initial_state(loader.as_ref());
        Self {
            loader,
            state: RwLock::new(state),
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn status(&self) -> BackendStatus {
        BackendStatus::from(&*self.state.read())
    }

    pub fn is_primed(&self) -> bool {
        matches!(*self.state.read(), BackendState::Primed(_))
    }

    /// Always returns `days_ahead` points for a series of two or more
    /// observations, dated one calendar day apart starting the day after the
    /// last observation. A horizon that would run past the last date chrono
    /// can represent is skipped.
    pub fn predict_trend(&self, series: &PriceSeries, days_ahead: usize) -> ForecastResult {
        let Some(last) = series.last() else {
            return skipped();
        };
        if days_ahead == 0 {
            return skipped();
        }

        // never trim below the two points a trend needs
        let input = match self.config.lookback {
            Some(n) if n.max(2) < series.len() => series.tail(n.max(2)),
            _ => series.clone(),
        };
        let expected_dates = following_days(last.date, days_ahead);
        if expected_dates.len() < days_ahead {
            warn!(
                last = %last.date,
                horizon = days_ahead,
                representable = expected_dates.len(),
                "forecast horizon runs past the last representable date"
            );
            return skipped();
        }

        let cause = match self.acquire() {
            Ok(backend) => {
                let name = backend.name().to_string();
                match self
                    .invoke(backend, &input, days_ahead)
                    .and_then(|points| validate(points, &expected_dates))
                {
                    Ok(points) => {
                        return ForecastResult {
                            points,
                            source: ForecastSource::Backend { name },
                        };
                    }
                    Err(e) => {
                        warn!(
                            backend = %name,
                            input_len = input.len(),
                            horizon = days_ahead,
                            error = %e,
                            "forecast backend failed, using fallback"
                        );
                        if self.config.demote_on_failure {
                            *self.state.write() = BackendState::Degraded { reason: e.clone() };
                        }
                        e
                    }
                }
            }
            Err(e) => e,
        };

        debug!(
            method = %self.config.fallback,
            input_len = input.len(),
            horizon = days_ahead,
            "projecting fallback forecast"
        );
        ForecastResult {
            points: project(self.config.fallback, &input, days_ahead),
            source: ForecastSource::Fallback {
                method: self.config.fallback,
                cause,
            },
        }
    }

    /// The current backend, reloading once if degraded.
    fn acquire(&self) -> Result<Arc<dyn ForecastBackend>, BackendError> {
        if let BackendState::Primed(backend) = &*self.state.read() {
            return Ok(Arc::clone(backend));
        }

        match self.loader.load() {
            Ok(backend) => {
                info!(backend = backend.name(), "forecast backend recovered");
                *self.state.write() = BackendState::Primed(Arc::clone(&backend));
                Ok(backend)
            }
            Err(e) => {
                debug!(error = %e, "forecast backend still unavailable");
                *self.state.write() = BackendState::Degraded { reason: e.clone() };
                Err(e)
            }
        }
    }

    /// Runs the backend on a worker thread so a hung model cannot block the
    /// caller past the configured timeout. A panicking backend shows up as a
    /// disconnected channel.
    fn invoke(
        &self,
        backend: Arc<dyn ForecastBackend>,
        series: &PriceSeries,
        days_ahead: usize,
    ) -> Result<Vec<ForecastPoint>, BackendError> {
        let (tx, rx) = mpsc::channel();
        let input = series.clone();

        thread::Builder::new()
            .name("forecast-backend".into())
            .spawn(move || {
                let _ = tx.send(backend.predict(&input, days_ahead));
            })
            .map_err(|e| BackendError::Failed {
                reason: format!("could not start backend worker: {}", e),
            })?;

        match rx.recv_timeout(self.config.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(BackendError::Timeout {
                millis: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(BackendError::Failed {
                reason: "backend worker exited without a result".into(),
            }),
        }
    }
}

fn initial_state(loader: &dyn BackendLoader) -> BackendState {
    match loader.load() {
        Ok(backend) => {
            info!(backend = backend.name(), "forecast backend loaded");
            BackendState::Primed(backend)
        }
        Err(e) => {
            warn!(error = %e, "forecast backend unavailable, forecasts will use fallback");
            BackendState::Degraded { reason: e }
        }
    }
}

fn validate(
    points: Vec<ForecastPoint>,
    expected_dates: &[NaiveDate],
) -> Result<Vec<ForecastPoint>, BackendError> {
    if points.is_empty() {
        return Err(BackendError::Malformed {
            reason: "empty forecast".into(),
        });
    }
    if points.len() != expected_dates.len() {
        return Err(BackendError::Malformed {
            reason: format!(
                "expected {} points, got {}",
                expected_dates.len(),
                points.len()
            ),
        });
    }
    for (point, expected) in points.iter().zip(expected_dates) {
        if point.date != *expected {
            return Err(BackendError::Malformed {
                reason: format!("expected date {}, got {}", expected, point.date),
            });
        }
        if !point.price.is_finite() {
            return Err(BackendError::Malformed {
                reason: format!("non-finite price on {}", point.date),
            });
        }
    }
    Ok(points)
}

fn skipped() -> ForecastResult {
    ForecastResult {
        points: Vec::new(),
        source: ForecastSource::Skipped,
    }
}
