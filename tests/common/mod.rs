#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use stockcast::domain::error::{BackendError, StockcastError};
use stockcast::domain::forecast::ForecastPoint;
use stockcast::domain::period::Period;
use stockcast::domain::price_series::{following_days, PricePoint, PriceSeries};
use stockcast::ports::data_port::MarketDataPort;
use stockcast::ports::forecast_port::{BackendLoader, ForecastBackend};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Daily series starting on `start`.
pub fn make_series(start: &str, closes: &[f64]) -> PriceSeries {
    let start = date(start);
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start.checked_add_days(Days::new(i as u64)).unwrap(),
            close,
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, series: PriceSeries) -> Self {
        self.data.insert(ticker.to_string(), series);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn historical_series(
        &self,
        ticker: &str,
        _period: Period,
    ) -> Result<PriceSeries, StockcastError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockcastError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(ticker)
            .cloned()
            .ok_or_else(|| StockcastError::NotFound {
                ticker: ticker.to_string(),
            })
    }

    fn list_tickers(&self) -> Result<Vec<String>, StockcastError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

fn flat_forecast(series: &PriceSeries, horizon_days: usize, price: f64) -> Vec<ForecastPoint> {
    let last = series.last().map(|p| p.date).unwrap();
    following_days(last, horizon_days)
        .into_iter()
        .map(|date| ForecastPoint { date, price })
        .collect()
}

/// Returns `price` for every requested day.
pub struct FlatBackend(pub f64);

impl ForecastBackend for FlatBackend {
    fn name(&self) -> &str {
        "flat"
    }

    fn predict(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
    ) -> Result<Vec<ForecastPoint>, BackendError> {
        Ok(flat_forecast(series, horizon_days, self.0))
    }
}

pub struct FailingBackend;

impl ForecastBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn predict(&self, _: &PriceSeries, _: usize) -> Result<Vec<ForecastPoint>, BackendError> {
        Err(BackendError::Failed {
            reason: "inference error".into(),
        })
    }
}

/// Answers one day short of the requested horizon.
pub struct ShortBackend;

impl ForecastBackend for ShortBackend {
    fn name(&self) -> &str {
        "short"
    }

    fn predict(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
    ) -> Result<Vec<ForecastPoint>, BackendError> {
        Ok(flat_forecast(series, horizon_days.saturating_sub(1), 1.0))
    }
}

/// Sleeps before answering.
pub struct SlowBackend(pub Duration);

impl ForecastBackend for SlowBackend {
    fn name(&self) -> &str {
        "slow"
    }

    fn predict(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
    ) -> Result<Vec<ForecastPoint>, BackendError> {
        thread::sleep(self.0);
        Ok(flat_forecast(series, horizon_days, 1.0))
    }
}

/// Hands out a fixed backend.
pub struct StaticLoader(pub Arc<dyn ForecastBackend>);

impl BackendLoader for StaticLoader {
    fn load(&self) -> Result<Arc<dyn ForecastBackend>, BackendError> {
        Ok(Arc::clone(&self.0))
    }
}

pub struct MissingLoader;

impl BackendLoader for MissingLoader {
    fn load(&self) -> Result<Arc<dyn ForecastBackend>, BackendError> {
        Err(BackendError::Unavailable {
            reason: "model weights not found".into(),
        })
    }
}

/// Fails the first `failures` loads, then hands out `backend`.
pub struct FlakyLoader {
    pub failures: usize,
    pub calls: Arc<AtomicUsize>,
    pub backend: Arc<dyn ForecastBackend>,
}

impl FlakyLoader {
    pub fn new(failures: usize, backend: Arc<dyn ForecastBackend>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                failures,
                calls: Arc::clone(&calls),
                backend,
            },
            calls,
        )
    }
}

impl BackendLoader for FlakyLoader {
    fn load(&self) -> Result<Arc<dyn ForecastBackend>, BackendError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            Err(BackendError::Unavailable {
                reason: "warming up".into(),
            })
        } else {
            Ok(Arc::clone(&self.backend))
        }
    }
}
