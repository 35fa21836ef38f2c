//! Market data access port trait.

use crate::domain::error::StockcastError;
use crate::domain::period::Period;
use crate::domain::price_series::PriceSeries;

pub trait MarketDataPort {
    /// Closing prices for `ticker` over `period`, ending at the most recent
    /// observation. `StockcastError::NotFound` when the ticker has no data.
    fn historical_series(&self, ticker: &str, period: Period)
    -> Result<PriceSeries, StockcastError>;

    fn list_tickers(&self) -> Result<Vec<String>, StockcastError>;
}
