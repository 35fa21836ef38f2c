//! CSV file market data adapter.
//!
//! One file per ticker, `{base_path}/{TICKER}.csv`, with a header row that
//! contains `date` and `close` columns (any order, case-insensitive; other
//! columns are ignored). Dates are `YYYY-MM-DD`.

use crate::domain::error::StockcastError;
use crate::domain::period::Period;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_points(&self, ticker: &str) -> Result<Vec<PricePoint>, StockcastError> {
        let path = self.csv_path(ticker);
        if !path.is_file() {
            return Err(StockcastError::NotFound {
                ticker: ticker.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| StockcastError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| StockcastError::Data {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();
        let date_col = column(&headers, "date", &path)?;
        let close_col = column(&headers, "close", &path)?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| StockcastError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).ok_or_else(|| StockcastError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                StockcastError::Data {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            let close_str = record.get(close_col).ok_or_else(|| StockcastError::Data {
                reason: "missing close column".into(),
            })?;
            // providers leave gaps as empty cells
            if close_str.trim().is_empty() {
                continue;
            }
            let close: f64 = close_str.trim().parse().map_err(|e| StockcastError::Data {
                reason: format!("invalid close value '{}': {}", close_str, e),
            })?;

            points.push(PricePoint { date, close });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

fn column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize, StockcastError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| StockcastError::Data {
            reason: format!("{} has no '{}' column", path.display(), name),
        })
}

impl MarketDataPort for CsvAdapter {
    fn historical_series(
        &self,
        ticker: &str,
        period: Period,
    ) -> Result<PriceSeries, StockcastError> {
        let points = self.read_points(ticker)?;
        let Some(last_date) = points.last().map(|p| p.date) else {
            return Err(StockcastError::NotFound {
                ticker: ticker.to_string(),
            });
        };

        let points = match period.start_from(last_date) {
            Some(start) => points.into_iter().filter(|p| p.date > start).collect(),
            None => points,
        };
        PriceSeries::new(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StockcastError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StockcastError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StockcastError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
