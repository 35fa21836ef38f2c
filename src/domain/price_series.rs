//! Price series representation and calendar helpers.

use crate::domain::error::StockcastError;
use chrono::{Days, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered closing prices for a single asset.
///
/// Dates are strictly increasing; gaps (weekends, holidays) are allowed.
/// Prices are finite and positive. Both rules are checked at construction,
/// so everything downstream can index freely.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, StockcastError> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(StockcastError::InvalidSeries {
                    reason: format!("price {} on {} is not a positive number", point.close, point.date),
                });
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(StockcastError::InvalidSeries {
                    reason: format!(
                        "dates must be strictly increasing ({} follows {})",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The most recent `n` observations (the whole series if shorter).
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(n);
        PriceSeries {
            points: self.points[start..].to_vec(),
        }
    }
}

/// Up to `count` consecutive calendar days starting the day after `last`.
///
/// Stops at the last representable date, so the result is shorter than
/// `count` only when the calendar runs out.
pub fn following_days(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (1..=count as u64)
        .map_while(|offset| last.checked_add_days(Days::new(offset)))
        .collect()
}
