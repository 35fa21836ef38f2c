//! Technical indicator implementations.
//!
//! This module provides the types shared by every indicator:
//! - `IndicatorPoint`: one dated value, `None` while the indicator is warming up
//! - `IndicatorType`: indicator identity + parameters (usable as a HashMap key)
//! - `IndicatorSeries`: a series aligned index-for-index with its price series
//!
//! The calculations themselves live in the submodules and are re-exported here.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod targets;
pub mod volatility;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::{calculate_ema, ema_values};
pub use macd::{calculate_macd, calculate_macd_default, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, rolling_mean};
pub use stddev::{calculate_stddev, rolling_stddev};
pub use targets::{compute_price_targets, PriceTarget, PriceTargetBand, TargetHorizon};
pub use volatility::annualized_volatility;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    MacdLine {
        fast: usize,
        slow: usize,
    },
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    MacdHistogram {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    BollingerUpper {
        period: usize,
        stddev_mult_x100: u32,
    },
    BollingerMiddle {
        period: usize,
    },
    BollingerLower {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Zip raw values with their dates. Non-finite values become `None`.
    pub fn from_values(
        indicator_type: IndicatorType,
        dates: &[NaiveDate],
        values: Vec<Option<f64>>,
    ) -> Self {
        let values = dates
            .iter()
            .zip(values)
            .map(|(&date, value)| IndicatorPoint {
                date,
                value: value.filter(|v| v.is_finite()),
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn raw_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.value).collect()
    }

    /// Number of points outside the warm-up prefix.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::MacdLine { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD_SIGNAL({},{},{})", fast, slow, signal)
            }
            IndicatorType::MacdHistogram { fast, slow, signal } => {
                write!(f, "MACD_HIST({},{},{})", fast, slow, signal)
            }
            IndicatorType::BollingerUpper {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER_UPPER({},{})", period, mult)
            }
            IndicatorType::BollingerMiddle { period } => write!(f, "BOLLINGER_MIDDLE({})", period),
            IndicatorType::BollingerLower {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER_LOWER({},{})", period, mult)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd_signal() {
        let macd = IndicatorType::MacdSignal {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD_SIGNAL(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        let boll = IndicatorType::BollingerUpper {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER_UPPER(20,2)");
    }

    #[test]
    fn from_values_masks_non_finite() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ];
        let series = IndicatorSeries::from_values(
            IndicatorType::Sma(2),
            &dates,
            vec![None, Some(f64::NAN), Some(1.5)],
        );
        assert_eq!(series.raw_values(), vec![None, None, Some(1.5)]);
        assert_eq!(series.valid_count(), 1);
        assert_eq!(series.last_value(), Some(1.5));
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(20), "sma20");
        map.insert(IndicatorType::Sma(50), "sma50");
        map.insert(IndicatorType::Rsi(14), "rsi14");

        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"sma20"));
        assert_eq!(map.get(&IndicatorType::Rsi(14)), Some(&"rsi14"));
        assert_eq!(map.get(&IndicatorType::Ema(20)), None);
    }
}
