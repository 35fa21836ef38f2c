//! History window requested from a market data provider.

use chrono::{Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    Max,
}

impl Period {
    /// First date covered by the window ending at `end`. `None` for `Max`.
    pub fn start_from(self, end: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::FiveDays => end.checked_sub_days(Days::new(5)),
            Period::OneMonth => end.checked_sub_months(Months::new(1)),
            Period::ThreeMonths => end.checked_sub_months(Months::new(3)),
            Period::SixMonths => end.checked_sub_months(Months::new(6)),
            Period::OneYear => end.checked_sub_months(Months::new(12)),
            Period::TwoYears => end.checked_sub_months(Months::new(24)),
            Period::FiveYears => end.checked_sub_months(Months::new(60)),
            Period::TenYears => end.checked_sub_months(Months::new(120)),
            Period::Max => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period '{0}' (expected 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y or max)")]
pub struct ParsePeriodError(pub String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5d" => Ok(Period::FiveDays),
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "10y" => Ok(Period::TenYears),
            "max" => Ok(Period::Max),
            _ => Err(ParsePeriodError(s.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::Max => "max",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_provider_labels() {
        assert_eq!("6mo".parse::<Period>().unwrap(), Period::SixMonths);
        assert_eq!(" 1Y ".parse::<Period>().unwrap(), Period::OneYear);
        assert_eq!("max".parse::<Period>().unwrap(), Period::Max);
        assert!("7w".parse::<Period>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for p in [Period::FiveDays, Period::ThreeMonths, Period::TenYears, Period::Max] {
            assert_eq!(p.to_string().parse::<Period>().unwrap(), p);
        }
    }

    #[test]
    fn start_from_clamps_month_end() {
        assert_eq!(Period::OneMonth.start_from(date(2024, 3, 31)), Some(date(2024, 2, 29)));
        assert_eq!(Period::FiveDays.start_from(date(2024, 3, 3)), Some(date(2024, 2, 27)));
        assert_eq!(Period::OneYear.start_from(date(2024, 6, 15)), Some(date(2023, 6, 15)));
        assert_eq!(Period::Max.start_from(date(2024, 6, 15)), None);
    }
}
