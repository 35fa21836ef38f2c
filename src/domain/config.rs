//! Analysis configuration: building and validating it from a `ConfigPort`.
//!
//! Sections: `[data]`, `[indicators]`, `[forecast]`, `[backend]`. Every key is
//! optional; missing keys take the documented defaults.

use crate::domain::error::StockcastError;
use crate::domain::forecast::pipeline::DEFAULT_TIMEOUT;
use crate::domain::forecast::{
    FallbackMethod, ForecastConfig, DEFAULT_DAYS_AHEAD, DEFAULT_SMOOTHING_ALPHA,
};
use crate::domain::indicator_set::IndicatorParams;
use crate::domain::period::Period;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PERIOD: Period = Period::SixMonths;
pub const DEFAULT_LOOKBACK: usize = 90;

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Program serving the learned model. `None` means no backend.
    pub command: Option<String>,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub period: Period,
    pub indicators: IndicatorParams,
    pub days_ahead: usize,
    pub forecast: ForecastConfig,
    pub backend: BackendConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            period: DEFAULT_PERIOD,
            indicators: IndicatorParams::default(),
            days_ahead: DEFAULT_DAYS_AHEAD,
            forecast: ForecastConfig {
                lookback: Some(DEFAULT_LOOKBACK),
                ..ForecastConfig::default()
            },
            backend: BackendConfig {
                command: None,
                args: Vec::new(),
            },
        }
    }
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, StockcastError> {
    let defaults = AnalysisConfig::default();

    let data_dir = config
        .get_string("data", "dir")
        .map(PathBuf::from)
        .unwrap_or(defaults.data_dir);
    let period = match config.get_string("data", "period") {
        Some(s) => s.parse::<Period>().map_err(|e| invalid("data", "period", e.to_string()))?,
        None => defaults.period,
    };

    let indicators = build_indicator_params(config)?;
    let days_ahead = positive(config, "forecast", "days_ahead", DEFAULT_DAYS_AHEAD)?;
    let forecast = build_forecast_config(config)?;

    let command = config
        .get_string("backend", "command")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let args = config
        .get_string("backend", "args")
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    Ok(AnalysisConfig {
        data_dir,
        period,
        indicators,
        days_ahead,
        forecast,
        backend: BackendConfig { command, args },
    })
}

fn build_indicator_params(config: &dyn ConfigPort) -> Result<IndicatorParams, StockcastError> {
    let d = IndicatorParams::default();
    let params = IndicatorParams {
        rsi_period: positive(config, "indicators", "rsi_window", d.rsi_period)?,
        sma_period: positive(config, "indicators", "sma_window", d.sma_period)?,
        ema_period: positive(config, "indicators", "ema_window", d.ema_period)?,
        macd_fast: positive(config, "indicators", "macd_fast", d.macd_fast)?,
        macd_slow: positive(config, "indicators", "macd_slow", d.macd_slow)?,
        macd_signal: positive(config, "indicators", "macd_signal", d.macd_signal)?,
        bollinger_period: positive(config, "indicators", "bollinger_window", d.bollinger_period)?,
        bollinger_multiplier: config.get_double("indicators", "bollinger_k", d.bollinger_multiplier),
        periods_per_year: config.get_double("indicators", "periods_per_year", d.periods_per_year),
    };

    if params.macd_fast >= params.macd_slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be smaller than macd_slow".into(),
        ));
    }
    if !params.bollinger_multiplier.is_finite() || params.bollinger_multiplier < 0.0 {
        return Err(invalid(
            "indicators",
            "bollinger_k",
            "bollinger_k must be non-negative".into(),
        ));
    }
    if !params.periods_per_year.is_finite() || params.periods_per_year <= 0.0 {
        return Err(invalid(
            "indicators",
            "periods_per_year",
            "periods_per_year must be positive".into(),
        ));
    }
    Ok(params)
}

fn build_forecast_config(config: &dyn ConfigPort) -> Result<ForecastConfig, StockcastError> {
    let fallback = match config
        .get_string("forecast", "fallback")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        None | Some("linear") => FallbackMethod::LinearTrend,
        Some("smoothing") => {
            let alpha = config.get_double("forecast", "smoothing_alpha", DEFAULT_SMOOTHING_ALPHA);
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(invalid(
                    "forecast",
                    "smoothing_alpha",
                    "smoothing_alpha must be in (0, 1]".into(),
                ));
            }
            FallbackMethod::ExponentialSmoothing { alpha }
        }
        Some(other) => {
            return Err(invalid(
                "forecast",
                "fallback",
                format!("unknown fallback '{}' (expected linear or smoothing)", other),
            ));
        }
    };

    // 0 disables the lookback limit; a trend needs two points
    let lookback = match config.get_int("forecast", "lookback", DEFAULT_LOOKBACK as i64) {
        n if n < 0 || n == 1 => {
            return Err(invalid(
                "forecast",
                "lookback",
                format!("lookback must be 0 (all) or at least 2, got {}", n),
            ));
        }
        0 => None,
        n => Some(n as usize),
    };

    let timeout_secs = positive(
        config,
        "backend",
        "timeout_secs",
        DEFAULT_TIMEOUT.as_secs() as usize,
    )?;

    Ok(ForecastConfig {
        fallback,
        lookback,
        timeout: Duration::from_secs(timeout_secs as u64),
        demote_on_failure: config.get_bool("forecast", "demote_on_failure", false),
    })
}

fn positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StockcastError> {
    let value = config.get_int(section, key, default as i64);
    if value < 1 {
        return Err(invalid(section, key, format!("{} must be at least 1", key)));
    }
    Ok(value as usize)
}

fn invalid(section: &str, key: &str, reason: String) -> StockcastError {
    StockcastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    fn assert_invalid(result: Result<AnalysisConfig, StockcastError>, expected_key: &str) {
        match result {
            Err(StockcastError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {}, got {:?}", expected_key, other),
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = build_analysis_config(&MapConfig::new(&[])).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.indicators.sma_period, 50);
        assert_eq!(config.forecast.lookback, Some(90));
        assert_eq!(config.backend.command, None);
    }

    #[test]
    fn reads_all_sections() {
        let config = build_analysis_config(&MapConfig::new(&[
            ("data", "dir", "/srv/prices"),
            ("data", "period", "1y"),
            ("indicators", "rsi_window", "10"),
            ("indicators", "bollinger_k", "2.5"),
            ("forecast", "days_ahead", "7"),
            ("forecast", "lookback", "0"),
            ("forecast", "fallback", "smoothing"),
            ("forecast", "smoothing_alpha", "0.5"),
            ("forecast", "demote_on_failure", "true"),
            ("backend", "command", "/opt/model/serve"),
            ("backend", "args", "--model small"),
            ("backend", "timeout_secs", "5"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/prices"));
        assert_eq!(config.period, Period::OneYear);
        assert_eq!(config.indicators.rsi_period, 10);
        assert_eq!(config.indicators.bollinger_multiplier, 2.5);
        assert_eq!(config.days_ahead, 7);
        assert_eq!(config.forecast.lookback, None);
        assert_eq!(
            config.forecast.fallback,
            FallbackMethod::ExponentialSmoothing { alpha: 0.5 }
        );
        assert!(config.forecast.demote_on_failure);
        assert_eq!(config.forecast.timeout, Duration::from_secs(5));
        assert_eq!(config.backend.command.as_deref(), Some("/opt/model/serve"));
        assert_eq!(config.backend.args, vec!["--model", "small"]);
    }

    #[test]
    fn rejects_zero_window() {
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("indicators", "sma_window", "0")])),
            "sma_window",
        );
    }

    #[test]
    fn rejects_fast_not_below_slow() {
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[
                ("indicators", "macd_fast", "26"),
                ("indicators", "macd_slow", "12"),
            ])),
            "macd_fast",
        );
    }

    #[test]
    fn rejects_negative_bollinger_k() {
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("indicators", "bollinger_k", "-1")])),
            "bollinger_k",
        );
    }

    #[test]
    fn rejects_unknown_fallback_and_bad_alpha() {
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("forecast", "fallback", "prophet")])),
            "fallback",
        );
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[
                ("forecast", "fallback", "smoothing"),
                ("forecast", "smoothing_alpha", "1.5"),
            ])),
            "smoothing_alpha",
        );
    }

    #[test]
    fn lookback_must_leave_room_for_a_trend() {
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("forecast", "lookback", "1")])),
            "lookback",
        );
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("forecast", "lookback", "-3")])),
            "lookback",
        );
        let config =
            build_analysis_config(&MapConfig::new(&[("forecast", "lookback", "2")])).unwrap();
        assert_eq!(config.forecast.lookback, Some(2));
    }

    #[test]
    fn rejects_bad_period_and_horizon() {
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("data", "period", "3w")])),
            "period",
        );
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("forecast", "days_ahead", "0")])),
            "days_ahead",
        );
        assert_invalid(
            build_analysis_config(&MapConfig::new(&[("backend", "timeout_secs", "0")])),
            "timeout_secs",
        );
    }

    #[test]
    fn blank_backend_command_means_none() {
        let config =
            build_analysis_config(&MapConfig::new(&[("backend", "command", "   ")])).unwrap();
        assert_eq!(config.backend.command, None);
    }
}
