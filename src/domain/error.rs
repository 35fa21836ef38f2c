//! Domain error types.

/// Top-level error type for stockcast.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {ticker}")]
    NotFound { ticker: String },

    #[error("market data error: {reason}")]
    Data { reason: String },

    #[error("invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure of a forecast backend. Never escapes the forecast pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BackendError {
    #[error("backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("backend failed: {reason}")]
    Failed { reason: String },

    #[error("backend timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("malformed backend output: {reason}")]
    Malformed { reason: String },
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. }
            | StockcastError::ConfigMissing { .. }
            | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::Data { .. } | StockcastError::InvalidSeries { .. } => 3,
            StockcastError::NotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_message() {
        let err = StockcastError::ConfigInvalid {
            section: "indicators".into(),
            key: "rsi_window".into(),
            reason: "must be at least 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [indicators] rsi_window: must be at least 1"
        );
    }

    #[test]
    fn not_found_message() {
        let err = StockcastError::NotFound {
            ticker: "SAN.MC".into(),
        };
        assert_eq!(err.to_string(), "no data for SAN.MC");
    }

    #[test]
    fn backend_timeout_message() {
        let err = BackendError::Timeout { millis: 1500 };
        assert_eq!(err.to_string(), "backend timed out after 1500 ms");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StockcastError = io.into();
        assert!(matches!(err, StockcastError::Io(_)));
    }
}
