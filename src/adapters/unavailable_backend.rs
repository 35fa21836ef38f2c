//! Loader used when no forecast backend is configured.

use crate::domain::error::BackendError;
use crate::ports::forecast_port::{BackendLoader, ForecastBackend};
use std::sync::Arc;

/// Never produces a backend, so every forecast takes the fallback path.
#[derive(Debug, Clone)]
pub struct UnavailableLoader {
    reason: String,
}

impl UnavailableLoader {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for UnavailableLoader {
    fn default() -> Self {
        Self::new("no forecast backend configured")
    }
}

impl BackendLoader for UnavailableLoader {
    fn load(&self) -> Result<Arc<dyn ForecastBackend>, BackendError> {
        Err(BackendError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}
