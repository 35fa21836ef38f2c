//! Core domain types and logic.

pub mod analysis;
pub mod config;
pub mod error;
pub mod forecast;
pub mod indicator;
pub mod indicator_set;
pub mod period;
pub mod price_series;
