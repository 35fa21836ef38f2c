//! Concrete adapter implementations for ports.

pub mod command_backend;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod unavailable_backend;
