// Domain module - Configuration data and error types
pub mod config;
pub mod error;
