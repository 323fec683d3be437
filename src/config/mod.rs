//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (check name, default deadline, protocol codes)
//! - CLI option types and parsing
//! - The validated `Config` consumed by the check pipeline

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{parse_additional_names, Config, Endpoint, LogFormat, LogLevel, Opt, Thresholds};
