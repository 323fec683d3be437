//! Error handling.
//!
//! This module provides the error types of the check:
//! - **Configuration errors**: rejected flags, detected before any network I/O
//! - **Check errors**: connection, STARTTLS, handshake and certificate failures
//! - **Initialization errors**: logger setup
//!
//! Every error ends the check with an UNKNOWN status. Certificates that fail
//! validation are not errors and never pass through these types.

mod types;

// Re-export public API
pub use types::{CheckError, ConfigError, ErrorType, InitializationError};
