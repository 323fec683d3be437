//! Certificate validation policy.
//!
//! Two checks run in order on the acquired certificate:
//! - `check_names()` - host name and additional names against the SANs, with
//!   an optional fallback to the subject CN for SAN-less certificates
//! - `evaluate_expiry()` - remaining whole days against the thresholds
//!
//! Both are pure functions of the certificate, the configuration and (for
//! expiry) the current time. A failed check is a WARNING/CRITICAL outcome,
//! never an error.

mod expiry;
mod names;

pub use expiry::{days_remaining, evaluate_expiry, ExpiryVerdict};
pub use names::{check_names, NameCheckOutcome};
