//! Expiry evaluation.

use chrono::{DateTime, Utc};

use crate::config::{Thresholds, DAY_ROUNDING_SECS, SECONDS_PER_DAY};
use crate::plugin::Status;

/// Expiry classification of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryVerdict {
    /// OK, WARNING or CRITICAL
    pub state: Status,
    /// Whole days left, rounded up; zero or less once expired
    pub days_remaining: i64,
    /// Threshold that produced a WARNING/CRITICAL state, if any
    pub threshold_applied: Option<u32>,
}

impl ExpiryVerdict {
    /// Status message for the plugin output.
    pub fn message(&self) -> String {
        if self.days_remaining <= 0 {
            return "certificate expired".to_string();
        }
        match self.threshold_applied {
            Some(limit) => format!(
                "certificate will expire in {} days (<= {limit})",
                self.days_remaining
            ),
            None => format!("certificate will expire in {} days", self.days_remaining),
        }
    }
}

/// Whole days between `now` and `not_after`, any partial day counting as one.
///
/// The division truncates toward zero, so a certificate that expired less than
/// a day ago yields 0 and older ones a negative count.
pub fn days_remaining(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds_left = (not_after - now).num_seconds();
    (seconds_left + DAY_ROUNDING_SECS) / SECONDS_PER_DAY
}

/// Classifies the remaining validity.
///
/// An expired certificate is CRITICAL whatever the thresholds; then the
/// critical threshold is tried before the warning one.
pub fn evaluate_expiry(
    not_after: DateTime<Utc>,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> ExpiryVerdict {
    let days = days_remaining(not_after, now);
    let (state, threshold_applied) = if days <= 0 {
        (Status::Critical, None)
    } else if let Some(limit) = thresholds.critical().filter(|c| days <= i64::from(*c)) {
        (Status::Critical, Some(limit))
    } else if let Some(limit) = thresholds.warning().filter(|w| days <= i64::from(*w)) {
        (Status::Warning, Some(limit))
    } else {
        (Status::Ok, None)
    };

    ExpiryVerdict {
        state,
        days_remaining: days,
        threshold_applied,
    }
}
