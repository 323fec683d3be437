//! Configuration constants.
//!
//! This module defines the constants shared by the CLI, the check pipeline and
//! the plugin output.

/// Name printed at the start of the plugin output line.
pub const CHECK_NAME: &str = "Certificate check";

/// Label of the performance data record carrying the remaining validity.
pub const VALIDITY_PERFDATA_LABEL: &str = "validity";

/// Default deadline for connect, STARTTLS preamble and TLS handshake together, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// Day arithmetic
/// Seconds in a day
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
/// Added to the remaining validity before dividing so partial days round up
pub const DAY_ROUNDING_SECS: i64 = SECONDS_PER_DAY - 1;

// STARTTLS preambles
/// Host name announced in the SMTP `HELO` command
pub const SMTP_HELO_NAME: &str = "localhost";
/// SMTP reply code for the greeting and the STARTTLS acknowledgement
pub const SMTP_READY: u16 = 220;
/// SMTP reply code for a completed command
pub const SMTP_OK: u16 = 250;
/// Longest reply line accepted from a plaintext server before TLS starts
pub const MAX_PREAMBLE_LINE_LEN: usize = 8 * 1024;
