//! check_ssl_certificate library: TLS certificate monitoring check
//!
//! This library connects to a service (directly over TLS, or after an SMTP or
//! ManageSieve STARTTLS exchange), retrieves the leaf certificate it presents
//! and checks that the certificate covers the expected host names and is not
//! about to expire. The verdict is returned as a [`Plugin`] ready to be printed
//! for a Nagios-compatible supervisor.
//!
//! # Example
//!
//! ```no_run
//! use check_ssl_certificate::{run_check, Config, Endpoint, StartTls, Thresholds};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     endpoint: Endpoint::new("mail.example.org", 25)?,
//!     thresholds: Thresholds::new(Some(30), Some(7))?,
//!     additional_names: Vec::new(),
//!     allow_cn_only: false,
//!     start_tls: StartTls::Smtp,
//!     timeout: Duration::from_secs(10),
//! };
//!
//! let report = run_check(&config).await;
//! println!("{report}");
//! std::process::exit(report.status().exit_code());
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
pub mod initialization;
mod models;
pub mod plugin;
mod starttls;
mod tls;
pub mod validation;

// Re-export public API
pub use config::{Config, Endpoint, LogFormat, LogLevel, Opt, Thresholds};
pub use error_handling::{CheckError, ConfigError, ErrorType, InitializationError};
pub use models::AcquiredCertificate;
pub use plugin::{Plugin, Status};
pub use run::{config_error_report, report_certificate, run_check};
pub use starttls::{supported_protocols, StartTls};
pub use tls::{fetch_certificate, read_leaf_certificate};

// Internal run module (contains the check pipeline)
mod run {
    use chrono::{DateTime, Utc};
    use log::{debug, warn};

    use crate::config::{Config, Thresholds, CHECK_NAME, VALIDITY_PERFDATA_LABEL};
    use crate::error_handling::ConfigError;
    use crate::models::AcquiredCertificate;
    use crate::plugin::{PerfData, PerfDataRange, Plugin, Status, UnitOfMeasurement};
    use crate::tls::fetch_certificate;
    use crate::validation::{check_names, evaluate_expiry, NameCheckOutcome};

    /// Runs the certificate check described by `config`.
    ///
    /// Fetches the certificate, validates its names, then its expiry. Failing
    /// to obtain a certificate gives UNKNOWN with the error as the message.
    /// The returned plugin always carries exactly one final state.
    pub async fn run_check(config: &Config) -> Plugin {
        let mut plugin = Plugin::new(CHECK_NAME);

        match fetch_certificate(&config.endpoint, config.start_tls, config.timeout).await {
            Ok(certificate) => report_certificate(&mut plugin, config, &certificate, Utc::now()),
            Err(e) => {
                warn!("Certificate check of {} failed ({}): {e}", config.endpoint, e.error_type());
                plugin.set_state(Status::Unknown, e.to_string());
            }
        }

        plugin
    }

    /// Applies name and expiry validation to `certificate` as of `now`.
    ///
    /// Expiry, and with it the `validity` record, is only evaluated once the
    /// names pass.
    pub fn report_certificate(
        plugin: &mut Plugin,
        config: &Config,
        certificate: &AcquiredCertificate,
        now: DateTime<Utc>,
    ) {
        let outcome = check_names(
            certificate,
            &config.endpoint.host,
            &config.additional_names,
            config.allow_cn_only,
        );
        debug!("Name check for {}: {outcome:?}", config.endpoint.host);

        match outcome {
            NameCheckOutcome::AllNamesMatched | NameCheckOutcome::CnFallbackUsed => {
                let verdict = evaluate_expiry(certificate.not_after, now, &config.thresholds);
                plugin.set_state(verdict.state, verdict.message());
                plugin.add_perf_data(validity_perf_data(
                    verdict.days_remaining,
                    &config.thresholds,
                ));
            }
            NameCheckOutcome::SanMismatch { missing } => {
                plugin.add_lines(
                    missing
                        .iter()
                        .map(|name| format!("missing DNS name {name} in certificate")),
                );
                plugin.set_state(Status::Critical, "names missing from SAN domain names");
            }
            NameCheckOutcome::CnMismatch => {
                plugin.set_state(Status::Critical, "incorrect certificate CN");
            }
            NameCheckOutcome::SanAbsentAndFallbackDisallowed => {
                plugin.set_state(Status::Warning, "certificate doesn't have SAN domain names");
            }
        }
    }

    /// UNKNOWN report for a configuration rejected before any network I/O.
    pub fn config_error_report(error: &ConfigError) -> Plugin {
        let mut plugin = Plugin::new(CHECK_NAME);
        plugin.set_state(Status::Unknown, error.to_string());
        plugin
    }

    fn validity_perf_data(days: i64, thresholds: &Thresholds) -> PerfData {
        let mut pd = PerfData::new(VALIDITY_PERFDATA_LABEL, UnitOfMeasurement::None, days);
        if let Some(warning) = thresholds.warning() {
            pd = pd.with_warn(PerfDataRange::at_most(warning));
        }
        if let Some(critical) = thresholds.critical() {
            pd = pd.with_crit(PerfDataRange::at_most(critical));
        }
        pd
    }

}
