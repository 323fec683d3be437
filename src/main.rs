//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `check_ssl_certificate` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Printing the plugin output and exiting with its status code
//!
//! All core functionality is implemented in the library crate. Every path,
//! including bad arguments, ends in exactly one printed report and an exit
//! code the supervisor understands (0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN).

use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;

use check_ssl_certificate::config::CHECK_NAME;
use check_ssl_certificate::initialization::{init_crypto_provider, init_logger_with};
use check_ssl_certificate::{config_error_report, run_check, Config, ConfigError, Opt, Plugin, Status};

fn main() {
    let report = match Opt::try_parse() {
        Ok(opt) => check(&opt),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => config_error_report(&ConfigError::Usage(usage_message(&e))),
    };

    println!("{report}");
    process::exit(report.status().exit_code());
}

/// Validates the options and runs the check.
fn check(opt: &Opt) -> Plugin {
    // Logging is best effort: the plugin output does not depend on it
    if let Err(e) = init_logger_with(opt.log_level.clone().into(), opt.log_format.clone()) {
        eprintln!("check_ssl_certificate: {e}");
    }

    let config = match Config::try_from(opt) {
        Ok(config) => config,
        Err(e) => {
            log::debug!("Rejected configuration: {e}");
            return config_error_report(&e);
        }
    };

    init_crypto_provider();

    match run(&config) {
        Ok(report) => report,
        Err(e) => {
            let mut report = Plugin::new(CHECK_NAME);
            report.set_state(Status::Unknown, format!("{e:#}"));
            report
        }
    }
}

fn run(config: &Config) -> Result<Plugin> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    Ok(runtime.block_on(run_check(config)))
}

/// First line of a clap error, without its `error: ` prefix.
fn usage_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default().trim();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
