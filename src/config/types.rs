//! Configuration types and CLI options.
//!
//! `Opt` is the raw command line as `clap` parses it. It is converted into a
//! validated `Config` before any network I/O happens, so every value the check
//! pipeline sees has already been checked.

use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::DEFAULT_TIMEOUT_SECS;
use crate::error_handling::ConfigError;
use crate::starttls::{supported_protocols, StartTls};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

fn start_tls_help() -> String {
    format!(
        "Protocol to use before requesting a switch to TLS. Supported protocols: {}.",
        supported_protocols()
    )
}

/// Command-line options.
///
/// Numeric options are signed and unchecked here. `Config::try_from` does the
/// range checks and out-of-range values end as an UNKNOWN plugin result.
///
/// # Examples
///
/// ```bash
/// # Direct TLS, warn at 30 days, critical at 7
/// check_ssl_certificate -H www.example.org -P 443 -W 30 -C 7
///
/// # SMTP submission with STARTTLS and an extra required name
/// check_ssl_certificate -H mx.example.org -P 25 -s smtp -a smtp.example.org
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "check_ssl_certificate",
    version,
    about = "Checks the names and expiry date of the TLS certificate presented by a service."
)]
pub struct Opt {
    /// Host name to connect to.
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// Port to connect to.
    #[arg(short = 'P', long, allow_negative_numbers = true)]
    pub port: Option<i64>,

    /// Validity threshold below which a warning state is issued, in days.
    #[arg(short = 'W', long, allow_negative_numbers = true)]
    pub warning: Option<i64>,

    /// Validity threshold below which a critical state is issued, in days.
    #[arg(short = 'C', long, allow_negative_numbers = true)]
    pub critical: Option<i64>,

    /// Do not issue warnings regarding certificates that do not use SANs at all.
    #[arg(long)]
    pub ignore_cn_only: bool,

    /// A comma-separated list of names that the certificate should also provide.
    #[arg(short = 'a', long, default_value = "")]
    pub additional_names: String,

    /// Protocol to run before the TLS handshake (empty for direct TLS).
    #[arg(short = 's', long, default_value = "", help = start_tls_help())]
    pub start_tls: String,

    /// Deadline for connecting, the STARTTLS exchange and the TLS handshake, in seconds.
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Host and TCP port of the service being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name (lowercased) or IP literal
    pub host: String,
    /// TCP port, never 0
    pub port: u16,
}

impl Endpoint {
    /// Builds an endpoint, rejecting ports outside 1-65535.
    pub fn new(host: impl Into<String>, port: i64) -> Result<Self, ConfigError> {
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(ConfigError::InvalidPort)?;
        Ok(Self {
            host: host.into(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Warning and critical validity thresholds, in days.
///
/// When both are set, `warning` is strictly greater than `critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    warning: Option<u32>,
    critical: Option<u32>,
}

impl Thresholds {
    /// Validates and builds a threshold pair.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWarning`/`InvalidCritical` for values below 1
    /// and `ConfigError::NonsensicalThresholds` if the warning threshold would
    /// not fire before the critical one.
    pub fn new(warning: Option<i64>, critical: Option<i64>) -> Result<Self, ConfigError> {
        let warning = warning
            .map(|w| positive_days(w).ok_or(ConfigError::InvalidWarning))
            .transpose()?;
        let critical = critical
            .map(|c| positive_days(c).ok_or(ConfigError::InvalidCritical))
            .transpose()?;
        if let (Some(w), Some(c)) = (warning, critical) {
            if w <= c {
                return Err(ConfigError::NonsensicalThresholds);
            }
        }
        Ok(Self { warning, critical })
    }

    /// Warning threshold in days, if any.
    pub fn warning(&self) -> Option<u32> {
        self.warning
    }

    /// Critical threshold in days, if any.
    pub fn critical(&self) -> Option<u32> {
        self.critical
    }
}

fn positive_days(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v > 0)
}

/// Validated check configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use check_ssl_certificate::{Config, Endpoint, StartTls, Thresholds};
/// use std::time::Duration;
///
/// let config = Config {
///     endpoint: Endpoint::new("mail.example.org", 25).unwrap(),
///     thresholds: Thresholds::new(Some(30), Some(7)).unwrap(),
///     additional_names: vec!["smtp.example.org".to_string()],
///     allow_cn_only: false,
///     start_tls: StartTls::Smtp,
///     timeout: Duration::from_secs(10),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Service to connect to
    pub endpoint: Endpoint,
    /// Validity thresholds
    pub thresholds: Thresholds,
    /// Extra names the certificate must list, lowercased
    pub additional_names: Vec<String>,
    /// Accept SAN-less certificates whose CN matches the host name
    pub allow_cn_only: bool,
    /// Plaintext preamble to run before the TLS handshake
    pub start_tls: StartTls,
    /// Deadline for connect, preamble and handshake
    pub timeout: Duration,
}

impl TryFrom<&Opt> for Config {
    type Error = ConfigError;

    fn try_from(opt: &Opt) -> Result<Self, Self::Error> {
        let hostname = opt
            .hostname
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHostname)?
            .to_lowercase();
        let endpoint = Endpoint::new(hostname, opt.port.ok_or(ConfigError::InvalidPort)?)?;
        let thresholds = Thresholds::new(opt.warning, opt.critical)?;
        let start_tls = StartTls::from_identifier(&opt.start_tls)?;
        if opt.timeout == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(Self {
            endpoint,
            thresholds,
            additional_names: parse_additional_names(&opt.additional_names),
            allow_cn_only: opt.ignore_cn_only,
            start_tls,
            timeout: Duration::from_secs(opt.timeout),
        })
    }
}

/// Splits the `--additional-names` value into lowercased names.
///
/// Blank entries are dropped, so an empty argument is the empty set.
pub fn parse_additional_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
        .collect()
}
