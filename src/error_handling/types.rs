//! Error type definitions.
//!
//! This module defines the error types used throughout the application. None of
//! them covers a certificate that fails the name or expiry checks: those are
//! ordinary WARNING/CRITICAL results, not errors.

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Rejected command-line values.
///
/// Always detected before any network I/O and reported as UNKNOWN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No `--hostname` given, or an empty one.
    #[error("no hostname specified")]
    MissingHostname,

    /// `--port` missing or outside 1-65535.
    #[error("invalid or missing port number")]
    InvalidPort,

    /// `--warning` below 1.
    #[error("invalid warning threshold")]
    InvalidWarning,

    /// `--critical` below 1.
    #[error("invalid critical threshold")]
    InvalidCritical,

    /// Warning threshold not strictly above the critical threshold.
    #[error("nonsensical thresholds")]
    NonsensicalThresholds,

    /// `--start-tls` names a protocol that is not supported.
    #[error("unsupported StartTLS protocol {0}")]
    UnsupportedProtocol(String),

    /// `--timeout` of zero seconds.
    #[error("invalid timeout")]
    InvalidTimeout,

    /// Anything clap refused to parse.
    #[error("{0}")]
    Usage(String),
}

/// Failures while acquiring the certificate.
///
/// None of these are retried; each one ends the check with UNKNOWN and its
/// message embedded in the plugin output.
#[derive(Error, Debug)]
pub enum CheckError {
    /// TCP connection or name resolution failed.
    #[error("failed to connect to {endpoint}: {source}")]
    Connection {
        /// `host:port` that was dialed
        endpoint: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// The server answered the STARTTLS preamble with something unexpected.
    #[error("{0}")]
    Protocol(String),

    /// I/O failed in the middle of the STARTTLS preamble.
    #[error("STARTTLS exchange failed: {0}")]
    ProtocolIo(#[from] std::io::Error),

    /// The TLS handshake failed.
    #[error("TLS handshake with {endpoint} failed: {source}")]
    Handshake {
        /// `host:port` of the peer
        endpoint: String,
        /// Underlying TLS error
        #[source]
        source: std::io::Error,
    },

    /// The TLS client could not be configured.
    #[error("TLS client configuration error: {0}")]
    TlsConfig(#[from] rustls::Error),

    /// The requested host name cannot be used as a TLS server name.
    #[error("invalid server name {0}")]
    InvalidServerName(String),

    /// The handshake completed without the peer presenting a certificate.
    #[error("server did not present a certificate")]
    NoPeerCertificate,

    /// The leaf certificate could not be decoded.
    #[error("could not parse server certificate: {0:#}")]
    InvalidCertificate(#[source] anyhow::Error),

    /// Connect, preamble and handshake did not finish within the deadline.
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Broad category of a `CheckError`, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// TCP or DNS failure
    ConnectionError,
    /// Unexpected STARTTLS response
    ProtocolError,
    /// TLS negotiation failure
    HandshakeError,
    /// Missing or undecodable certificate
    CertificateError,
    /// Deadline exceeded
    TimeoutError,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Human-readable category name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ConnectionError => "connection error",
            ErrorType::ProtocolError => "protocol error",
            ErrorType::HandshakeError => "handshake error",
            ErrorType::CertificateError => "certificate error",
            ErrorType::TimeoutError => "timeout",
        }
    }
}

impl CheckError {
    /// Category of this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            CheckError::Connection { .. } => ErrorType::ConnectionError,
            CheckError::Protocol(_) | CheckError::ProtocolIo(_) => ErrorType::ProtocolError,
            CheckError::Handshake { .. }
            | CheckError::TlsConfig(_)
            | CheckError::InvalidServerName(_) => ErrorType::HandshakeError,
            CheckError::NoPeerCertificate | CheckError::InvalidCertificate(_) => {
                ErrorType::CertificateError
            }
            CheckError::Timeout(_) => ErrorType::TimeoutError,
        }
    }
}
