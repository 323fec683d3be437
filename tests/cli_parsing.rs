//! Tests for command-line parsing and validation into a `Config`.

use std::time::Duration;

use clap::Parser;
use check_ssl_certificate::{config_error_report, Config, ConfigError, Opt, StartTls, Status};

fn parse(args: &[&str]) -> Result<Config, ConfigError> {
    let mut argv = vec!["check_ssl_certificate"];
    argv.extend_from_slice(args);
    let opt = Opt::try_parse_from(argv).expect("arguments should parse");
    Config::try_from(&opt)
}

#[test]
fn test_full_command_line() {
    let config = parse(&[
        "-H", "MX.Example.org", "-P", "25", "-W", "30", "-C", "7", "-a",
        " smtp.example.org, ,MAIL.example.org", "-s", "smtp", "-t", "20",
        "--ignore-cn-only",
    ])
    .expect("valid configuration");

    assert_eq!(config.endpoint.host, "mx.example.org");
    assert_eq!(config.endpoint.port, 25);
    assert_eq!(config.thresholds.warning(), Some(30));
    assert_eq!(config.thresholds.critical(), Some(7));
    assert_eq!(
        config.additional_names,
        vec!["smtp.example.org", "mail.example.org"]
    );
    assert_eq!(config.start_tls, StartTls::Smtp);
    assert_eq!(config.timeout, Duration::from_secs(20));
    assert!(config.allow_cn_only);
}

#[test]
fn test_long_options_and_defaults() {
    let config = parse(&["--hostname", "sieve.example.org", "--port", "4190", "--start-tls", "sieve"])
        .expect("valid configuration");

    assert_eq!(config.start_tls, StartTls::Sieve);
    assert_eq!(config.thresholds.warning(), None);
    assert_eq!(config.thresholds.critical(), None);
    assert!(config.additional_names.is_empty());
    assert!(!config.allow_cn_only);
    assert_eq!(config.timeout, Duration::from_secs(10));
}

#[test]
fn test_empty_start_tls_means_direct_tls() {
    let config = parse(&["-H", "a.example", "-P", "443", "-s", ""]).unwrap();
    assert_eq!(config.start_tls, StartTls::None);
}

#[test]
fn test_validation_errors() {
    let cases: &[(&[&str], ConfigError)] = &[
        (&["-P", "443"], ConfigError::MissingHostname),
        (&["-H", "", "-P", "443"], ConfigError::MissingHostname),
        (&["-H", "a.example"], ConfigError::InvalidPort),
        (&["-H", "a.example", "-P", "0"], ConfigError::InvalidPort),
        (&["-H", "a.example", "-P", "65536"], ConfigError::InvalidPort),
        (&["-H", "a.example", "-P", "-1"], ConfigError::InvalidPort),
        (&["-H", "a.example", "-P", "443", "-W", "0"], ConfigError::InvalidWarning),
        (&["-H", "a.example", "-P", "443", "-C", "-5"], ConfigError::InvalidCritical),
        (&["-H", "a.example", "-P", "443", "-W", "7", "-C", "7"], ConfigError::NonsensicalThresholds),
        (&["-H", "a.example", "-P", "443", "-W", "5", "-C", "10"], ConfigError::NonsensicalThresholds),
        (
            &["-H", "a.example", "-P", "443", "-s", "imap"],
            ConfigError::UnsupportedProtocol("imap".to_string()),
        ),
        (&["-H", "a.example", "-P", "443", "-t", "0"], ConfigError::InvalidTimeout),
    ];

    for (args, expected) in cases {
        assert_eq!(&parse(args).unwrap_err(), expected, "arguments {args:?}");
    }
}

#[test]
fn test_hostname_checked_before_port() {
    assert_eq!(parse(&[]).unwrap_err(), ConfigError::MissingHostname);
}

#[test]
fn test_rejected_configuration_is_unknown() {
    let error = parse(&["-H", "a.example", "-P", "443", "-s", "imap"]).unwrap_err();
    let report = config_error_report(&error);

    assert_eq!(report.status(), Status::Unknown);
    assert_eq!(report.status().exit_code(), 3);
    assert_eq!(
        report.to_string(),
        "Certificate check UNKNOWN: unsupported StartTLS protocol imap"
    );
}

#[test]
fn test_non_numeric_port_is_a_parse_error() {
    let result = Opt::try_parse_from(["check_ssl_certificate", "-H", "a.example", "-P", "https"]);
    assert!(result.is_err());
}
