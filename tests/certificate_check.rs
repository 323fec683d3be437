//! End-to-end checks against local TLS services.

mod helpers;

use std::time::Duration;

use tokio::io::AsyncReadExt;

use check_ssl_certificate::{fetch_certificate, run_check, CheckError, StartTls, Status};
use helpers::{
    acceptor, config_for, make_certificate, make_certificate_with_subject, serve_tls,
    spawn_server, DnType,
};

async fn tls_service(common_name: &str, sans: &[&str], days: i64) -> u16 {
    let acceptor = acceptor(&make_certificate(common_name, sans, days));
    let addr = spawn_server(move |sock| serve_tls(acceptor, sock)).await;
    addr.port()
}

#[tokio::test]
async fn test_fetch_direct_tls_certificate() {
    let port = tls_service("localhost", &["localhost", "www.localhost"], 90).await;
    let config = config_for(port, StartTls::None);

    let certificate = fetch_certificate(&config.endpoint, StartTls::None, config.timeout)
        .await
        .expect("certificate should be fetched");

    assert_eq!(certificate.subject, "CN=localhost,O=Monitoring Test");
    assert_eq!(
        certificate.subject_alternative_names,
        vec!["localhost", "www.localhost"]
    );
    assert!(certificate.tls_version.is_some());
}

#[tokio::test]
async fn test_healthy_certificate_is_ok() {
    let port = tls_service("localhost", &["localhost"], 90).await;
    let report = run_check(&config_for(port, StartTls::None)).await;

    assert_eq!(report.status(), Status::Ok, "{report}");
    let output = report.to_string();
    assert!(
        output.starts_with("Certificate check OK: certificate will expire in "),
        "{output}"
    );
    assert!(output.contains(" | validity="), "{output}");
    assert!(output.ends_with(";~:30;~:7;;"), "{output}");
}

#[tokio::test]
async fn test_expiry_thresholds() {
    for (days, expected) in [(20, Status::Warning), (3, Status::Critical)] {
        let port = tls_service("localhost", &["localhost"], days).await;
        let report = run_check(&config_for(port, StartTls::None)).await;

        assert_eq!(report.status(), expected, "{report}");
        assert!(report.message().starts_with("certificate will expire in "));
    }
}

#[tokio::test]
async fn test_missing_additional_name_is_critical() {
    let port = tls_service("localhost", &["localhost", "mail.localhost"], 90).await;
    let mut config = config_for(port, StartTls::None);
    config.additional_names = vec!["mail.localhost".to_string(), "smtp.localhost".to_string()];

    let report = run_check(&config).await;

    assert_eq!(report.status(), Status::Critical);
    assert_eq!(report.message(), "names missing from SAN domain names");
    assert_eq!(report.lines(), ["missing DNS name smtp.localhost in certificate"]);
    assert!(report.perf_data().is_empty());
    assert!(!report.to_string().contains('|'));
}

#[tokio::test]
async fn test_certificate_without_san() {
    let port = tls_service("localhost", &[], 90).await;
    let report = run_check(&config_for(port, StartTls::None)).await;

    assert_eq!(report.status(), Status::Warning);
    assert_eq!(report.message(), "certificate doesn't have SAN domain names");
}

#[tokio::test]
async fn test_certificate_without_san_accepted_on_cn() {
    let port = tls_service("localhost", &[], 90).await;
    let mut config = config_for(port, StartTls::None);
    config.allow_cn_only = true;

    let report = run_check(&config).await;

    assert_eq!(report.status(), Status::Ok, "{report}");
}

#[tokio::test]
async fn test_cn_fallback_whatever_the_subject_encoding() {
    let subjects: [&[(DnType, &str)]; 2] = [
        &[
            (DnType::CommonName, "localhost"),
            (DnType::OrganizationName, "Monitoring Test"),
        ],
        &[
            (DnType::CountryName, "FR"),
            (DnType::OrganizationName, "Monitoring Test"),
            (DnType::CommonName, "localhost"),
            (
                DnType::CustomDnType(vec![1, 2, 840, 113549, 1, 9, 1]),
                "admin@localhost",
            ),
        ],
    ];

    for subject in subjects {
        let acceptor = acceptor(&make_certificate_with_subject(subject, &[], 90));
        let addr = spawn_server(move |sock| serve_tls(acceptor, sock)).await;
        let mut config = config_for(addr.port(), StartTls::None);
        config.allow_cn_only = true;

        let report = run_check(&config).await;

        assert_eq!(report.status(), Status::Ok, "subject {subject:?}: {report}");
    }
}

#[tokio::test]
async fn test_connection_refused_is_unknown() {
    // Bind then release a port so nothing listens on it
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut config = config_for(port, StartTls::None);
    config.endpoint.host = "127.0.0.1".to_string();

    let report = run_check(&config).await;

    assert_eq!(report.status(), Status::Unknown);
    assert!(report.perf_data().is_empty());
    assert!(report.message().contains("failed to connect"), "{report}");
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let addr = spawn_server(|mut sock| async move {
        let mut sink = Vec::new();
        let _ = sock.read_to_end(&mut sink).await;
    })
    .await;
    let mut config = config_for(addr.port(), StartTls::Smtp);
    config.timeout = Duration::from_secs(1);

    let error = fetch_certificate(&config.endpoint, StartTls::Smtp, config.timeout)
        .await
        .unwrap_err();
    assert!(matches!(error, CheckError::Timeout(_)), "{error:?}");
}

#[tokio::test]
async fn test_plaintext_service_fails_handshake() {
    let addr = spawn_server(|mut sock| async move {
        use tokio::io::AsyncWriteExt;
        let _ = sock.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n").await;
    })
    .await;

    let report = run_check(&config_for(addr.port(), StartTls::None)).await;

    assert_eq!(report.status(), Status::Unknown, "{report}");
}
