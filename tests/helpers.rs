// Shared test helpers for certificate generation and mock TLS services.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
#[allow(unused_imports)] // Used by other test files
pub use rcgen::DnType;
use rcgen::{CertificateParams, DistinguishedName, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

use check_ssl_certificate::{Config, Endpoint, StartTls, Thresholds};

/// Self-signed certificate and its private key.
pub struct TestCertificate {
    pub der: CertificateDer<'static>,
    pub key: PrivateKeyDer<'static>,
}

/// Generates a self-signed certificate valid until midnight (UTC) `days` days from now.
///
/// An empty `sans` produces a certificate without the SAN extension.
pub fn make_certificate(common_name: &str, sans: &[&str], days: i64) -> TestCertificate {
    make_certificate_with_subject(
        &[
            (DnType::OrganizationName, "Monitoring Test"),
            (DnType::CommonName, common_name),
        ],
        sans,
        days,
    )
}

/// Like `make_certificate`, with the subject attributes encoded in the given order.
pub fn make_certificate_with_subject(
    subject: &[(DnType, &str)],
    sans: &[&str],
    days: i64,
) -> TestCertificate {
    let mut params =
        CertificateParams::new(sans.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .expect("Failed to build certificate parameters");
    params.distinguished_name = DistinguishedName::new();
    for (kind, value) in subject {
        params.distinguished_name.push(kind.clone(), *value);
    }
    let expiry = (Utc::now() + chrono::Duration::days(days)).date_naive();
    params.not_after = rcgen::date_time_ymd(expiry.year(), expiry.month() as u8, expiry.day() as u8);

    let key_pair = KeyPair::generate().expect("Failed to generate key pair");
    let cert = params
        .self_signed(&key_pair)
        .expect("Failed to self-sign certificate");

    TestCertificate {
        der: cert.der().clone(),
        key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der())),
    }
}

/// TLS acceptor serving `cert`.
pub fn acceptor(cert: &TestCertificate) -> TlsAcceptor {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(rustls::ALL_VERSIONS)
        .expect("Failed to select protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![cert.der.clone()], cert.key.clone_key())
        .expect("Failed to build server config");
    TlsAcceptor::from(Arc::new(config))
}

/// Accepts a single connection on an ephemeral local port and hands it to `handler`.
pub async fn spawn_server<F, Fut>(handler: F) -> SocketAddr
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener address");
    tokio::spawn(async move {
        if let Ok((sock, _)) = listener.accept().await {
            handler(sock).await;
        }
    });
    addr
}

/// Completes a TLS handshake on `sock`, then waits for the client to go away.
pub async fn serve_tls(acceptor: TlsAcceptor, sock: TcpStream) {
    if let Ok(mut tls) = acceptor.accept(sock).await {
        let mut sink = Vec::new();
        let _ = tls.read_to_end(&mut sink).await;
    }
}

/// Check configuration for `localhost` on `port`.
#[allow(dead_code)] // Used by other test files
pub fn config_for(port: u16, start_tls: StartTls) -> Config {
    Config {
        endpoint: Endpoint::new("localhost", i64::from(port)).expect("valid port"),
        thresholds: Thresholds::new(Some(30), Some(7)).expect("valid thresholds"),
        additional_names: Vec::new(),
        allow_cn_only: false,
        start_tls,
        timeout: Duration::from_secs(5),
    }
}
