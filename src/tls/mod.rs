//! TLS certificate acquisition.
//!
//! This module connects to the service, runs the STARTTLS preamble if one is
//! configured, performs the TLS handshake and extracts the leaf certificate.
//!
//! Chain-of-trust verification is disabled: the check reports on whatever
//! certificate the server presents, trusted or not. The oldest protocol
//! version `rustls` offers (TLS 1.2) is enabled alongside TLS 1.3.
//!
//! Uses `tokio-rustls` for async TLS connections and `x509-parser` for certificate parsing.

mod extract;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::config::Endpoint;
use crate::error_handling::CheckError;
use crate::models::AcquiredCertificate;
use crate::starttls::StartTls;

/// Accepts every server certificate and signature.
#[derive(Debug)]
struct AcceptAnyServerCert {
    supported_schemes: Vec<SignatureScheme>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.supported_schemes.clone()
    }
}

/// Client configuration used for every check.
///
/// Uses the process-wide crypto provider when one was installed, `ring` otherwise.
fn client_config() -> Result<ClientConfig, RustlsError> {
    let provider = CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(ring::default_provider()));
    let verifier = Arc::new(AcceptAnyServerCert {
        supported_schemes: provider.signature_verification_algorithms.supported_schemes(),
    });

    Ok(ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(rustls::ALL_VERSIONS)?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth())
}

/// Retrieves the leaf certificate presented by `endpoint`.
///
/// Connect, STARTTLS preamble and handshake together must finish within
/// `timeout`. Nothing is retried: the first failure is returned.
///
/// # Errors
///
/// Returns `CheckError::Connection` if the TCP connection fails,
/// `CheckError::Protocol` if the STARTTLS exchange goes wrong,
/// `CheckError::Handshake` if TLS negotiation fails,
/// `CheckError::NoPeerCertificate`/`InvalidCertificate` if there is no usable
/// leaf, and `CheckError::Timeout` when the deadline passes.
pub async fn fetch_certificate(
    endpoint: &Endpoint,
    start_tls: StartTls,
    timeout: Duration,
) -> Result<AcquiredCertificate, CheckError> {
    tokio::time::timeout(timeout, acquire(endpoint, start_tls))
        .await
        .map_err(|_| CheckError::Timeout(timeout))?
}

async fn acquire(endpoint: &Endpoint, start_tls: StartTls) -> Result<AcquiredCertificate, CheckError> {
    debug!("Attempting to connect to {endpoint}");
    let mut sock = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|source| CheckError::Connection {
            endpoint: endpoint.to_string(),
            source,
        })?;

    if start_tls != StartTls::None {
        debug!("Running {} STARTTLS preamble with {endpoint}", start_tls.identifier());
    }
    start_tls.negotiate(&mut sock).await?;

    read_leaf_certificate(sock, endpoint).await
}

/// Performs the TLS handshake on an already negotiated stream and extracts
/// the first certificate the peer presented.
///
/// The host name of `endpoint` is used as the server name (SNI for DNS names).
pub async fn read_leaf_certificate<S>(
    stream: S,
    endpoint: &Endpoint,
) -> Result<AcquiredCertificate, CheckError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let server_name = ServerName::try_from(endpoint.host.clone())
        .map_err(|_| CheckError::InvalidServerName(endpoint.host.clone()))?;
    let connector = TlsConnector::from(Arc::new(client_config()?));

    debug!("Starting TLS handshake with {endpoint}");
    let mut tls_stream =
        connector
            .connect(server_name, stream)
            .await
            .map_err(|source| CheckError::Handshake {
                endpoint: endpoint.to_string(),
                source,
            })?;

    let (_, session) = tls_stream.get_ref();
    let leaf = session
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or(CheckError::NoPeerCertificate)?;
    let mut certificate =
        extract::parse_leaf_certificate(leaf.as_ref()).map_err(CheckError::InvalidCertificate)?;
    certificate.tls_version = session.protocol_version().map(|v| format!("{v:?}"));

    info!(
        "Certificate for {endpoint}: subject {}, issuer {}, expires {}, {} SAN(s), {}",
        certificate.subject,
        certificate.issuer,
        certificate.not_after,
        certificate.subject_alternative_names.len(),
        certificate.tls_version.as_deref().unwrap_or("unknown version")
    );

    // close_notify is a courtesy; the certificate is already in hand
    let _ = tls_stream.shutdown().await;

    Ok(certificate)
}
