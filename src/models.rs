use chrono::{DateTime, Utc};

/// Leaf certificate presented by the server, reduced to what the checks use.
///
/// Built once per check from a fresh handshake and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredCertificate {
    /// Subject in canonical order (CN before O, OU and C whatever the encoding), e.g. `CN=host,O=Org`
    pub subject: String,
    /// DNS names of the Subject Alternative Name extension, in certificate order
    pub subject_alternative_names: Vec<String>,
    /// End of the validity period
    pub not_after: DateTime<Utc>,
    /// Issuer, for logging
    pub issuer: String,
    /// Negotiated protocol version, for logging
    pub tls_version: Option<String>,
}
