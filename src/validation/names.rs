//! Host name validation.

use log::debug;

use crate::models::AcquiredCertificate;

/// Result of matching the requested names against a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCheckOutcome {
    /// Every requested name is listed in the SANs.
    AllNamesMatched,
    /// Some requested names are not in the SANs, in the order they were requested.
    SanMismatch {
        /// Names that were not found
        missing: Vec<String>,
    },
    /// No SANs, but the subject CN matches the host name and fallback is allowed.
    CnFallbackUsed,
    /// No SANs, fallback allowed, and the subject CN does not match.
    CnMismatch,
    /// No SANs and either fallback is disabled or additional names were requested.
    SanAbsentAndFallbackDisallowed,
}

/// Checks that `certificate` covers `hostname` and every name in `additional`.
///
/// With SANs, every missing name is collected before giving a verdict so one
/// run reports all of them. Without SANs, the subject CN may stand in for the
/// host name when `allow_cn_only` is set and no additional names are
/// required, since those can only ever be satisfied by a SAN list.
///
/// Comparisons are case-insensitive.
pub fn check_names(
    certificate: &AcquiredCertificate,
    hostname: &str,
    additional: &[String],
    allow_cn_only: bool,
) -> NameCheckOutcome {
    let sans = &certificate.subject_alternative_names;

    if sans.is_empty() {
        if !allow_cn_only || !additional.is_empty() {
            return NameCheckOutcome::SanAbsentAndFallbackDisallowed;
        }
        return if subject_leads_with_cn(&certificate.subject, hostname) {
            debug!("Certificate has no SAN, CN matches {hostname}");
            NameCheckOutcome::CnFallbackUsed
        } else {
            NameCheckOutcome::CnMismatch
        };
    }

    let mut missing: Vec<String> = Vec::new();
    for name in std::iter::once(hostname).chain(additional.iter().map(String::as_str)) {
        let name = name.to_lowercase();
        let listed = sans.iter().any(|san| san.to_lowercase() == name);
        if !listed && !missing.contains(&name) {
            missing.push(name);
        }
    }

    if missing.is_empty() {
        NameCheckOutcome::AllNamesMatched
    } else {
        NameCheckOutcome::SanMismatch { missing }
    }
}

/// `true` if the canonical subject starts with the RDN `CN=<hostname>`.
fn subject_leads_with_cn(subject: &str, hostname: &str) -> bool {
    let subject = subject.to_lowercase();
    let expected = format!("cn={}", hostname.to_lowercase());
    match subject.strip_prefix(&expected) {
        Some(rest) => rest.is_empty() || rest.starts_with(','),
        None => false,
    }
}
