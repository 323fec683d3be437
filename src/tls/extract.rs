//! Certificate extraction utilities.

use anyhow::{Context, Result};
use chrono::DateTime;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::objects::{oid2abbrev, oid_registry};
use x509_parser::x509::X509Name;

use crate::models::AcquiredCertificate;

/// Decodes the DER leaf certificate into the fields the checks need.
///
/// # Errors
///
/// Returns an error if the bytes are not an X.509 certificate or if the
/// expiry date cannot be represented.
pub(crate) fn parse_leaf_certificate(der: &[u8]) -> Result<AcquiredCertificate> {
    let (_, cert) =
        x509_parser::parse_x509_certificate(der).context("leaf is not a valid X.509 certificate")?;

    let not_after_ts = cert.validity().not_after.timestamp();
    let not_after = DateTime::from_timestamp(not_after_ts, 0)
        .with_context(|| format!("certificate expiry {not_after_ts} is out of range"))?;

    Ok(AcquiredCertificate {
        subject: canonical_subject(cert.subject()),
        subject_alternative_names: extract_certificate_sans(&cert),
        not_after,
        issuer: cert.issuer().to_string(),
        tls_version: None,
    })
}

/// Standard attributes, in the order they are emitted before reversal.
const NAMED_ATTRIBUTES: &[(&str, &str)] = &[
    ("2.5.4.6", "C"),
    ("2.5.4.8", "ST"),
    ("2.5.4.7", "L"),
    ("2.5.4.9", "STREET"),
    ("2.5.4.17", "POSTALCODE"),
    ("2.5.4.10", "O"),
    ("2.5.4.11", "OU"),
    ("2.5.4.3", "CN"),
    ("2.5.4.5", "SERIALNUMBER"),
];

/// Attributes that keep only their last value.
const SINGLE_VALUED: &[&str] = &["CN", "SERIALNUMBER"];

/// Renders a subject in canonical order, independent of how it was encoded.
///
/// Standard attributes are grouped by type and written most specific first
/// (`SERIALNUMBER`, `CN`, `OU`, `O`, ..., `C`), repeated values of a type
/// joined with `+`. Any other attribute (e.g. `emailAddress`) follows, last
/// encoded first. A certificate with a common name therefore renders as
/// `CN=<name>,...` unless it also carries a serial number.
fn canonical_subject(name: &X509Name<'_>) -> String {
    let registry = oid_registry();
    let mut named: Vec<Vec<String>> = vec![Vec::new(); NAMED_ATTRIBUTES.len()];
    let mut others: Vec<String> = Vec::new();

    for attr in name.iter_attributes() {
        let oid = attr.attr_type().to_id_string();
        let raw = attr.as_str().unwrap_or("#");
        let value = escape_attribute_value(raw);

        match NAMED_ATTRIBUTES.iter().position(|(id, _)| *id == oid) {
            Some(slot) => {
                let key = NAMED_ATTRIBUTES[slot].1;
                let rendered = format!("{key}={value}");
                if SINGLE_VALUED.contains(&key) {
                    named[slot].clear();
                    if !raw.is_empty() {
                        named[slot].push(rendered);
                    }
                } else {
                    named[slot].push(rendered);
                }
            }
            None => {
                let key = oid2abbrev(attr.attr_type(), registry)
                    .map(str::to_string)
                    .unwrap_or(oid);
                others.push(format!("{key}={value}"));
            }
        }
    }

    named
        .iter()
        .rev()
        .filter(|values| !values.is_empty())
        .map(|values| values.join("+"))
        .chain(others.into_iter().rev())
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let leading = i == 0 && (c == ' ' || c == '#');
        let trailing = i == last && c == ' ';
        if leading || trailing || matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Extracts the DNS names of the Subject Alternative Name extension.
///
/// Other name types (IP addresses, e-mail addresses, URIs) are ignored: the
/// host name checks only ever compare DNS names.
fn extract_certificate_sans(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();

    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(ref san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    sans.push(dns_name.to_string());
                }
            }
        }
    }

    sans
}
