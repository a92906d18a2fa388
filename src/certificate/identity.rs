// src/certificate/identity.rs

//! Consumer identity certificate
//!
//! A registered system holds an identity certificate (`cert.pem`) and its
//! private key (`key.pem`). The subject common name is the consumer UUID the
//! entitlement server knows this system by. When either file is missing the
//! system is not registered and there is no authenticated connection to use.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use x509_cert::Certificate;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::der::asn1::ObjectIdentifier;
use x509_cert::der::{Decode, Tag, Tagged};

/// id-at-commonName
const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// File name of the identity certificate within the consumer directory
pub const IDENTITY_CERT_FILE: &str = "cert.pem";

/// File name of the identity key within the consumer directory
pub const IDENTITY_KEY_FILE: &str = "key.pem";

/// Fields of an X.509 certificate this crate cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub serial: u64,
    pub common_name: Option<String>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    /// Parse the first `CERTIFICATE` block of a PEM document
    pub fn from_pem(document: &[u8]) -> Result<Self> {
        let blocks = pem::parse_many(document)
            .map_err(|e| Error::ParseError(format!("Failed to parse PEM: {e}")))?;
        let block = blocks
            .iter()
            .find(|b| b.tag() == "CERTIFICATE")
            .ok_or_else(|| Error::ParseError("No CERTIFICATE block found".to_string()))?;

        let cert = Certificate::from_der(block.contents())
            .map_err(|e| Error::ParseError(format!("Invalid X.509 certificate: {e}")))?;
        let tbs = &cert.tbs_certificate;

        let common_name = tbs
            .subject
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .find(|atv| atv.oid == COMMON_NAME)
            .and_then(attribute_string);

        Ok(Self {
            serial: serial_to_u64(tbs.serial_number.as_bytes())?,
            common_name,
            not_before: to_datetime(tbs.validity.not_before.to_unix_duration())?,
            not_after: to_datetime(tbs.validity.not_after.to_unix_duration())?,
        })
    }

    /// Whether `now` falls inside the validity window
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }
}

/// Decoded value of a directory string attribute
fn attribute_string(atv: &AttributeTypeAndValue) -> Option<String> {
    match atv.value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String | Tag::TeletexString => {
            std::str::from_utf8(atv.value.value()).ok().map(str::to_string)
        }
        tag => {
            warn!("Unsupported string type {} in certificate subject", tag);
            None
        }
    }
}

fn serial_to_u64(bytes: &[u8]) -> Result<u64> {
    let significant: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
    if significant.len() > 8 {
        return Err(Error::ParseError(format!(
            "Certificate serial is {} bytes wide",
            significant.len()
        )));
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn to_datetime(since_epoch: std::time::Duration) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(since_epoch.as_secs() as i64, 0)
        .ok_or_else(|| Error::ParseError("Certificate time out of range".to_string()))
}

/// The installed consumer identity
#[derive(Debug, Clone)]
pub struct ConsumerIdentity {
    /// Consumer UUID (subject common name)
    pub uuid: String,
    pub certificate: CertificateInfo,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl ConsumerIdentity {
    /// Load the identity from a consumer directory
    ///
    /// Returns `Ok(None)` when the certificate or key is missing.
    pub fn load(consumer_dir: &Path) -> Result<Option<Self>> {
        let cert_path = consumer_dir.join(IDENTITY_CERT_FILE);
        let key_path = consumer_dir.join(IDENTITY_KEY_FILE);

        if !cert_path.is_file() || !key_path.is_file() {
            debug!("No consumer identity in {}", consumer_dir.display());
            return Ok(None);
        }

        let document = fs::read(&cert_path).map_err(|e| {
            Error::IoError(format!("Failed to read {}: {e}", cert_path.display()))
        })?;
        let certificate = CertificateInfo::from_pem(&document)?;

        let uuid = certificate.common_name.clone().ok_or_else(|| {
            Error::ParseError(format!(
                "Identity certificate {} has no common name",
                cert_path.display()
            ))
        })?;

        if !certificate.is_valid_at(Utc::now()) {
            warn!(
                "Identity certificate for {} expired on {}",
                uuid, certificate.not_after
            );
        }

        Ok(Some(Self {
            uuid,
            certificate,
            cert_path,
            key_path,
        }))
    }

    /// Load the identity, failing when the system is not registered
    pub fn require(consumer_dir: &Path) -> Result<Self> {
        Self::load(consumer_dir)?.ok_or(Error::NotRegisteredError)
    }
}
