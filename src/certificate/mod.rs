// src/certificate/mod.rs

//! Identity and entitlement certificates
//!
//! This module provides:
//! - Decoding of the compressed content payload of entitlement certificates
//! - Parsing of the consumer identity certificate
//! - The on-disk entitlement certificate/key directory

mod identity;
mod payload;
mod store;

pub use identity::{CertificateInfo, ConsumerIdentity, IDENTITY_CERT_FILE, IDENTITY_KEY_FILE};
pub use payload::{ENTITLEMENT_DATA_TAG, decode_entitlement_payload};
pub use store::{EntitlementCertificate, EntitlementDirectory, EntitlementKeyMaterial};
