// src/content/mod.rs

//! Entitled content model
//!
//! The inflated entitlement payload is a JSON document describing the
//! subscription and the engineering products it grants, each with its list of
//! content (package repository) definitions:
//!
//! ```json
//! {
//!   "consumer": "5f3a6b0e-...",
//!   "subscription": { "sku": "MCT0001", "name": "Premium Subscription" },
//!   "order": { "start": "2026-01-01T00:00:00Z", "end": "2027-01-01T00:00:00Z" },
//!   "products": [
//!     {
//!       "id": "479", "name": "Example OS", "version": "11",
//!       "architectures": ["x86_64"],
//!       "content": [
//!         {
//!           "id": "1", "type": "yum", "name": "Example OS BaseOS",
//!           "label": "example-11-baseos-rpms", "vendor": "Example",
//!           "path": "/content/dist/example11/$releasever/x86_64/baseos/os",
//!           "gpg_url": "file:///etc/pki/rpm-gpg/RPM-GPG-KEY-example",
//!           "enabled": true, "metadata_expire": 86400,
//!           "required_tags": ["example-11-x86_64"], "arches": ["x86_64"]
//!         }
//!       ]
//!     }
//!   ],
//!   "pool": {}
//! }
//! ```

use crate::certificate::decode_entitlement_payload;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Products granted by each installed entitlement, keyed by certificate serial
pub type ProductCatalog = BTreeMap<i64, Vec<EngineeringProduct>>;

/// Full entitlement payload document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementDocument {
    #[serde(default)]
    pub consumer: Option<String>,

    #[serde(default)]
    pub subscription: Option<Subscription>,

    #[serde(default)]
    pub order: Option<Order>,

    #[serde(default)]
    pub products: Vec<EngineeringProduct>,

    #[serde(default)]
    pub pool: Option<serde_json::Value>,
}

/// Subscription the entitlement was drawn from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
}

/// Order validity window, as timestamps issued by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// A named bundle of content granted by a subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineeringProduct {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub architectures: BTreeSet<String>,

    /// Content definitions in document order
    #[serde(default)]
    pub content: Vec<Content>,
}

/// One package repository definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default)]
    pub content_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub vendor: String,

    /// Path template, possibly containing `$releasever`
    #[serde(default)]
    pub path: String,

    /// Absent means enabled; kept tri-state so consumers apply the default
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub arches: Vec<String>,

    #[serde(default, alias = "gpgUrl")]
    pub gpg_url: Option<String>,

    #[serde(default, alias = "metadataExpire")]
    pub metadata_expire: Option<i64>,

    #[serde(default, alias = "requiredTags")]
    pub required_tags: Vec<String>,
}

impl Content {
    /// Effective enabled flag: absent counts as enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// GPG key URL, treating an empty string as no key
    pub fn gpg_key(&self) -> Option<&str> {
        self.gpg_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Deserialize an inflated entitlement payload
pub fn parse_entitlement_document(data: &[u8]) -> Result<EntitlementDocument> {
    let document: EntitlementDocument = serde_json::from_slice(data)?;
    debug!(
        "Parsed entitlement document with {} products",
        document.products.len()
    );
    Ok(document)
}

/// Deserialize an inflated entitlement payload, keeping only its products
pub fn parse_products(data: &[u8]) -> Result<Vec<EngineeringProduct>> {
    Ok(parse_entitlement_document(data)?.products)
}

/// Decode and parse the products of one entitlement certificate document
pub fn extract_products(certificate: &[u8]) -> Result<Vec<EngineeringProduct>> {
    let payload = decode_entitlement_payload(certificate)?;
    parse_products(&payload)
}
