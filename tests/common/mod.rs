// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use entitled::{Error, Response, Result, Transport};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const IDENTITY_PEM: &str = include_str!("../fixtures/identity.pem");
pub const IDENTITY_KEY: &str = include_str!("../fixtures/identity-key.pem");

/// Build an entitlement certificate document around a JSON payload.
///
/// Layout matches what the server issues: certificate, compressed
/// entitlement data, signature.
pub fn entitlement_document(payload: &str) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    format!(
        "{}{}{}",
        IDENTITY_PEM,
        pem::encode(&pem::Pem::new("ENTITLEMENT DATA", compressed)),
        pem::encode(&pem::Pem::new("RSA SIGNATURE", vec![0x5au8; 64])),
    )
}

/// JSON payload with one product holding the given content objects.
pub fn payload(product_id: &str, contents: &[&str]) -> String {
    format!(
        r#"{{
            "consumer": "5f3a6b0e-2c1d-4f8e-9a7b-0c1d2e3f4a5b",
            "subscription": {{"sku": "SKU-{product_id}", "name": "Subscription {product_id}"}},
            "order": {{"start": "2026-01-01T00:00:00Z", "end": "2027-01-01T00:00:00Z"}},
            "products": [{{
                "id": "{product_id}",
                "name": "Product {product_id}",
                "version": "11",
                "architectures": ["x86_64"],
                "content": [{}]
            }}],
            "pool": {{}}
        }}"#,
        contents.join(",")
    )
}

/// JSON content object.
pub fn content_json(label: &str, path: &str, extra: &str) -> String {
    let extra = if extra.is_empty() {
        String::new()
    } else {
        format!(", {extra}")
    };
    format!(
        r#"{{"id": "{label}", "type": "yum", "name": "{label} name", "label": "{label}",
             "vendor": "Example", "path": "{path}"{extra}}}"#
    )
}

/// Write `<serial>.pem` and `<serial>-key.pem` into `dir`.
pub fn install_entitlement(dir: &Path, serial: i64, document: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(format!("{serial}.pem")), document).unwrap();
    fs::write(dir.join(format!("{serial}-key.pem")), IDENTITY_KEY).unwrap();
}

/// Transport serving canned responses and recording every request.
#[derive(Default)]
pub struct RecordingTransport {
    responses: HashMap<String, Response>,
    pub requested: RefCell<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses.insert(path.to_string(), Response::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Transport for RecordingTransport {
    fn get(&self, path: &str) -> Result<Response> {
        self.requested.borrow_mut().push(path.to_string());
        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| Error::DownloadError(format!("no route to {path}")))
    }
}
