// src/certificate/store.rs

//! Entitlement certificate directory
//!
//! Entitlements are stored as `<serial>.pem` (certificate) and
//! `<serial>-key.pem` (private key) pairs. A serial is only usable when both
//! halves are present; orphans are skipped and logged.

use crate::content::{ProductCatalog, extract_products};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const KEY_SUFFIX: &str = "-key.pem";
const CERT_SUFFIX: &str = ".pem";

/// Certificate and key file locations for one entitlement serial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementKeyMaterial {
    pub serial: i64,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// PEM text of an entitlement to install
#[derive(Debug, Clone)]
pub struct EntitlementCertificate {
    pub serial: i64,
    pub cert: String,
    pub key: String,
}

/// Directory holding entitlement certificate/key pairs
#[derive(Debug, Clone)]
pub struct EntitlementDirectory {
    path: PathBuf,
}

impl EntitlementDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Certificate path for a serial
    pub fn cert_path(&self, serial: i64) -> PathBuf {
        self.path.join(format!("{serial}{CERT_SUFFIX}"))
    }

    /// Key path for a serial
    pub fn key_path(&self, serial: i64) -> PathBuf {
        self.path.join(format!("{serial}{KEY_SUFFIX}"))
    }

    /// List complete certificate/key pairs, ordered by serial
    ///
    /// A missing directory yields an empty list.
    pub fn list_key_material(&self) -> Result<Vec<EntitlementKeyMaterial>> {
        if !self.path.exists() {
            debug!("Entitlement directory {} does not exist", self.path.display());
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.path).map_err(|e| {
            Error::IoError(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        let mut certs = BTreeSet::new();
        let mut keys = BTreeSet::new();

        for entry in entries {
            let entry = entry.map_err(|e| Error::IoError(format!("Failed to read entry: {e}")))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };

            if let Some(serial) = file_name.strip_suffix(KEY_SUFFIX) {
                if let Ok(serial) = serial.parse::<i64>() {
                    keys.insert(serial);
                }
            } else if let Some(serial) = file_name.strip_suffix(CERT_SUFFIX) {
                if let Ok(serial) = serial.parse::<i64>() {
                    certs.insert(serial);
                }
            }
        }

        for orphan in certs.symmetric_difference(&keys) {
            if certs.contains(orphan) {
                warn!("Entitlement {} has a certificate but no key, skipping", orphan);
            } else {
                warn!("Entitlement {} has a key but no certificate, skipping", orphan);
            }
        }

        Ok(certs
            .intersection(&keys)
            .map(|&serial| EntitlementKeyMaterial {
                serial,
                cert_path: self.cert_path(serial),
                key_path: self.key_path(serial),
            })
            .collect())
    }

    /// Install entitlement certificates and keys
    ///
    /// Each serial is written independently: a failure is logged and the next
    /// serial proceeds. When the key cannot be written the certificate just
    /// written for that serial is removed again. Returns the installed serials.
    pub fn install(&self, entitlements: &[EntitlementCertificate]) -> Result<Vec<i64>> {
        fs::create_dir_all(&self.path).map_err(|e| {
            Error::WriteError(format!("Failed to create {}: {e}", self.path.display()))
        })?;

        let mut installed = Vec::new();
        for entitlement in entitlements {
            match self.install_one(entitlement) {
                Ok(()) => installed.push(entitlement.serial),
                Err(e) => warn!("Failed to install entitlement {}: {}", entitlement.serial, e),
            }
        }

        info!(
            "Installed {} of {} entitlements",
            installed.len(),
            entitlements.len()
        );
        Ok(installed)
    }

    fn install_one(&self, entitlement: &EntitlementCertificate) -> Result<()> {
        let cert_path = self.cert_path(entitlement.serial);
        let key_path = self.key_path(entitlement.serial);

        fs::write(&cert_path, &entitlement.cert).map_err(|e| {
            Error::WriteError(format!("Failed to write {}: {e}", cert_path.display()))
        })?;

        if let Err(e) = write_private(&key_path, entitlement.key.as_bytes()) {
            if let Err(remove_err) = fs::remove_file(&cert_path) {
                warn!(
                    "Failed to remove unpaired certificate {}: {}",
                    cert_path.display(),
                    remove_err
                );
            }
            return Err(Error::WriteError(format!(
                "Failed to write {}: {e}",
                key_path.display()
            )));
        }

        Ok(())
    }

    /// Decode the products of every installed entitlement
    ///
    /// Certificates that cannot be read, decoded or parsed are logged and
    /// left out of the catalog.
    pub fn load_products(&self) -> Result<ProductCatalog> {
        let mut catalog = BTreeMap::new();

        for material in self.list_key_material()? {
            let document = match fs::read(&material.cert_path) {
                Ok(document) => document,
                Err(e) => {
                    warn!("Failed to read {}: {}", material.cert_path.display(), e);
                    continue;
                }
            };

            match extract_products(&document) {
                Ok(products) => {
                    debug!(
                        "Entitlement {} grants {} products",
                        material.serial,
                        products.len()
                    );
                    catalog.insert(material.serial, products);
                }
                Err(e) => warn!("Skipping entitlement {}: {}", material.serial, e),
            }
        }

        Ok(catalog)
    }
}

/// Private key files are readable by the owner only
const KEY_FILE_MODE: u32 = 0o600;

fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(KEY_FILE_MODE)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(KEY_FILE_MODE))?;
    file.write_all(contents)
}
