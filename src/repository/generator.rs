// src/repository/generator.rs

//! Projection of entitled content into repository sections

use super::repofile::{RepoFile, RepoSection};
use crate::certificate::EntitlementDirectory;
use crate::content::{Content, ProductCatalog};
use crate::error::Result;
use crate::overrides::OverrideMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What identifies a generated section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionKey {
    /// Content label, unique across the catalog
    #[default]
    Label,
    /// Content name; entries sharing a name overwrite each other
    Name,
}

/// Formatting choices for generated repository files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFileOptions {
    pub section_key: SectionKey,
    /// Separator between `arches` tokens
    pub arch_separator: String,
}

impl Default for RepoFileOptions {
    fn default() -> Self {
        Self {
            section_key: SectionKey::Label,
            arch_separator: ",".to_string(),
        }
    }
}

impl RepoFileOptions {
    /// Byte-compatible with files written by earlier clients
    pub fn legacy() -> Self {
        Self {
            section_key: SectionKey::Name,
            arch_separator: String::new(),
        }
    }
}

type PathResolver<'a> = Box<dyn Fn(i64) -> PathBuf + 'a>;

/// Builds repository files from a product catalog
pub struct RepoFileGenerator<'a> {
    base_url: String,
    ca_cert: PathBuf,
    cert_path: PathResolver<'a>,
    key_path: PathResolver<'a>,
    options: RepoFileOptions,
}

impl<'a> RepoFileGenerator<'a> {
    /// Create a generator
    ///
    /// `cert_path` and `key_path` map an entitlement serial to the client
    /// certificate and key the package manager presents for its content.
    pub fn new(
        base_url: impl Into<String>,
        ca_cert: impl Into<PathBuf>,
        cert_path: impl Fn(i64) -> PathBuf + 'a,
        key_path: impl Fn(i64) -> PathBuf + 'a,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            ca_cert: ca_cert.into(),
            cert_path: Box::new(cert_path),
            key_path: Box::new(key_path),
            options: RepoFileOptions::default(),
        }
    }

    /// Generator resolving client credentials from an entitlement directory
    pub fn for_directory(
        base_url: impl Into<String>,
        ca_cert: impl Into<PathBuf>,
        directory: &'a EntitlementDirectory,
    ) -> Self {
        Self::new(
            base_url,
            ca_cert,
            move |serial| directory.cert_path(serial),
            move |serial| directory.key_path(serial),
        )
    }

    pub fn with_options(mut self, options: RepoFileOptions) -> Self {
        self.options = options;
        self
    }

    /// Build one section per content entry, in catalog order
    pub fn generate(&self, catalog: &ProductCatalog, overrides: &OverrideMap) -> RepoFile {
        let mut file = RepoFile::new();

        for (&serial, products) in catalog {
            for product in products {
                for content in &product.content {
                    debug!(
                        "Entitlement {} product {} provides {}",
                        serial, product.id, content.label
                    );
                    file.add_section(self.section_for(serial, content, overrides));
                }
            }
        }

        file
    }

    /// Generate and overwrite the repository file at `path`
    pub fn write(
        &self,
        path: &Path,
        catalog: &ProductCatalog,
        overrides: &OverrideMap,
    ) -> Result<RepoFile> {
        let file = self.generate(catalog, overrides);
        file.write(path)?;
        info!(
            "Generated {} repositories from {} entitlements",
            file.sections().len(),
            catalog.len()
        );
        Ok(file)
    }

    fn section_for(&self, serial: i64, content: &Content, overrides: &OverrideMap) -> RepoSection {
        let id = match self.options.section_key {
            SectionKey::Label => &content.label,
            SectionKey::Name => &content.name,
        };
        let enabled = flag(content.is_enabled());

        let mut section = RepoSection::new(id.clone());
        section.set("name", content.name.clone());
        section.set("baseurl", join_url(&self.base_url, &content.path));
        section.set("enabled", enabled);
        section.set("enabled_metadata", enabled);

        match content.gpg_key() {
            Some(url) => {
                section.set("gpgcheck", "1");
                section.set("gpgkey", url);
            }
            None => section.set("gpgcheck", "0"),
        }

        section.set("sslverify", "1");
        section.set("sslcacert", self.ca_cert.display().to_string());
        section.set("sslclientcert", (self.cert_path)(serial).display().to_string());
        section.set("sslclientkey", (self.key_path)(serial).display().to_string());
        section.set(
            "metadata_expire",
            content.metadata_expire.unwrap_or(0).to_string(),
        );

        if !content.arches.is_empty() {
            section.set("arches", content.arches.join(&self.options.arch_separator));
        }

        if let Some(attrs) = overrides.for_label(&content.label) {
            let mut names: Vec<&String> = attrs.keys().collect();
            names.sort();
            for name in names {
                debug!("Override {}.{} = {}", content.label, name, attrs[name]);
                section.set(name.clone(), attrs[name].clone());
            }
        }

        section
    }
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Join a base URL and a content path with exactly one slash
///
/// `$releasever` in the path is left for the package manager to expand.
pub fn join_url(base_url: &str, path: &str) -> String {
    if base_url.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
