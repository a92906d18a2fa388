// src/lib.rs

//! Entitled - entitlement certificate content engine
//!
//! Turns the entitlement certificates a subscription server issues into
//! package manager configuration, and discovers which release versions of
//! the entitled content the CDN serves.
//!
//! # Pipeline
//!
//! - Certificates: decode the compressed `ENTITLEMENT DATA` PEM block
//! - Content: parse the inflated JSON into engineering products and content
//! - Overrides: layer server-declared attribute overrides per content label
//! - Repository: generate the INI repository file
//! - Release: filter content by required tags, derive listing paths, merge
//!   the CDN listings into a sorted set of releases

pub mod certificate;
pub mod client;
pub mod compression;
pub mod config;
pub mod content;
mod error;
pub mod overrides;
pub mod release;
pub mod repository;

pub use certificate::{
    ConsumerIdentity, EntitlementDirectory, EntitlementKeyMaterial, decode_entitlement_payload,
};
pub use client::{HttpTransport, Response, TlsConfig, Transport};
pub use config::{Config, ConfigError};
pub use content::{Content, EngineeringProduct, ProductCatalog, extract_products, parse_products};
pub use error::{Error, Result};
pub use overrides::{ContentOverride, OverrideMap, fetch_overrides, merge_overrides};
pub use release::{
    derive_listing_paths, discover_releases, get_listing_path, is_any_required_tag_provided,
    list_releases, parse_listing,
};
pub use repository::{RepoFile, RepoFileGenerator, RepoFileOptions, SectionKey};
