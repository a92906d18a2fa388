// src/release/listing.rs

//! Listing paths and listing file parsing

use super::tags::is_any_required_tag_provided;
use crate::content::ProductCatalog;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Placeholder the package manager expands to the release version
pub const RELEASEVER: &str = "$releasever";

/// Name of the listing resource below a base path
pub const LISTING_FILE: &str = "listing";

/// Prefix of a content path before the release placeholder
pub fn get_listing_path(content_path: &str) -> Result<&str> {
    content_path
        .find(RELEASEVER)
        .map(|index| &content_path[..index])
        .ok_or_else(|| {
            Error::ListingPathError(format!("{content_path} does not contain {RELEASEVER}"))
        })
}

/// Base paths whose listings describe the releases of entitled content
///
/// Content is considered when it is enabled (explicitly or by default), its
/// required tags are satisfied by `provided_tags`, and its path contains the
/// release placeholder.
pub fn derive_listing_paths<P: AsRef<str>>(
    catalog: &ProductCatalog,
    provided_tags: &[P],
) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();

    let contents = catalog
        .values()
        .flatten()
        .flat_map(|product| product.content.iter());

    for content in contents {
        if !content.is_enabled() {
            continue;
        }
        if !is_any_required_tag_provided(content.required_tags.as_slice(), provided_tags) {
            debug!("Content {} requires tags {:?}", content.label, content.required_tags);
            continue;
        }
        if let Ok(path) = get_listing_path(&content.path) {
            paths.insert(path.to_string());
        }
    }

    paths
}

/// Path of the listing resource for a base path
pub fn listing_url(base_path: &str) -> String {
    format!("{}/{LISTING_FILE}", base_path.trim_end_matches('/'))
}

/// Parse a listing file into sorted, unique release identifiers
///
/// Lines are trimmed; blank lines and `#` comments are skipped.
pub fn parse_listing(text: &str) -> Vec<String> {
    let mut releases = BTreeSet::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !releases.insert(line.to_string()) {
            warn!("Duplicate release '{}' in listing", line);
        }
    }
    releases.into_iter().collect()
}
