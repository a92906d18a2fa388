// src/overrides/mod.rs

//! Server-declared content overrides
//!
//! The entitlement server lets administrators override repository attributes
//! per content label (for example enabling a repository that is disabled by
//! default). Overrides are fetched separately from the certificates and
//! layered over the generated repository sections.

use crate::client::Transport;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// One attribute override for a content label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOverride {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    pub name: String,
    pub content_label: String,
    pub value: String,
}

/// Overrides indexed by content label, then attribute name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMap {
    by_label: HashMap<String, HashMap<String, String>>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute overrides for a content label
    pub fn for_label(&self, label: &str) -> Option<&HashMap<String, String>> {
        self.by_label.get(label)
    }

    /// Value of one overridden attribute
    pub fn get(&self, label: &str, name: &str) -> Option<&str> {
        self.by_label
            .get(label)
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    /// Record an override; a later value for the same key replaces the earlier one
    ///
    /// Overrides that cannot be written as a single `name=value` line are
    /// dropped with a warning.
    pub fn insert(&mut self, label: impl Into<String>, name: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let name = name.into();
        let value = value.into();
        if !is_valid_name(&name) || !is_valid_value(&value) {
            warn!("Ignoring override {}.{}: not a single key=value line", label, name.escape_debug());
            return;
        }

        let attrs = self.by_label.entry(label.clone()).or_default();
        if let Some(previous) = attrs.insert(name.clone(), value) {
            debug!(
                "Override {}.{} replaces earlier value '{}'",
                label, name, previous
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Number of content labels with overrides
    pub fn len(&self) -> usize {
        self.by_label.len()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.contains(['\n', '\r', '=', '[', ']'])
        && !name.trim_start().starts_with(['#', ';'])
}

fn is_valid_value(value: &str) -> bool {
    !value.contains(['\n', '\r'])
}

/// Index overrides by content label and attribute name
///
/// Duplicate `(label, name)` pairs resolve to the last one in the input.
/// The server makes no ordering promise, so duplicates are a known
/// non-determinism.
pub fn merge_overrides(overrides: impl IntoIterator<Item = ContentOverride>) -> OverrideMap {
    let mut map = OverrideMap::new();
    for item in overrides {
        map.insert(item.content_label, item.name, item.value);
    }
    map
}

/// Parse the override wire format (JSON array)
pub fn parse_overrides(data: &[u8]) -> Result<Vec<ContentOverride>> {
    Ok(serde_json::from_slice(data)?)
}

/// Fetch the overrides the server holds for a consumer
pub fn fetch_overrides(transport: &dyn Transport, consumer_uuid: &str) -> Result<Vec<ContentOverride>> {
    let path = format!("/consumers/{consumer_uuid}/content_overrides");
    let response = transport.get(&path)?;

    match response.status {
        200 => {
            let overrides = parse_overrides(&response.body)?;
            info!("Fetched {} content overrides", overrides.len());
            Ok(overrides)
        }
        403 => Err(Error::ForbiddenError(format!(
            "Consumer {consumer_uuid} may not read content overrides"
        ))),
        404 => Err(Error::NotFoundError(format!(
            "Consumer {consumer_uuid} not found"
        ))),
        500 => Err(Error::ServerError(format!(
            "Server failed to list content overrides for {consumer_uuid}"
        ))),
        status => {
            warn!("Unexpected HTTP {} from {}", status, path);
            Err(Error::DownloadError(format!("HTTP {status} from {path}")))
        }
    }
}
