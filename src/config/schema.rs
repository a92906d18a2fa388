// src/config/schema.rs

//! Declarative schema of recognised configuration keys

use std::fmt;

/// Value type of a configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Bool,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "integer"),
            Self::Bool => write!(f, "boolean"),
        }
    }
}

/// One recognised `section.key`, its default and optional allowed values
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub section: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
    /// Default in its textual form
    pub default: &'static str,
    pub allowed: Option<&'static [&'static str]>,
}

impl FieldSpec {
    const fn new(section: &'static str, key: &'static str, kind: FieldKind, default: &'static str) -> Self {
        Self {
            section,
            key,
            kind,
            default,
            allowed: None,
        }
    }

    const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    /// Whether `value` is acceptable for this field
    pub fn allows(&self, value: &str) -> bool {
        self.allowed.is_none_or(|allowed| allowed.contains(&value))
    }
}

pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];
pub const REPO_FILE_FORMATS: &[&str] = &["label", "legacy"];

/// Every key the configuration file may contain
pub static FIELDS: &[FieldSpec] = &[
    FieldSpec::new("server", "hostname", FieldKind::String, "subscription.rhsm.redhat.com"),
    FieldSpec::new("server", "port", FieldKind::Int, "443"),
    FieldSpec::new("server", "prefix", FieldKind::String, "/subscription"),
    FieldSpec::new("server", "insecure", FieldKind::Bool, "false"),
    FieldSpec::new("rhsm", "baseurl", FieldKind::String, "https://cdn.redhat.com"),
    FieldSpec::new("rhsm", "ca_cert_dir", FieldKind::String, "/etc/rhsm/ca"),
    FieldSpec::new("rhsm", "repo_ca_cert", FieldKind::String, "/etc/rhsm/ca/redhat-uep.pem"),
    FieldSpec::new("rhsm", "consumer_cert_dir", FieldKind::String, "/etc/pki/consumer"),
    FieldSpec::new("rhsm", "entitlement_cert_dir", FieldKind::String, "/etc/pki/entitlement"),
    FieldSpec::new("rhsm", "repo_file", FieldKind::String, "/etc/yum.repos.d/redhat.repo"),
    FieldSpec::new("rhsm", "repo_file_format", FieldKind::String, "label").one_of(REPO_FILE_FORMATS),
    FieldSpec::new("rhsm", "manage_repos", FieldKind::Bool, "true"),
    FieldSpec::new("logging", "default_log_level", FieldKind::String, "info").one_of(LOG_LEVELS),
];

/// Look up the schema entry for `section.key`
pub fn field(section: &str, key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.section == section && f.key == key)
}
