// src/config/mod.rs

//! Client configuration
//!
//! Settings are read from a TOML file with `[server]`, `[rhsm]` and
//! `[logging]` tables:
//!
//! ```toml
//! [server]
//! hostname = "subscription.example.com"
//! prefix = "/subscription"
//!
//! [rhsm]
//! baseurl = "https://cdn.example.com"
//! repo_file = "/etc/yum.repos.d/entitled.repo"
//!
//! [logging]
//! default_log_level = "debug"
//! ```
//!
//! Every key is declared in [`schema::FIELDS`] with its type, default and
//! optional set of allowed values. Unknown keys, wrongly typed values and
//! values outside the allowed set are rejected when the file is loaded;
//! absent keys fall back to their defaults in the typed accessors.

pub mod schema;

use crate::repository::RepoFileOptions;
use schema::{FieldKind, FieldSpec};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/entitled/entitled.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("{key} must be a {expected}")]
    InvalidType { key: String, expected: FieldKind },

    #[error("{key} = '{value}' is not one of {allowed:?}")]
    InvalidValue {
        key: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("{key} is a {actual}, not a {requested}")]
    KindMismatch {
        key: String,
        actual: FieldKind,
        requested: FieldKind,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A typed value held for one key
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    String(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    fn kind(&self) -> FieldKind {
        match self {
            Self::String(_) => FieldKind::String,
            Self::Int(_) => FieldKind::Int,
            Self::Bool(_) => FieldKind::Bool,
        }
    }
}

/// Loaded configuration: explicitly set values, validated against the schema
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<(String, String), Value>,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Load `path` when it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration text
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let table: toml::Table = text.parse()?;
        let mut values = HashMap::new();

        for (section, entries) in &table {
            let entries = entries.as_table().ok_or_else(|| ConfigError::UnknownKey(section.clone()))?;

            for (key, raw) in entries {
                let name = format!("{section}.{key}");
                let spec = schema::field(section, key).ok_or_else(|| ConfigError::UnknownKey(name.clone()))?;
                let value = convert(spec, &name, raw)?;
                values.insert((section.clone(), key.clone()), value);
            }
        }

        Ok(Self { values })
    }

    fn lookup(&self, section: &str, key: &str, requested: FieldKind) -> ConfigResult<Value> {
        let name = format!("{section}.{key}");
        let spec = schema::field(section, key).ok_or_else(|| ConfigError::UnknownKey(name.clone()))?;
        if spec.kind != requested {
            return Err(ConfigError::KindMismatch {
                key: name,
                actual: spec.kind,
                requested,
            });
        }

        match self.values.get(&(section.to_string(), key.to_string())) {
            Some(value) => Ok(value.clone()),
            None => default_value(spec),
        }
    }

    pub fn get_string(&self, section: &str, key: &str) -> ConfigResult<String> {
        match self.lookup(section, key, FieldKind::String)? {
            Value::String(value) => Ok(value),
            other => Err(mismatch(section, key, &other, FieldKind::String)),
        }
    }

    pub fn get_int(&self, section: &str, key: &str) -> ConfigResult<i64> {
        match self.lookup(section, key, FieldKind::Int)? {
            Value::Int(value) => Ok(value),
            other => Err(mismatch(section, key, &other, FieldKind::Int)),
        }
    }

    pub fn get_bool(&self, section: &str, key: &str) -> ConfigResult<bool> {
        match self.lookup(section, key, FieldKind::Bool)? {
            Value::Bool(value) => Ok(value),
            other => Err(mismatch(section, key, &other, FieldKind::Bool)),
        }
    }

    /// Entitlement server base URL
    pub fn server_url(&self) -> ConfigResult<String> {
        let hostname = self.get_string("server", "hostname")?;
        let port = self.get_int("server", "port")?;
        let prefix = self.get_string("server", "prefix")?;
        Ok(format!(
            "https://{hostname}:{port}/{}",
            prefix.trim_matches('/')
        ))
    }

    pub fn server_insecure(&self) -> ConfigResult<bool> {
        self.get_bool("server", "insecure")
    }

    /// CDN base URL
    pub fn cdn_url(&self) -> ConfigResult<String> {
        self.get_string("rhsm", "baseurl")
    }

    pub fn ca_cert_dir(&self) -> ConfigResult<PathBuf> {
        self.get_string("rhsm", "ca_cert_dir").map(PathBuf::from)
    }

    pub fn repo_ca_cert(&self) -> ConfigResult<PathBuf> {
        self.get_string("rhsm", "repo_ca_cert").map(PathBuf::from)
    }

    pub fn consumer_dir(&self) -> ConfigResult<PathBuf> {
        self.get_string("rhsm", "consumer_cert_dir").map(PathBuf::from)
    }

    pub fn entitlement_dir(&self) -> ConfigResult<PathBuf> {
        self.get_string("rhsm", "entitlement_cert_dir").map(PathBuf::from)
    }

    pub fn repo_file(&self) -> ConfigResult<PathBuf> {
        self.get_string("rhsm", "repo_file").map(PathBuf::from)
    }

    pub fn manage_repos(&self) -> ConfigResult<bool> {
        self.get_bool("rhsm", "manage_repos")
    }

    pub fn repo_file_options(&self) -> ConfigResult<RepoFileOptions> {
        Ok(match self.get_string("rhsm", "repo_file_format")?.as_str() {
            "legacy" => RepoFileOptions::legacy(),
            _ => RepoFileOptions::default(),
        })
    }

    pub fn log_level(&self) -> ConfigResult<String> {
        self.get_string("logging", "default_log_level")
    }
}

fn mismatch(section: &str, key: &str, value: &Value, requested: FieldKind) -> ConfigError {
    ConfigError::KindMismatch {
        key: format!("{section}.{key}"),
        actual: value.kind(),
        requested,
    }
}

fn convert(spec: &FieldSpec, name: &str, raw: &toml::Value) -> ConfigResult<Value> {
    let value = match (spec.kind, raw) {
        (FieldKind::String, toml::Value::String(s)) => Value::String(s.clone()),
        (FieldKind::Int, toml::Value::Integer(i)) => Value::Int(*i),
        (FieldKind::Bool, toml::Value::Boolean(b)) => Value::Bool(*b),
        (expected, _) => {
            return Err(ConfigError::InvalidType {
                key: name.to_string(),
                expected,
            });
        }
    };

    if let (Value::String(s), Some(allowed)) = (&value, spec.allowed) {
        if !spec.allows(s) {
            return Err(ConfigError::InvalidValue {
                key: name.to_string(),
                value: s.clone(),
                allowed,
            });
        }
    }

    Ok(value)
}

fn default_value(spec: &FieldSpec) -> ConfigResult<Value> {
    let name = || format!("{}.{}", spec.section, spec.key);
    match spec.kind {
        FieldKind::String => Ok(Value::String(spec.default.to_string())),
        FieldKind::Int => spec
            .default
            .parse()
            .map(Value::Int)
            .map_err(|_| ConfigError::InvalidType { key: name(), expected: FieldKind::Int }),
        FieldKind::Bool => spec
            .default
            .parse()
            .map(Value::Bool)
            .map_err(|_| ConfigError::InvalidType { key: name(), expected: FieldKind::Bool }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.get_int("server", "port").unwrap(), 443);
        assert!(!config.server_insecure().unwrap());
        assert!(config.manage_repos().unwrap());
        assert_eq!(
            config.server_url().unwrap(),
            "https://subscription.rhsm.redhat.com:443/subscription"
        );
        assert_eq!(config.entitlement_dir().unwrap(), PathBuf::from("/etc/pki/entitlement"));
        assert_eq!(config.log_level().unwrap(), "info");
        assert_eq!(config.repo_file_options().unwrap(), RepoFileOptions::default());
    }

    #[test]
    fn test_parse_overrides_defaults() {
        let config = Config::parse(
            r#"
            [server]
            hostname = "entitlements.example.com"
            port = 8443
            prefix = "/candlepin/"

            [rhsm]
            baseurl = "https://cdn.example.com"
            repo_file_format = "legacy"
            manage_repos = false
            "#,
        )
        .unwrap();

        assert_eq!(
            config.server_url().unwrap(),
            "https://entitlements.example.com:8443/candlepin"
        );
        assert_eq!(config.cdn_url().unwrap(), "https://cdn.example.com");
        assert!(!config.manage_repos().unwrap());
        assert_eq!(config.repo_file_options().unwrap(), RepoFileOptions::legacy());
    }

    #[test]
    fn test_unknown_key() {
        let result = Config::parse("[server]\nhost = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::UnknownKey(key)) if key == "server.host"));

        let result = Config::parse("top = 1\n");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn test_invalid_type() {
        let result = Config::parse("[server]\nport = \"443\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidType { expected: FieldKind::Int, .. })
        ));
    }

    #[test]
    fn test_value_outside_allowed_set() {
        let result = Config::parse("[logging]\ndefault_log_level = \"verbose\"\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_accessor_kind_mismatch() {
        let config = Config::default();
        assert!(matches!(
            config.get_bool("server", "port"),
            Err(ConfigError::KindMismatch { .. })
        ));
        assert!(matches!(
            config.get_string("nowhere", "nothing"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.cdn_url().unwrap(), "https://cdn.redhat.com");
    }

    #[test]
    fn test_parse_syntax_error() {
        assert!(matches!(Config::parse("[server"), Err(ConfigError::ParseError(_))));
    }
}
