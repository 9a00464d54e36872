//! Registry loading with provenance
//!
//! Records where the registry came from, and for files the SHA-256 digest
//! of the raw bytes.

use defaults_registry::{KindRegistry, RegistryDefinition, RegistryError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::builtin::builtin_registry;

/// Origin of the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RegistryOrigin {
    Builtin,
    File,
}

/// Where the registry came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySource {
    pub origin: RegistryOrigin,

    /// File path (None for builtin)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Registry file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Load the registry from `path`, or the built-in kinds when `None`.
pub fn load_registry(path: Option<&Path>) -> Result<(KindRegistry, RegistrySource), ConfigError> {
    let Some(path) = path else {
        let registry = builtin_registry()?;
        return Ok((
            registry,
            RegistrySource {
                origin: RegistryOrigin::Builtin,
                path: None,
                digest: None,
            },
        ));
    };

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let registry = parse_registry(&contents)?;

    debug!(path = %path.display(), kinds = registry.len(), %digest, "loaded registry");
    Ok((
        registry,
        RegistrySource {
            origin: RegistryOrigin::File,
            path: Some(path.to_string_lossy().to_string()),
            digest: Some(digest),
        },
    ))
}

/// Parse and build a registry from a TOML definition.
pub fn parse_registry(contents: &str) -> Result<KindRegistry, ConfigError> {
    let toml_value: toml::Value = toml::from_str(contents)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
    let definition: RegistryDefinition = serde_json::from_value(toml_to_json(toml_value))
        .map_err(|e| ConfigError::ParseError(format!("Invalid registry definition: {}", e)))?;
    Ok(definition.build()?)
}

/// Convert a TOML value to a JSON value
pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
