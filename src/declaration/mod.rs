//! Scope declaration files
//!
//! A directory declares its defaults in `DEFAULTS.toml` or `DEFAULTS.json`,
//! holding the ordered `set_defaults` calls of that scope:
//!
//! ```toml
//! [[set_defaults]]
//! all = { tags = ["jvm"] }
//!
//! [[set_defaults]]
//! extend = true
//! directives = [{ "scala_sources, scalatest_tests" = { jdk = "17" } }]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::toml_to_json;
use crate::defaults::SetDefaults;

/// File names recognized as scope declarations, in lookup order.
pub const DECLARATION_FILE_NAMES: &[&str] = &["DEFAULTS.toml", "DEFAULTS.json"];

/// Errors for declaration files
#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    #[error("Failed to read declaration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid declaration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported declaration file: {0}")]
    UnsupportedFormat(PathBuf),
}

/// The `set_defaults` calls of one scope, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeDeclaration {
    #[serde(default)]
    pub set_defaults: Vec<SetDefaults>,
}

impl ScopeDeclaration {
    /// Load a declaration file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, DeclarationError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(DeclarationError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, DeclarationError> {
        let value: toml::Value = toml::from_str(content)?;
        Ok(serde_json::from_value(toml_to_json(value))?)
    }

    pub fn from_json(content: &str) -> Result<Self, DeclarationError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether `file_name` names a declaration file.
    pub fn is_declaration_file(file_name: &str) -> bool {
        DECLARATION_FILE_NAMES.contains(&file_name)
    }
}
