//! Declarative registry definitions.
//!
//! A registry can be described as data (for example a TOML file) and turned
//! into a [`KindRegistry`]:
//!
//! ```toml
//! [[common_field]]
//! alias = "tags"
//! type = "string-sequence"
//!
//! [[kind]]
//! alias = "scala_sources"
//!
//! [[kind.field]]
//! alias = "jdk"
//! type = "string"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RegistryError;
use crate::field::FieldType;
use crate::kind::{FieldDescriptor, KindDescriptor};
use crate::registry::KindRegistry;

/// Data form of a whole registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDefinition {
    /// Fields attached to every kind.
    #[serde(default, rename = "common_field")]
    pub common_fields: Vec<FieldDefinition>,

    #[serde(default, rename = "kind")]
    pub kinds: Vec<KindDefinition>,
}

/// Data form of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindDefinition {
    pub alias: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_alias: Option<String>,

    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDefinition>,
}

/// Data form of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub alias: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_alias: Option<String>,

    /// Value substituted for an explicit `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(flatten)]
    pub field_type: FieldType,
}

impl FieldDefinition {
    fn descriptor(&self) -> FieldDescriptor {
        let mut field = FieldDescriptor::new(&self.alias, self.field_type.clone());
        if let Some(ref alias) = self.deprecated_alias {
            field = field.with_deprecated_alias(alias);
        }
        if let Some(ref default) = self.default {
            field = field.with_default(default.clone());
        }
        field
    }
}

impl KindDefinition {
    fn descriptor(&self) -> KindDescriptor {
        let mut kind = KindDescriptor::new(&self.alias)
            .with_fields(self.fields.iter().map(FieldDefinition::descriptor));
        if let Some(ref alias) = self.deprecated_alias {
            kind = kind.with_deprecated_alias(alias);
        }
        kind
    }
}

impl RegistryDefinition {
    /// Validate the definition and build the registry.
    pub fn build(&self) -> Result<KindRegistry, RegistryError> {
        let builder = self
            .common_fields
            .iter()
            .fold(KindRegistry::builder(), |b, f| b.common_field(f.descriptor()));
        self.kinds
            .iter()
            .fold(builder, |b, k| b.register(k.descriptor()))
            .build()
    }
}
