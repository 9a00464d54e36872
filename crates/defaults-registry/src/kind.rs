//! Kind and field descriptors.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::address::ScopeAddress;
use crate::error::CoercionError;
use crate::field::FieldCoercion;
use crate::value::FieldValue;

/// A named field of a kind together with its coercion rule.
#[derive(Clone)]
pub struct FieldDescriptor {
    alias: String,
    deprecated_alias: Option<String>,
    default: Option<Value>,
    coercion: Arc<dyn FieldCoercion>,
}

impl FieldDescriptor {
    pub fn new(alias: impl Into<String>, coercion: impl FieldCoercion + 'static) -> Self {
        Self {
            alias: alias.into(),
            deprecated_alias: None,
            default: None,
            coercion: Arc::new(coercion),
        }
    }

    /// Accept `alias` as a deprecated spelling of this field.
    pub fn with_deprecated_alias(mut self, alias: impl Into<String>) -> Self {
        self.deprecated_alias = Some(alias.into());
        self
    }

    /// Value used when a field is explicitly given `null`.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn deprecated_alias(&self) -> Option<&str> {
        self.deprecated_alias.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether `alias` names this field, current or deprecated.
    pub fn answers_to(&self, alias: &str) -> bool {
        self.alias == alias || self.deprecated_alias.as_deref() == Some(alias)
    }

    /// Coerce a raw value declared in `scope`.
    ///
    /// `null` falls back to the field's default, or [`FieldValue::Null`] when
    /// there is none.
    pub fn coerce(&self, raw: &Value, scope: &ScopeAddress) -> Result<FieldValue, CoercionError> {
        match (raw, &self.default) {
            (Value::Null, Some(default)) => self.coercion.coerce(&self.alias, default, scope),
            (Value::Null, None) => Ok(FieldValue::Null),
            (raw, _) => self.coercion.coerce(&self.alias, raw, scope),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("alias", &self.alias)
            .field("deprecated_alias", &self.deprecated_alias)
            .field("default", &self.default)
            .field("coercion", &self.coercion)
            .finish()
    }
}

/// A registered kind and the fields it accepts.
#[derive(Debug, Clone)]
pub struct KindDescriptor {
    alias: String,
    deprecated_alias: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl KindDescriptor {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            deprecated_alias: None,
            fields: Vec::new(),
        }
    }

    pub fn with_deprecated_alias(mut self, alias: impl Into<String>) -> Self {
        self.deprecated_alias = Some(alias.into());
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Put `common` ahead of the kind's own fields.
    pub(crate) fn with_common_fields(mut self, common: &[FieldDescriptor]) -> Self {
        self.fields.splice(0..0, common.iter().cloned());
        self
    }

    /// Current alias of the kind.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn deprecated_alias(&self) -> Option<&str> {
        self.deprecated_alias.as_deref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Every alias accepted for a field of this kind, deprecated ones included.
    pub fn valid_field_aliases(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .flat_map(|f| std::iter::once(f.alias()).chain(f.deprecated_alias()))
            .collect()
    }

    /// Look up a field by current or deprecated alias.
    pub fn field(&self, alias: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.answers_to(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use serde_json::json;

    fn kind() -> KindDescriptor {
        KindDescriptor::new("scala_sources")
            .with_field(FieldDescriptor::new("tags", FieldType::StringSequence))
            .with_field(
                FieldDescriptor::new("jdk", FieldType::String { choices: vec![] })
                    .with_deprecated_alias("jdk_version"),
            )
            .with_field(
                FieldDescriptor::new("skip_scalafmt", FieldType::Bool).with_default(json!(false)),
            )
    }

    #[test]
    fn test_valid_field_aliases_include_deprecated() {
        let kind = kind();
        let aliases: Vec<&str> = kind.valid_field_aliases().into_iter().collect();
        assert_eq!(aliases, vec!["jdk", "jdk_version", "skip_scalafmt", "tags"]);
    }

    #[test]
    fn test_field_lookup_by_deprecated_alias() {
        let kind = kind();
        assert_eq!(kind.field("jdk_version").map(|f| f.alias()), Some("jdk"));
        assert!(kind.field("missing").is_none());
    }

    #[test]
    fn test_common_fields_come_first() {
        let description = FieldDescriptor::new("description", FieldType::String { choices: vec![] });
        let kind = kind()
            .with_deprecated_alias("scala_library")
            .with_common_fields(&[description]);
        let order: Vec<&str> = kind.fields().iter().map(|f| f.alias()).collect();
        assert_eq!(order, vec!["description", "tags", "jdk", "skip_scalafmt"]);
        assert_eq!(kind.deprecated_alias(), Some("scala_library"));
    }

    #[test]
    fn test_null_uses_field_default() {
        let kind = kind();
        let scope = ScopeAddress::root();
        let skip = kind.field("skip_scalafmt").unwrap();
        assert_eq!(skip.coerce(&Value::Null, &scope).unwrap(), FieldValue::Bool(false));
        let tags = kind.field("tags").unwrap();
        assert_eq!(tags.coerce(&Value::Null, &scope).unwrap(), FieldValue::Null);
    }
}
