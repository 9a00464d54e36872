//! Field value coercion.
//!
//! Every field owns a coercion rule that turns a raw declared value into its
//! immutable [`FieldValue`]. Defaults go through the same rule as values
//! declared directly on an entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::address::ScopeAddress;
use crate::error::CoercionError;
use crate::value::{type_name, FieldValue};

/// Coerces raw values for one field.
pub trait FieldCoercion: fmt::Debug + Send + Sync {
    /// Coerce `raw`, declared for `field` in `scope`.
    ///
    /// `null` is handled by the caller (see [`crate::FieldDescriptor::coerce`])
    /// and never reaches this method through the registry.
    fn coerce(
        &self,
        field: &str,
        raw: &Value,
        scope: &ScopeAddress,
    ) -> Result<FieldValue, CoercionError>;
}

/// Built-in field types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldType {
    /// A single string, optionally restricted to a set of choices.
    String {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
    },
    /// An ordered sequence of strings.
    StringSequence,
    Bool,
    Int,
    /// A number; integers are widened.
    Float,
    /// A mapping of string keys to string values.
    StringMap,
}

impl FieldType {
    /// Human description of accepted values, used in error messages.
    pub fn expectation(&self) -> String {
        match self {
            FieldType::String { choices } if !choices.is_empty() => {
                format!("one of [{}]", choices.join(", "))
            }
            FieldType::String { .. } => "a string".to_string(),
            FieldType::StringSequence => {
                "an iterable of strings (e.g. a list of strings)".to_string()
            }
            FieldType::Bool => "a boolean".to_string(),
            FieldType::Int => "an integer".to_string(),
            FieldType::Float => "a number".to_string(),
            FieldType::StringMap => "a dictionary of string -> string".to_string(),
        }
    }
}

fn reject(expected: String, field: &str, raw: &Value, scope: &ScopeAddress) -> CoercionError {
    CoercionError {
        scope: scope.to_string(),
        field: field.to_string(),
        expected,
        raw: raw.to_string(),
        type_name: type_name(raw),
    }
}

impl FieldCoercion for FieldType {
    fn coerce(
        &self,
        field: &str,
        raw: &Value,
        scope: &ScopeAddress,
    ) -> Result<FieldValue, CoercionError> {
        let rejected = || reject(self.expectation(), field, raw, scope);

        match self {
            FieldType::String { choices } => {
                let s = raw.as_str().ok_or_else(rejected)?;
                if !choices.is_empty() && !choices.iter().any(|c| c == s) {
                    return Err(rejected());
                }
                Ok(FieldValue::String(s.to_string()))
            }
            FieldType::StringSequence => {
                let items = raw.as_array().ok_or_else(rejected)?;
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).ok_or_else(rejected))
                    .collect::<Result<Vec<_>, _>>()
                    .map(FieldValue::StringSequence)
            }
            FieldType::Bool => raw.as_bool().map(FieldValue::Bool).ok_or_else(rejected),
            FieldType::Int => raw.as_i64().map(FieldValue::Int).ok_or_else(rejected),
            FieldType::Float => raw.as_f64().map(FieldValue::Float).ok_or_else(rejected),
            FieldType::StringMap => {
                let map = raw.as_object().ok_or_else(rejected)?;
                map.iter()
                    .map(|(k, v)| {
                        v.as_str()
                            .map(|s| (k.clone(), s.to_string()))
                            .ok_or_else(rejected)
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(FieldValue::StringMap)
            }
        }
    }
}
