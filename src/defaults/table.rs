//! Resolved defaults tables.

use defaults_registry::FieldValue;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The table could not be put in canonical JSON form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to canonicalize defaults: {0}")]
pub struct FingerprintError(String);

/// Coerced default values of one kind, keyed by field alias.
pub type FieldDefaults = BTreeMap<String, FieldValue>;

/// The defaults in effect for one scope.
///
/// Immutable once built: clones share storage, and there is no mutable
/// access. Equality is structural. Only [`DefaultsEngine::freeze`] builds a
/// non-empty table, so every entry has passed field validation.
///
/// [`DefaultsEngine::freeze`]: super::DefaultsEngine::freeze
///
/// A table cannot be read back from serialized form:
///
/// ```compile_fail
/// use scope_defaults::ResolvedDefaults;
/// let _: ResolvedDefaults = serde_json::from_str("{}").unwrap();
/// ```
///
/// nor collected from unvalidated entries:
///
/// ```compile_fail
/// use scope_defaults::defaults::{FieldDefaults, ResolvedDefaults};
/// let _: ResolvedDefaults = vec![("target", FieldDefaults::new())].into_iter().collect();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedDefaults {
    kinds: Arc<BTreeMap<String, Arc<FieldDefaults>>>,
}

impl ResolvedDefaults {
    /// Table with no defaults, used for the root scope.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Coerced defaults for `kind`, if it has any.
    pub fn get(&self, kind: &str) -> Option<&FieldDefaults> {
        self.kinds.get(kind).map(Arc::as_ref)
    }

    /// Coerced default of a single field.
    pub fn value(&self, kind: &str, field: &str) -> Option<&FieldValue> {
        self.get(kind).and_then(|fields| fields.get(field))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDefaults)> {
        self.kinds.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Raw form of the table, for seeding a child scope's working defaults.
    pub fn to_raw(&self) -> BTreeMap<String, BTreeMap<String, Value>> {
        self.iter()
            .map(|(kind, fields)| {
                let raw = fields
                    .iter()
                    .map(|(field, value)| (field.clone(), value.to_raw()))
                    .collect();
                (kind.to_string(), raw)
            })
            .collect()
    }

    /// SHA-256 hex digest of the JCS (RFC 8785) form of the table.
    pub fn fingerprint(&self) -> Result<String, FingerprintError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(self)
            .map_err(|e| FingerprintError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Build a table from coerced kinds. Kinds with no fields are left out.
    pub(crate) fn from_kinds<K, I>(iter: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldDefaults)>,
    {
        let kinds = iter
            .into_iter()
            .filter(|(_, fields)| !fields.is_empty())
            .map(|(kind, fields)| (kind.into(), Arc::new(fields)))
            .collect();
        Self {
            kinds: Arc::new(kinds),
        }
    }
}
