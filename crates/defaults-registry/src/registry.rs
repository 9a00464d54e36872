//! The kind registry.

use regex_lite::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::debug;

use crate::address::ScopeAddress;
use crate::error::RegistryError;
use crate::kind::{FieldDescriptor, KindDescriptor};

fn alias_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("alias pattern is valid"))
}

fn check_alias(alias: &str) -> Result<(), RegistryError> {
    if alias_pattern().is_match(alias) {
        Ok(())
    } else {
        Err(RegistryError::InvalidAlias(alias.to_string()))
    }
}

/// Read-only catalog of kinds, keyed by alias.
///
/// Built once through [`KindRegistryBuilder`] and shared by reference with
/// every scope being resolved.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<String, KindDescriptor>,
    /// Deprecated kind alias -> current alias.
    renamed: BTreeMap<String, String>,
}

impl KindRegistry {
    pub fn builder() -> KindRegistryBuilder {
        KindRegistryBuilder::default()
    }

    /// Resolve a kind by current or deprecated alias.
    pub fn resolve(&self, alias: &str) -> Option<&KindDescriptor> {
        self.kinds.get(alias).or_else(|| {
            self.renamed
                .get(alias)
                .and_then(|current| self.kinds.get(current))
        })
    }

    /// Current aliases of every registered kind, sorted.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindDescriptor> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Collects kind descriptors and validates them into a [`KindRegistry`].
#[derive(Debug, Default)]
pub struct KindRegistryBuilder {
    common_fields: Vec<FieldDescriptor>,
    kinds: Vec<KindDescriptor>,
}

impl KindRegistryBuilder {
    /// Add a field carried by every kind.
    pub fn common_field(mut self, field: FieldDescriptor) -> Self {
        self.common_fields.push(field);
        self
    }

    pub fn register(mut self, kind: KindDescriptor) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn build(self) -> Result<KindRegistry, RegistryError> {
        let mut registry = KindRegistry::default();
        let mut taken: BTreeSet<String> = BTreeSet::new();

        for kind in self.kinds {
            let kind = kind.with_common_fields(&self.common_fields);

            for alias in std::iter::once(kind.alias()).chain(kind.deprecated_alias()) {
                check_alias(alias)?;
                if !taken.insert(alias.to_string()) {
                    return Err(RegistryError::DuplicateKind(alias.to_string()));
                }
            }
            validate_fields(&kind)?;

            if let Some(old) = kind.deprecated_alias() {
                registry
                    .renamed
                    .insert(old.to_string(), kind.alias().to_string());
            }
            debug!(
                kind = kind.alias(),
                fields = kind.fields().len(),
                "registered kind"
            );
            registry.kinds.insert(kind.alias().to_string(), kind);
        }

        Ok(registry)
    }
}

fn validate_fields(kind: &KindDescriptor) -> Result<(), RegistryError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let scope = ScopeAddress::root();

    for field in kind.fields() {
        for alias in std::iter::once(field.alias()).chain(field.deprecated_alias()) {
            check_alias(alias)?;
            if !seen.insert(alias) {
                return Err(RegistryError::DuplicateField {
                    kind: kind.alias().to_string(),
                    field: alias.to_string(),
                });
            }
        }
        if let Some(default) = field.default_value() {
            field
                .coerce(default, &scope)
                .map_err(|source| RegistryError::InvalidDefault {
                    kind: kind.alias().to_string(),
                    field: field.alias().to_string(),
                    source,
                })?;
        }
    }
    Ok(())
}
