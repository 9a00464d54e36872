//! Scope-local defaults merge engine.

use defaults_registry::{type_name, KindDescriptor, KindRegistry, ScopeAddress};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use super::directive::{kind_aliases, SetDefaults, KIND_SEPARATOR};
use super::error::DefaultsError;
use super::table::{FieldDefaults, ResolvedDefaults};

/// Raw field values per kind alias.
type RawDefaults = BTreeMap<String, BTreeMap<String, Value>>;

/// Working defaults of one scope.
///
/// Created from the parent scope's table, updated by each `set_defaults`
/// call in declaration order, and frozen into the scope's
/// [`ResolvedDefaults`].
#[derive(Debug)]
pub struct DefaultsEngine<'r> {
    address: ScopeAddress,
    defaults: RawDefaults,
    registry: &'r KindRegistry,
}

impl<'r> DefaultsEngine<'r> {
    /// Start a scope at `address`, inheriting `parent`.
    pub fn new(address: ScopeAddress, parent: &ResolvedDefaults, registry: &'r KindRegistry) -> Self {
        Self {
            address,
            defaults: parent.to_raw(),
            registry,
        }
    }

    pub fn address(&self) -> &ScopeAddress {
        &self.address
    }

    /// Raw working defaults for `kind`, empty when it has none.
    ///
    /// Fields are keyed by their current alias.
    pub fn get(&self, kind: &str) -> BTreeMap<String, Value> {
        self.registry
            .resolve(kind)
            .and_then(|k| self.defaults.get(k.alias()))
            .cloned()
            .unwrap_or_default()
    }

    /// Apply one `set_defaults` call.
    pub fn set_defaults(&mut self, call: &SetDefaults) -> Result<(), DefaultsError> {
        self.apply(&call.directives, call.all.as_ref(), call.extend)
    }

    /// Apply directives in order, with `all` applied first.
    ///
    /// Without `extend`, every kind touched by this call has its defaults
    /// replaced by what the call declares; kinds the call does not touch
    /// keep theirs. A call without `extend` that has neither directives nor
    /// `all` clears all defaults; an empty directive changes nothing. A kind
    /// left with no fields is removed.
    ///
    /// Nothing is changed if any directive is rejected.
    pub fn apply(
        &mut self,
        directives: &[Value],
        all: Option<&Value>,
        extend: bool,
    ) -> Result<(), DefaultsError> {
        let mut scratch: RawDefaults = if extend {
            self.defaults.clone()
        } else {
            RawDefaults::new()
        };

        if let Some(all) = all {
            // `all` is keyed by every registered kind at once.
            let key = self
                .registry
                .aliases()
                .collect::<Vec<_>>()
                .join(&format!("{} ", KIND_SEPARATOR));
            for kind in self.registry.kinds() {
                self.merge_kind(&mut scratch, kind, &key, all, true)?;
            }
        }

        for directive in directives {
            let targets = directive
                .as_object()
                .ok_or_else(|| DefaultsError::InvalidDirective {
                    scope: self.address.to_string(),
                    type_name: type_name(directive),
                })?;
            self.merge_directive(&mut scratch, targets)?;
        }

        if !extend && directives.is_empty() && all.is_none() {
            debug!(scope = %self.address, "cleared defaults");
            self.defaults.clear();
            return Ok(());
        }

        for (kind, fields) in scratch {
            if fields.is_empty() {
                self.defaults.remove(&kind);
            } else {
                self.defaults.insert(kind, fields);
            }
        }

        debug!(
            scope = %self.address,
            directives = directives.len(),
            all = all.is_some(),
            extend,
            kinds = self.defaults.len(),
            "applied defaults"
        );
        Ok(())
    }

    /// Coerce the working defaults into the scope's table.
    ///
    /// Does not change the working defaults.
    pub fn freeze(&self) -> Result<ResolvedDefaults, DefaultsError> {
        let mut frozen: BTreeMap<String, FieldDefaults> = BTreeMap::new();

        for (kind_alias, fields) in &self.defaults {
            let kind = self.resolve_kind(kind_alias)?;
            let mut coerced = FieldDefaults::new();
            for (field_alias, raw) in fields {
                let field = kind
                    .field(field_alias)
                    .ok_or_else(|| invalid_field(kind, field_alias))?;
                coerced.insert(field.alias().to_string(), field.coerce(raw, &self.address)?);
            }
            frozen.insert(kind.alias().to_string(), coerced);
        }

        trace!(scope = %self.address, kinds = frozen.len(), "froze defaults");
        Ok(ResolvedDefaults::from_kinds(frozen))
    }

    fn resolve_kind(&self, alias: &str) -> Result<&'r KindDescriptor, DefaultsError> {
        self.registry
            .resolve(alias)
            .ok_or_else(|| DefaultsError::UnrecognizedKind {
                alias: alias.to_string(),
                scope: self.address.to_string(),
            })
    }

    fn merge_directive(
        &self,
        scratch: &mut RawDefaults,
        targets: &Map<String, Value>,
    ) -> Result<(), DefaultsError> {
        for (key, values) in targets {
            if !values.is_object() {
                return Err(DefaultsError::InvalidFieldValues {
                    scope: self.address.to_string(),
                    kind: key.clone(),
                    raw: values.to_string(),
                    type_name: type_name(values),
                });
            }
            for alias in kind_aliases(key) {
                let kind = self.resolve_kind(alias)?;
                self.merge_kind(scratch, kind, key, values, false)?;
            }
        }
        Ok(())
    }

    /// Validate `values` for `kind` and merge them into `scratch`.
    ///
    /// The kind's entry is created even when no field survives, so that an
    /// empty mapping resets the kind.
    fn merge_kind(
        &self,
        scratch: &mut RawDefaults,
        kind: &KindDescriptor,
        key: &str,
        values: &Value,
        ignore_unknown_fields: bool,
    ) -> Result<(), DefaultsError> {
        let values = values
            .as_object()
            .ok_or_else(|| DefaultsError::InvalidFieldValues {
                scope: self.address.to_string(),
                kind: key.to_string(),
                raw: values.to_string(),
                type_name: type_name(values),
            })?;

        let mut accepted = BTreeMap::new();
        for (field_alias, raw) in values {
            let Some(field) = kind.field(field_alias) else {
                if ignore_unknown_fields {
                    trace!(kind = kind.alias(), field = %field_alias, "skipping field unknown to kind");
                    continue;
                }
                return Err(invalid_field(kind, field_alias));
            };
            field.coerce(raw, &self.address)?;
            accepted.insert(field.alias().to_string(), raw.clone());
        }

        scratch
            .entry(kind.alias().to_string())
            .or_default()
            .extend(accepted);
        Ok(())
    }
}

fn invalid_field(kind: &KindDescriptor, field: &str) -> DefaultsError {
    DefaultsError::InvalidField {
        field: field.to_string(),
        kind: kind.alias().to_string(),
        valid: kind
            .valid_field_aliases()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}
