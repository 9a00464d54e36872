//! Registry and coercion errors.

/// A raw value was rejected by a field's coercion rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("The '{field}' field in {scope} must be {expected}, but was `{raw}` with type `{type_name}`.")]
pub struct CoercionError {
    /// Rendered scope address.
    pub scope: String,
    /// Field alias.
    pub field: String,
    /// What the field accepts, e.g. "a list of strings".
    pub expected: String,
    /// Compact JSON rendering of the offending value.
    pub raw: String,
    pub type_name: &'static str,
}

/// Errors raised while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate kind alias: '{0}'")]
    DuplicateKind(String),

    #[error("Kind '{kind}': duplicate field alias '{field}'")]
    DuplicateField { kind: String, field: String },

    #[error("Invalid alias '{0}': expected lowercase letters, digits and underscores")]
    InvalidAlias(String),

    #[error("Kind '{kind}': invalid default for field '{field}': {source}")]
    InvalidDefault {
        kind: String,
        field: String,
        #[source]
        source: CoercionError,
    },
}
