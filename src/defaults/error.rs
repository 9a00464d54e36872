//! Errors raised while applying or freezing defaults.

use defaults_registry::CoercionError;

/// Errors from `set_defaults` processing.
///
/// Every variant is detected before the working defaults of a scope are
/// touched, so a failed call leaves them as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefaultsError {
    /// A directive is not a mapping of kinds to field values.
    #[error("Expected dictionary mapping kinds to default field values for {scope} but got: {type_name}.")]
    InvalidDirective {
        scope: String,
        type_name: &'static str,
    },

    /// The field values given for a kind are not a mapping.
    #[error("Invalid default field values in {scope} for kind {kind}, must be a `dict` but was {raw} with type `{type_name}`.")]
    InvalidFieldValues {
        scope: String,
        kind: String,
        raw: String,
        type_name: &'static str,
    },

    #[error("Unrecognized kind {alias} in {scope}.")]
    UnrecognizedKind { alias: String, scope: String },

    /// The field is not valid for the kind; `valid` is the sorted list of
    /// accepted field aliases.
    #[error("Unrecognized field `{field}` for kind {kind}. Valid fields are: {}.", .valid.join(", "))]
    InvalidField {
        field: String,
        kind: String,
        valid: Vec<String>,
    },

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_lists_valid_aliases() {
        let err = DefaultsError::InvalidField {
            field: "does-not-exist".into(),
            kind: "test_type_1".into(),
            valid: vec!["dependencies".into(), "description".into(), "tags".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unrecognized field `does-not-exist` for kind test_type_1. \
             Valid fields are: dependencies, description, tags."
        );
    }

    #[test]
    fn test_invalid_directive_display() {
        let err = DefaultsError::InvalidDirective {
            scope: "//#__defaults__".into(),
            type_name: "list",
        };
        assert_eq!(
            err.to_string(),
            "Expected dictionary mapping kinds to default field values for //#__defaults__ but got: list."
        );
    }
}
