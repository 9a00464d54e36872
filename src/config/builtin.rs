//! Built-in kinds
//!
//! Used when no registry file is given.

use defaults_registry::{
    FieldDefinition, FieldType, KindDefinition, KindRegistry, RegistryDefinition, RegistryError,
};

/// Fields carried by every built-in kind.
const COMMON_FIELDS: &[(&str, Shape)] = &[("description", Shape::Text), ("tags", Shape::Strings)];

/// Fields shared by the Scala source and test kinds.
const JVM_FIELDS: &[(&str, Shape)] = &[
    ("dependencies", Shape::Strings),
    ("scalac_plugins", Shape::Strings),
    ("resolve", Shape::Text),
    ("jdk", Shape::Text),
    ("experimental_provides_types", Shape::Strings),
];

#[derive(Clone, Copy)]
enum Shape {
    Text,
    Strings,
}

impl Shape {
    fn field_type(self) -> FieldType {
        match self {
            Shape::Text => FieldType::String { choices: vec![] },
            Shape::Strings => FieldType::StringSequence,
        }
    }
}

fn fields(specs: &[(&str, Shape)]) -> Vec<FieldDefinition> {
    specs
        .iter()
        .map(|(alias, shape)| FieldDefinition {
            alias: alias.to_string(),
            deprecated_alias: None,
            default: None,
            field_type: shape.field_type(),
        })
        .collect()
}

fn kind(alias: &str, specs: &[&[(&str, Shape)]]) -> KindDefinition {
    KindDefinition {
        alias: alias.to_string(),
        deprecated_alias: None,
        fields: specs.iter().flat_map(|s| fields(s)).collect(),
    }
}

/// Definition of the built-in kinds.
pub fn builtin_definition() -> RegistryDefinition {
    let sources: &[(&str, Shape)] = &[("sources", Shape::Strings)];
    let source: &[(&str, Shape)] = &[("source", Shape::Text)];

    RegistryDefinition {
        common_fields: fields(COMMON_FIELDS),
        kinds: vec![
            kind("target", &[&[("dependencies", Shape::Strings)]]),
            kind("scala_source", &[JVM_FIELDS, source]),
            kind("scala_sources", &[sources, JVM_FIELDS]),
            kind("scala_junit_test", &[JVM_FIELDS, source]),
            kind("scala_junit_tests", &[sources, JVM_FIELDS]),
            kind("scalatest_test", &[JVM_FIELDS, source]),
            kind("scalatest_tests", &[sources, JVM_FIELDS]),
            kind(
                "scalac_plugin",
                &[&[("artifact", Shape::Text), ("plugin_name", Shape::Text)]],
            ),
        ],
    }
}

/// Registry of the built-in kinds.
pub fn builtin_registry() -> Result<KindRegistry, RegistryError> {
    builtin_definition().build()
}
