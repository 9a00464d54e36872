//! Registry configuration
//!
//! The kind registry comes from one of two sources:
//! 1. Built-in kinds (generic `target` plus the Scala kinds)
//! 2. A registry definition file (TOML)

mod builtin;
mod source;

pub use builtin::{builtin_definition, builtin_registry};
pub use source::{
    load_registry, parse_registry, toml_to_json, ConfigError, RegistryOrigin, RegistrySource,
};
