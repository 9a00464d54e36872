//! `set_defaults` call arguments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator between kind aliases in a multi-kind directive key.
pub const KIND_SEPARATOR: char = ',';

/// Arguments of a single `set_defaults` call.
///
/// `directives` are kept as raw values: their shape is checked when the call
/// is applied, so malformed declarations are reported against the scope that
/// made them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetDefaults {
    /// Positional directives, each mapping kind alias(es) to field values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Value>,

    /// Field values applied to every registered kind, ignoring fields a kind
    /// does not have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<Value>,

    /// Keep the defaults computed so far and override on top of them.
    #[serde(default)]
    pub extend: bool,
}

impl SetDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directive(mut self, directive: Value) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn all(mut self, all: Value) -> Self {
        self.all = Some(all);
        self
    }

    pub fn extend(mut self, extend: bool) -> Self {
        self.extend = extend;
        self
    }
}

/// Kind aliases named by a directive key.
///
/// `"python_sources, python_tests"` targets both kinds. Empty segments are
/// kept so they are reported as unrecognized kinds.
pub fn kind_aliases(key: &str) -> impl Iterator<Item = &str> {
    key.split(KIND_SEPARATOR).map(str::trim)
}
