//! Scope addresses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generated target name used for the defaults of a scope.
pub const DEFAULTS_TARGET_NAME: &str = "__defaults__";

/// Location of a `set_defaults` declaration.
///
/// Rendered as `<path>#__defaults__`, with the root scope rendered as
/// `//#__defaults__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeAddress {
    path: String,
}

impl ScopeAddress {
    /// Address for the scope at `path` (relative, `/`-separated).
    ///
    /// The path is normalized: empty and `.` segments are dropped and `..`
    /// removes the segment before it, never going above the root.
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for segment in path.as_ref().split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                segment => segments.push(segment),
            }
        }
        Self {
            path: segments.join("/"),
        }
    }

    /// Address of the root scope.
    pub fn root() -> Self {
        Self {
            path: String::new(),
        }
    }

    /// Directory path of the scope (empty for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for ScopeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "//#{}", DEFAULTS_TARGET_NAME)
        } else {
            write!(f, "{}#{}", self.path, DEFAULTS_TARGET_NAME)
        }
    }
}
