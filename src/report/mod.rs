//! Resolved defaults report
//!
//! Captures the frozen table of every declared scope together with the
//! provenance of the registry used to resolve them.

use chrono::{DateTime, Utc};
use defaults_registry::ScopeAddress;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::config::RegistrySource;
use crate::defaults::{FingerprintError, ResolvedDefaults};
use crate::traversal::ResolvedScopes;

/// Schema version for the report
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "scope-defaults/resolved_defaults@1";

/// Frozen table of one scope
#[derive(Debug, Clone, Serialize)]
pub struct ScopeReport {
    /// Rendered scope address, e.g. `src/a#__defaults__`
    pub address: String,

    /// SHA-256 hex digest of JCS(defaults)
    pub fingerprint: String,

    pub defaults: ResolvedDefaults,
}

/// Report over all resolved scopes
#[derive(Debug, Clone, Serialize)]
pub struct DefaultsReport {
    pub schema_version: u32,

    pub schema_id: String,

    /// When the scopes were resolved
    pub created_at: DateTime<Utc>,

    pub registry: RegistrySource,

    /// Scope path -> frozen table
    pub scopes: BTreeMap<String, ScopeReport>,
}

impl DefaultsReport {
    /// Build a report from resolved scopes.
    pub fn build(registry: RegistrySource, scopes: &ResolvedScopes) -> Result<Self, FingerprintError> {
        let scopes = scopes
            .iter()
            .map(|(path, table)| Ok((path.to_string(), ScopeReport::new(path, table.clone())?)))
            .collect::<Result<_, FingerprintError>>()?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            registry,
            scopes,
        })
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render one block per scope, one line per field.
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for scope in self.scopes.values() {
            let _ = writeln!(out, "{}", scope.address);
            if scope.defaults.is_empty() {
                let _ = writeln!(out, "  (no defaults)");
            }
            for (kind, fields) in scope.defaults.iter() {
                let _ = writeln!(out, "  {}", kind);
                for (field, value) in fields {
                    let rendered = serde_json::to_string(value).unwrap_or_default();
                    let _ = writeln!(out, "    {} = {}", field, rendered);
                }
            }
        }
        out
    }
}

impl ScopeReport {
    fn new(path: &str, defaults: ResolvedDefaults) -> Result<Self, FingerprintError> {
        Ok(Self {
            address: ScopeAddress::new(path).to_string(),
            fingerprint: defaults.fingerprint()?,
            defaults,
        })
    }
}
