//! Scope Defaults - hierarchical `set_defaults` resolution
//!
//! This crate computes the field defaults in effect for each scope of a
//! build declaration tree. A scope inherits its parent's defaults, applies
//! its own `set_defaults` calls, and freezes the result into an immutable
//! table validated against the kind registry.

pub mod config;
pub mod declaration;
pub mod defaults;
pub mod report;
pub mod traversal;

pub use config::{load_registry, RegistrySource};
pub use declaration::ScopeDeclaration;
pub use defaults::{DefaultsEngine, DefaultsError, ResolvedDefaults, SetDefaults};
pub use defaults_registry::{FieldValue, KindRegistry, ScopeAddress};
pub use report::DefaultsReport;
pub use traversal::{ResolvedScopes, ScopeTree};
