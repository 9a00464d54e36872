//! Hierarchical `set_defaults` resolution
//!
//! Each declaration scope starts from the defaults of its parent scope,
//! applies its own `set_defaults` calls in order, and freezes the result:
//! - `extend = false` (the default): kinds named by a call get exactly the
//!   fields the call declares
//! - `extend = true`: declared fields override on top of the current ones
//! - `all`: applied to every registered kind, skipping unknown fields
//! - an empty field mapping for a kind resets that kind

mod directive;
mod engine;
mod error;
mod table;

pub use directive::{kind_aliases, SetDefaults, KIND_SEPARATOR};
pub use engine::DefaultsEngine;
pub use error::DefaultsError;
pub use table::{FieldDefaults, FingerprintError, ResolvedDefaults};
