//! Registry of declarable entity kinds and the fields each kind accepts.
//!
//! The registry is built once and then shared read-only. It answers three
//! questions for the defaults resolver: which kind aliases exist, which field
//! aliases a kind accepts, and how a raw field value is coerced into its
//! immutable form.

mod address;
mod definition;
mod error;
mod field;
mod kind;
mod registry;
mod value;

pub use address::{ScopeAddress, DEFAULTS_TARGET_NAME};
pub use definition::{FieldDefinition, KindDefinition, RegistryDefinition};
pub use error::{CoercionError, RegistryError};
pub use field::{FieldCoercion, FieldType};
pub use kind::{FieldDescriptor, KindDescriptor};
pub use registry::{KindRegistry, KindRegistryBuilder};
pub use value::{type_name, FieldValue};
