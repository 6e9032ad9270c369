//! Property descriptors of a value object
//!
//! A [`ValueSchema`] is the ordered list of [`PropertyDescriptor`]s for one value
//! type. Each descriptor carries a name, a [`DeclaredType`] and a locator path.
//! Descriptors are immutable once built; unsupported types are kept as data and
//! only rejected when a plan is assembled.

pub mod descriptor;
pub mod error;
pub mod type_enum_macro;
pub mod types;
pub mod value_schema;

pub use descriptor::PropertyDescriptor;
pub use error::SchemaError;
pub use types::{DeclaredType, TypeKind};
pub use value_schema::ValueSchema;
