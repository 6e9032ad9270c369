//! xmlfactory - schema-driven construction of typed values from XML
//!
//! A value type is described by a [`ValueSchema`]: an ordered list of
//! properties, each with a scalar type, an optional XPath locator and a
//! nullability flag. From that description the library builds a
//! [`ConstructionPlan`] once, then runs it against any number of XML
//! documents through a [`ValueFactory`].
//!
//! # Core Concepts
//!
//! - **Resolution**: every declared type maps to an extraction strategy, or to
//!   an explicit unsupported marker
//! - **Assembly**: strategies are stitched into a plan in declaration order;
//!   one unsupported property rejects the whole schema
//! - **Realization**: the plan parses the input, evaluates each locator,
//!   coerces node text and hands the values to the constructor
//!
//! # Example Usage
//!
//! ```
//! use xmlfactory::{ValueFactory, ValueSchema, Value};
//!
//! let schema = ValueSchema::from_yaml_str(r#"
//! type_name: Pet
//! properties:
//!   - name: id
//!     type: String
//!     path: /pets/item/@id
//!   - name: years
//!     type: i32
//!     path: /pets/item/age/years/text()
//!   - name: days
//!     type: Option<i32>
//!     path: /pets/item/age/days/text()
//! "#).unwrap();
//!
//! let factory = ValueFactory::from_schema(&schema).unwrap();
//! let record = factory
//!     .construct(r#"<pets><item id="PetRequestId"><age><years>3</years></age></item></pets>"#)
//!     .unwrap();
//!
//! assert_eq!(record.get("years"), Some(&Value::Int32(3)));
//! assert_eq!(record.get("days"), Some(&Value::Null));
//! ```
//!
//! # Project Structure
//!
//! - [`schema`]: property descriptors, declared types and schema files
//! - [`plan`]: strategy resolution and plan assembly
//! - [`document`]: input sources, XML parsing and path evaluation
//! - [`factory`]: runtime realization of plans

pub mod config;
pub mod document;
pub mod factory;
pub mod plan;
pub mod schema;
pub mod util;

pub use config::{ConfigError, FactoryConfig};
pub use document::{DocumentError, DocumentOptions, InputSource, PathError, PathEvaluator, XPathEvaluator};
pub use factory::{
    Arguments, ConstructError, FromRecord, FromValue, Record, RecordError, Value, ValueFactory,
};
pub use plan::{assemble, ConstructionPlan, ExtractionStep, Strategy};
pub use schema::{DeclaredType, PropertyDescriptor, SchemaError, TypeKind, ValueSchema};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
