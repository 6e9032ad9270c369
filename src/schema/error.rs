use thiserror::Error;

/// Build-time schema failures. Any of these stops plan assembly entirely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Can not read type '{type_name}' for property '{property}'")]
    UnsupportedType { property: String, type_name: String },

    #[error("Property '{0}' is declared more than once")]
    DuplicateProperty(String),

    #[error("Invalid property name '{0}': expected an identifier")]
    InvalidPropertyName(String),

    #[error("Property '{0}' has an empty locator")]
    EmptyLocator(String),
}
