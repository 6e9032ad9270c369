use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A property's extracted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "String",
            Value::Bool(_) => "bool",
            Value::Int16(_) => "i16",
            Value::Int32(_) => "i32",
            Value::Int64(_) => "i64",
            Value::Float32(_) => "f32",
            Value::Float64(_) => "f64",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(v) => write!(f, "{:?}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{type_name} expects more than {supplied} constructor arguments")]
    MissingArgument { type_name: String, supplied: usize },

    #[error("Argument '{name}' of {type_name} expected {expected}, found {found}")]
    TypeMismatch {
        type_name: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{type_name} left {count} constructor arguments unused")]
    UnusedArguments { type_name: String, count: usize },
}

/// Conversion from an extracted [`Value`] into a constructor parameter type.
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    String => Text,
    bool => Bool,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = "Option";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A value type that can be built from a plan's constructor arguments.
pub trait FromRecord: Sized {
    fn from_record(arguments: &mut Arguments) -> Result<Self, RecordError>;
}

/// Extracted values of one construction, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub(crate) fn new(type_name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_arguments(self) -> Arguments {
        Arguments {
            type_name: self.type_name,
            consumed: 0,
            fields: self.fields.into_iter(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Constructor arguments handed out positionally.
#[derive(Debug)]
pub struct Arguments {
    type_name: String,
    consumed: usize,
    fields: std::vec::IntoIter<(String, Value)>,
}

impl Arguments {
    pub fn next<T: FromValue>(&mut self) -> Result<T, RecordError> {
        let (name, value) = self
            .fields
            .next()
            .ok_or_else(|| RecordError::MissingArgument {
                type_name: self.type_name.clone(),
                supplied: self.consumed,
            })?;
        self.consumed += 1;

        let found = value.kind();
        T::from_value(value).ok_or_else(|| RecordError::TypeMismatch {
            type_name: self.type_name.clone(),
            name,
            expected: T::EXPECTED,
            found,
        })
    }

    pub fn remaining(&self) -> usize {
        self.fields.len()
    }

    /// Fails when the constructor did not take every argument.
    pub fn finish(self) -> Result<(), RecordError> {
        match self.fields.len() {
            0 => Ok(()),
            count => Err(RecordError::UnusedArguments {
                type_name: self.type_name,
                count,
            }),
        }
    }
}
