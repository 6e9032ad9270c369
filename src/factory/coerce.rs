use super::value::Value;
use crate::plan::Coercion;
use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("not a boolean: {0}")]
    Bool(#[from] ParseBoolError),

    #[error("not an integer: {0}")]
    Int(#[from] ParseIntError),

    #[error("not a floating point number: {0}")]
    Float(#[from] ParseFloatError),
}

/// Converts node text to a typed value. Floating-point text is trimmed of
/// surrounding whitespace and control characters first; integers and
/// booleans are parsed as-is.
pub fn coerce(coercion: Coercion, text: &str) -> Result<Value, CoercionError> {
    let value = match coercion {
        Coercion::Text => Value::Text(text.to_string()),
        Coercion::Bool => Value::Bool(text.parse()?),
        Coercion::Int16 => Value::Int16(text.parse()?),
        Coercion::Int32 => Value::Int32(text.parse()?),
        Coercion::Int64 => Value::Int64(text.parse()?),
        Coercion::Float32 => Value::Float32(trim_float(text).parse()?),
        Coercion::Float64 => Value::Float64(trim_float(text).parse()?),
    };
    Ok(value)
}

fn trim_float(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        text = { Coercion::Text, "a_string", Value::Text("a_string".to_string()) },
        empty_text = { Coercion::Text, "", Value::Text(String::new()) },
        boolean = { Coercion::Bool, "true", Value::Bool(true) },
        int16 = { Coercion::Int16, "20", Value::Int16(20) },
        int32 = { Coercion::Int32, "-5", Value::Int32(-5) },
        int64 = { Coercion::Int64, "7234987235016749342", Value::Int64(7234987235016749342) },
        float32 = { Coercion::Float32, "444.555", Value::Float32(444.555) },
        float64 = { Coercion::Float64, "987654321.123456", Value::Float64(987654321.123456) },
        float32_padded = { Coercion::Float32, "\n  444.555\t", Value::Float32(444.555) },
        float64_padded = { Coercion::Float64, " 1.5 ", Value::Float64(1.5) },
        text_keeps_padding = { Coercion::Text, " a ", Value::Text(" a ".to_string()) },
    )]
    fn test_coerce_valid(coercion: Coercion, text: &str, expected: Value) {
        assert_eq!(coerce(coercion, text).unwrap(), expected);
    }

    #[parameterized(
        bool_case = { Coercion::Bool, "TRUE" },
        bool_word = { Coercion::Bool, "yes" },
        int_overflow = { Coercion::Int16, "40000" },
        int_whitespace = { Coercion::Int32, " 3" },
        int_empty = { Coercion::Int64, "" },
        float_garbage = { Coercion::Float64, "1.2.3" },
        float_blank = { Coercion::Float32, "   " },
        float_inner_space = { Coercion::Float64, "1 .5" },
    )]
    fn test_coerce_rejects(coercion: Coercion, text: &str) {
        assert!(coerce(coercion, text).is_err());
    }

    #[test]
    fn test_error_kind_follows_target() {
        assert!(matches!(coerce(Coercion::Bool, "1"), Err(CoercionError::Bool(_))));
        assert!(matches!(coerce(Coercion::Int32, "x"), Err(CoercionError::Int(_))));
        assert!(matches!(coerce(Coercion::Float32, "x"), Err(CoercionError::Float(_))));
    }
}
