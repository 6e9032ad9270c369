use super::coerce::CoercionError;
use super::value::RecordError;
use crate::document::{DocumentError, PathError};
use thiserror::Error;

/// Failure while running a construction plan against one input.
#[derive(Debug, Error)]
pub enum ConstructError {
    #[error("Document processing failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Could not evaluate path '{path}'")]
    PathEvaluation {
        property: String,
        path: String,
        #[source]
        source: PathError,
    },

    #[error("No node matched path '{path}' for required property '{property}'")]
    MissingNode { property: String, path: String },

    #[error("Could not convert '{value}' at path '{path}' for property '{property}'")]
    Coercion {
        property: String,
        path: String,
        value: String,
        #[source]
        source: CoercionError,
    },

    #[error("Constructor rejected arguments: {0}")]
    Record(#[from] RecordError),
}

impl ConstructError {
    /// Property the failure is attributed to, if any.
    pub fn property(&self) -> Option<&str> {
        match self {
            ConstructError::PathEvaluation { property, .. }
            | ConstructError::MissingNode { property, .. }
            | ConstructError::Coercion { property, .. } => Some(property),
            ConstructError::Document(_) | ConstructError::Record(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_path_evaluation_message_names_path() {
        let err = ConstructError::PathEvaluation {
            property: "id".to_string(),
            path: "/pets/[".to_string(),
            source: PathError::UnexpectedEnd,
        };
        assert_eq!(err.to_string(), "Could not evaluate path '/pets/['");
        assert_eq!(err.property(), Some("id"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_document_error_converts() {
        let err: ConstructError = DocumentError::TooLarge { limit: 5 }.into();
        assert!(matches!(err, ConstructError::Document(DocumentError::TooLarge { .. })));
        assert_eq!(err.property(), None);
    }
}
