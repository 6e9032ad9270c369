use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Raw input could not be turned into a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error("Input is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    #[error("Input exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Malformed document: {0}")]
    Parse(#[from] roxmltree::Error),
}

/// A locator expression that cannot be compiled or does not select nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path expression")]
    Empty,

    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unsupported node test '{0}()'")]
    UnknownNodeTest(String),

    #[error("unknown axis '{0}'")]
    UnknownAxis(String),

    #[error("unknown function '{0}()'")]
    UnknownFunction(String),

    #[error("function '{function}()' does not take {found} argument(s)")]
    ArgumentCount { function: String, found: usize },

    #[error("variable '${0}' is not bound")]
    UnboundVariable(String),

    #[error("expression does not select nodes")]
    NotANodeSet,

    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedLiteral { offset: usize },
}
