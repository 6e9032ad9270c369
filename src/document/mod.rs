//! Document boundary
//!
//! Everything a construction needs from the outside world: a byte source that is
//! always closed ([`SourceGuard`]), text decoding and XML parsing on top of
//! `roxmltree` ([`parse_document`]), and locator evaluation ([`PathEvaluator`]).

pub mod error;
pub mod parser;
pub mod source;
pub mod xpath;

pub use error::{DocumentError, PathError};
pub use parser::{decode, parse_document, DocumentOptions};
pub use source::{ByteSource, InputSource, ReaderSource, SourceGuard};
pub use xpath::{CompiledPath, NodeMatch, PathEvaluator, XPathEvaluator};
