//! Runtime realization of construction plans
//!
//! A [`ValueFactory`] owns one assembled [`ConstructionPlan`] and runs it
//! against raw XML input: read the source, parse it, evaluate every step's
//! locator, guard absent nodes, coerce node text and collect the results into
//! a [`Record`] in declaration order. Typed values are produced through
//! [`FromRecord`].

pub mod coerce;
pub mod error;
pub mod value;

pub use coerce::{coerce, CoercionError};
pub use error::ConstructError;
pub use value::{Arguments, FromRecord, FromValue, Record, RecordError, Value};

use crate::document::{
    decode, parse_document, ByteSource, DocumentOptions, InputSource, PathEvaluator,
    ReaderSource, SourceGuard, XPathEvaluator,
};
use crate::plan::{assemble, ConstructionPlan, ExtractionStep, NullGuard, Strategy};
use crate::schema::{SchemaError, ValueSchema};
use roxmltree::Document;
use std::io::Read;
use tracing::{debug, trace};

/// Builds values of one schema's type from XML documents.
///
/// The factory is immutable; every call owns its input, document and
/// bindings, so a single factory can be shared between threads.
#[derive(Debug, Clone)]
pub struct ValueFactory<E: PathEvaluator = XPathEvaluator> {
    plan: ConstructionPlan,
    evaluator: E,
    options: DocumentOptions,
}

impl ValueFactory<XPathEvaluator> {
    pub fn new(plan: ConstructionPlan) -> Self {
        Self {
            plan,
            evaluator: XPathEvaluator,
            options: DocumentOptions::default(),
        }
    }

    /// Assembles the plan for `schema`. Fails without building anything when
    /// any property has an unsupported type.
    pub fn from_schema(schema: &ValueSchema) -> Result<Self, SchemaError> {
        Ok(Self::new(assemble(schema)?))
    }
}

impl<E: PathEvaluator> ValueFactory<E> {
    pub fn with_evaluator<F: PathEvaluator>(self, evaluator: F) -> ValueFactory<F> {
        ValueFactory {
            plan: self.plan,
            evaluator,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: DocumentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn plan(&self) -> &ConstructionPlan {
        &self.plan
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn construct(&self, raw: &str) -> Result<Record, ConstructError> {
        self.construct_bytes(raw.as_bytes())
    }

    pub fn construct_bytes(&self, raw: &[u8]) -> Result<Record, ConstructError> {
        self.construct_from(ByteSource::from_bytes(raw))
    }

    pub fn construct_reader<R: Read>(&self, reader: R) -> Result<Record, ConstructError> {
        self.construct_from(ReaderSource::new(reader))
    }

    /// Runs the plan against `source`. The source is closed exactly once
    /// before this returns, whatever the outcome; a failure to close is
    /// logged and ignored.
    pub fn construct_from<S: InputSource>(&self, source: S) -> Result<Record, ConstructError> {
        let mut guard = SourceGuard::new(source);

        let bytes = guard.read_all(self.options.max_input_bytes)?;
        let text = decode(bytes)?;
        let document = parse_document(&text, &self.options)?;

        let record = self.realize(&document)?;

        debug!(
            value_type = self.plan.type_name(),
            properties = record.len(),
            "Constructed record"
        );

        Ok(record)
    }

    /// Constructs a record and hands its values to `T`'s constructor.
    pub fn construct_into<T: FromRecord>(&self, raw: &str) -> Result<T, ConstructError> {
        let mut arguments = self.construct(raw)?.into_arguments();
        let value = T::from_record(&mut arguments)?;
        arguments.finish()?;
        Ok(value)
    }

    fn realize(&self, document: &Document<'_>) -> Result<Record, ConstructError> {
        let mut fields = Vec::with_capacity(self.plan.steps().len());

        for step in self.plan.steps() {
            let value = self.extract(step, document)?;
            trace!(
                node = %step.node_binding(),
                property = step.property(),
                path = step.locator(),
                value = %value,
                "Evaluated extraction step"
            );
            fields.push((step.property().to_string(), value));
        }

        Ok(Record::new(self.plan.type_name(), fields))
    }

    fn extract(&self, step: &ExtractionStep, document: &Document<'_>) -> Result<Value, ConstructError> {
        let (coercion, guard) = match step.strategy() {
            Strategy::Extract { coercion, guard } => (*coercion, *guard),
            Strategy::Unsupported { type_name } => {
                unreachable!("assembled plan contains unsupported type '{}'", type_name)
            }
        };

        let node = self
            .evaluator
            .evaluate(step.locator(), document)
            .map_err(|source| ConstructError::PathEvaluation {
                property: step.property().to_string(),
                path: step.locator().to_string(),
                source,
            })?;

        let Some(node) = node else {
            return match guard {
                NullGuard::Nullable => Ok(Value::Null),
                NullGuard::Required => Err(ConstructError::MissingNode {
                    property: step.property().to_string(),
                    path: step.locator().to_string(),
                }),
            };
        };

        let text = node.text();
        coerce(coercion, &text).map_err(|source| ConstructError::Coercion {
            property: step.property().to_string(),
            path: step.locator().to_string(),
            value: text,
            source,
        })
    }
}
