use super::resolver::resolve;
use super::strategy::{ExtractionStep, Strategy};
use crate::schema::{SchemaError, ValueSchema};
use std::fmt;
use tracing::{debug, warn};

/// Terminal action of a plan: call the value type's constructor with every
/// extracted binding, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorCall {
    pub type_name: String,
    pub arguments: Vec<String>,
}

impl fmt::Display for ConstructorCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "return {}({})", self.type_name, self.arguments.join(", "))
    }
}

/// Ordered extraction steps for one value type plus its constructor call.
///
/// Only [`assemble`] builds one, so every step is guaranteed to be extractable
/// and the constructor arguments always match step order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionPlan {
    type_name: String,
    steps: Vec<ExtractionStep>,
    constructor: ConstructorCall,
}

impl ConstructionPlan {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn steps(&self) -> &[ExtractionStep] {
        &self.steps
    }

    pub fn constructor(&self) -> &ConstructorCall {
        &self.constructor
    }
}

impl fmt::Display for ConstructionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        write!(f, "{}", self.constructor)
    }
}

/// Builds the construction plan for `schema`, or fails on the first property
/// whose type cannot be extracted. No partial plan is ever returned.
pub fn assemble(schema: &ValueSchema) -> Result<ConstructionPlan, SchemaError> {
    let mut steps = Vec::with_capacity(schema.len());

    for (index, descriptor) in schema.properties().iter().enumerate() {
        let step = resolve(index, descriptor);

        if let Strategy::Unsupported { type_name } = step.strategy() {
            warn!(
                value_type = schema.type_name(),
                property = step.property(),
                declared_type = %type_name,
                "Unsupported property type, aborting plan"
            );
            return Err(SchemaError::UnsupportedType {
                property: step.property().to_string(),
                type_name: type_name.clone(),
            });
        }

        steps.push(step);
    }

    let constructor = ConstructorCall {
        type_name: schema.type_name().to_string(),
        arguments: steps
            .iter()
            .map(|s| s.value_binding().to_string())
            .collect(),
    };

    debug!(
        value_type = schema.type_name(),
        steps = steps.len(),
        "Assembled construction plan"
    );

    Ok(ConstructionPlan {
        type_name: schema.type_name().to_string(),
        steps,
        constructor,
    })
}
