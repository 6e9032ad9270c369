use crate::schema::DeclaredType;
use std::fmt;

/// How a node's text becomes a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// Node text is used unchanged
    Text,
    Bool,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl Coercion {
    /// Name of the target Rust type, used in diagnostics and plan listings.
    pub fn target(&self) -> &'static str {
        match self {
            Coercion::Text => "String",
            Coercion::Bool => "bool",
            Coercion::Int16 => "i16",
            Coercion::Int32 => "i32",
            Coercion::Int64 => "i64",
            Coercion::Float32 => "f32",
            Coercion::Float64 => "f64",
        }
    }
}

/// Whether an absent node short-circuits to null or is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullGuard {
    Required,
    Nullable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Terminal: a plan can never be built from a step carrying this.
    Unsupported { type_name: String },
    Extract { coercion: Coercion, guard: NullGuard },
}

impl Strategy {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Strategy::Unsupported { .. })
    }
}

/// One property's planned extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionStep {
    pub(crate) index: usize,
    pub(crate) property: String,
    pub(crate) locator: String,
    pub(crate) declared_type: DeclaredType,
    pub(crate) strategy: Strategy,
}

impl ExtractionStep {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Synthetic name of the intermediate node, never visible to the constructor.
    pub fn node_binding(&self) -> String {
        format!("node{}", self.index)
    }

    pub fn value_binding(&self) -> &str {
        &self.property
    }
}

impl fmt::Display for ExtractionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node_binding();
        writeln!(f, "{} = evaluate(path, {:?}, document)", node, self.locator)?;

        let read = match &self.strategy {
            Strategy::Unsupported { type_name } => {
                return write!(f, "{} = unsupported({})", self.property, type_name);
            }
            Strategy::Extract {
                coercion: Coercion::Text,
                ..
            } => format!("{}.text()", node),
            Strategy::Extract { coercion, .. } => {
                format!("{}::parse({}.text())", coercion.target(), node)
            }
        };

        match &self.strategy {
            Strategy::Extract {
                guard: NullGuard::Nullable,
                ..
            } => write!(
                f,
                "{} = if {} is absent {{ null }} else {{ {} }}",
                self.property, node, read
            ),
            _ => write!(f, "{} = {}", self.property, read),
        }
    }
}
