use super::descriptor::PropertyDescriptor;
use super::error::SchemaError;
use super::types::DeclaredType;
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

fn identifier_pattern() -> &'static Regex {
    static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier regex"))
}

/// Ordered property descriptors of one value object.
///
/// Declaration order is authoritative: it is the order of extraction and the
/// order of the constructor's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct ValueSchema {
    type_name: String,
    properties: Vec<PropertyDescriptor>,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    type_name: String,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    nullable: bool,
}

impl TryFrom<RawSchema> for ValueSchema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        let properties = raw
            .properties
            .into_iter()
            .map(|p| {
                let mut declared_type = DeclaredType::parse(&p.type_name);
                if p.nullable {
                    declared_type = declared_type.into_nullable();
                }
                PropertyDescriptor::new(p.name, declared_type, p.path)
            })
            .collect();

        ValueSchema::new(raw.type_name, properties)
    }
}

impl ValueSchema {
    pub fn new(
        type_name: impl Into<String>,
        properties: Vec<PropertyDescriptor>,
    ) -> Result<Self, SchemaError> {
        let ident = identifier_pattern();
        let mut seen = HashSet::new();

        for property in &properties {
            if !ident.is_match(property.name()) {
                return Err(SchemaError::InvalidPropertyName(property.name().to_string()));
            }
            if !seen.insert(property.name()) {
                return Err(SchemaError::DuplicateProperty(property.name().to_string()));
            }
            if property.has_explicit_locator() && property.locator().trim().is_empty() {
                return Err(SchemaError::EmptyLocator(property.name().to_string()));
            }
        }

        Ok(Self {
            type_name: type_name.into(),
            properties,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse YAML value schema")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse JSON value schema")
    }

    /// Loads a schema file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read value schema {}", path.display()))?;

        let schema = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => bail!(
                "Unsupported value schema format: {} (expected .yaml, .yml or .json)",
                path.display()
            ),
        };

        schema.with_context(|| format!("Invalid value schema {}", path.display()))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
