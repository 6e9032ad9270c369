use super::types::DeclaredType;

/// One declared property of a value object.
///
/// The locator is fixed at construction: the explicit path when one is given,
/// otherwise the property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    declared_type: DeclaredType,
    locator: String,
    explicit_locator: bool,
}

impl PropertyDescriptor {
    pub fn new(
        name: impl Into<String>,
        declared_type: DeclaredType,
        locator: Option<String>,
    ) -> Self {
        let name = name.into();
        let explicit_locator = locator.is_some();
        let locator = locator.unwrap_or_else(|| name.clone());

        Self {
            name,
            declared_type,
            locator,
            explicit_locator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared_type
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn has_explicit_locator(&self) -> bool {
        self.explicit_locator
    }

    pub fn is_nullable(&self) -> bool {
        self.declared_type.is_nullable()
    }
}
