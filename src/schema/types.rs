use std::fmt;

crate::define_type_enum! {
    /// Scalar kind a property is declared with
    TypeKind {
        Text => "text" : "String" | "string" | "str" | "&str" | "text",
        Bool => "bool" : "bool" | "boolean",
        Int16 => "i16" : "i16" | "short",
        Int32 => "i32" : "i32" | "int" | "integer",
        Int64 => "i64" : "i64" | "long",
        Float32 => "f32" : "f32" | "float",
        Float64 => "f64" : "f64" | "double",
    }
}

const OPTION_PREFIX: &str = "Option<";

/// A property's static type: a scalar kind in its required or nullable variant.
///
/// Fields are private so the type stays fixed once a descriptor has been built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    kind: TypeKind,
    nullable: bool,
}

impl DeclaredType {
    pub fn required(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub fn nullable(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::required(TypeKind::Unsupported(name.into()))
    }

    /// Parses a Rust-style type name. `Option<T>` is the nullable variant of `T`;
    /// anything that is not a known scalar (including nested options) is unsupported.
    pub fn parse(type_name: &str) -> Self {
        let trimmed = type_name.trim();

        match trimmed
            .strip_prefix(OPTION_PREFIX)
            .and_then(|rest| rest.strip_suffix('>'))
        {
            Some(inner) => {
                let inner = inner.trim();
                if inner.starts_with(OPTION_PREFIX) {
                    Self::unsupported(trimmed)
                } else {
                    Self::nullable(TypeKind::parse(inner))
                }
            }
            None => Self::required(TypeKind::parse(trimmed)),
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_supported(&self) -> bool {
        self.kind.is_supported()
    }

    /// Returns the same kind with nullability switched on.
    pub(crate) fn into_nullable(self) -> Self {
        Self::nullable(self.kind)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}{}>", OPTION_PREFIX, self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_kind_aliases() {
        assert_eq!(TypeKind::from_name("int"), Some(TypeKind::Int32));
        assert_eq!(TypeKind::from_name("double"), Some(TypeKind::Float64));
        assert_eq!(TypeKind::from_name("boolean"), Some(TypeKind::Bool));
        assert_eq!(TypeKind::from_name("&str"), Some(TypeKind::Text));
        assert_eq!(TypeKind::from_name("StringBuilder"), None);
    }

    #[test]
    fn test_type_kind_parse_is_total() {
        assert_eq!(
            TypeKind::parse("Vec<String>"),
            TypeKind::Unsupported("Vec<String>".to_string())
        );
        assert!(!TypeKind::parse("Vec<String>").is_supported());
        assert!(TypeKind::parse("i64").is_supported());
    }

    #[test]
    fn test_type_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&TypeKind::Text).unwrap(),
            "\"text\""
        );
        assert_eq!(
            serde_json::from_str::<TypeKind>("\"f32\"").unwrap(),
            TypeKind::Float32
        );
        assert_eq!(
            serde_json::from_str::<TypeKind>("\"long\"").unwrap(),
            TypeKind::Int64
        );
        assert_eq!(
            serde_json::from_str::<TypeKind>("\"Uuid\"").unwrap(),
            TypeKind::Unsupported("Uuid".to_string())
        );
    }

    #[test]
    fn test_all_variants_excludes_unsupported() {
        assert_eq!(TypeKind::all_variants().len(), 7);
        assert!(TypeKind::all_variants().iter().all(TypeKind::is_supported));
    }

    #[test]
    fn test_declared_type_parse_option() {
        let ty = DeclaredType::parse("Option<i32>");
        assert_eq!(ty.kind(), &TypeKind::Int32);
        assert!(ty.is_nullable());

        let ty = DeclaredType::parse(" Option< String > ");
        assert_eq!(ty.kind(), &TypeKind::Text);
        assert!(ty.is_nullable());
    }

    #[test]
    fn test_declared_type_nested_option_is_unsupported() {
        let ty = DeclaredType::parse("Option<Option<i32>>");
        assert!(!ty.is_supported());
        assert_eq!(ty.to_string(), "Option<Option<i32>>");
    }

    #[test]
    fn test_declared_type_display() {
        assert_eq!(DeclaredType::required(TypeKind::Int16).to_string(), "i16");
        assert_eq!(
            DeclaredType::nullable(TypeKind::Text).to_string(),
            "Option<String>"
        );
        assert_eq!(
            DeclaredType::unsupported("StringBuilder").to_string(),
            "StringBuilder"
        );
    }
}
