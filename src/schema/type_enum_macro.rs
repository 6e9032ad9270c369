/// Declares a closed set of scalar kinds with a catch-all `Unsupported(String)` arm.
///
/// Each variant lists its serde name, the canonical type name used in diagnostics and
/// any accepted aliases. Unknown names never fail to parse; they land in `Unsupported`
/// so that rejection can be deferred to plan assembly.
#[macro_export]
macro_rules! define_type_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $serde_name:literal : $display_name:literal
                $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            Unsupported(String),
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let s: &str = match self {
                    $(
                        Self::$variant => $serde_name,
                    )*
                    Self::Unsupported(name) => name,
                };
                serializer.serialize_str(s)
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $(
                    if s == $serde_name {
                        return Ok(Self::$variant);
                    }
                )*
                Ok(Self::parse(&s))
            }
        }

        impl $enum_name {
            pub fn name(&self) -> &str {
                match self {
                    $(
                        Self::$variant => $display_name,
                    )*
                    Self::Unsupported(name) => name,
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(
                        $display_name $(| $alias)* => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }

            /// Like [`from_name`](Self::from_name) but total: unknown names become `Unsupported`.
            pub fn parse(name: &str) -> Self {
                Self::from_name(name).unwrap_or_else(|| Self::Unsupported(name.to_string()))
            }

            pub fn is_supported(&self) -> bool {
                !matches!(self, Self::Unsupported(_))
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
