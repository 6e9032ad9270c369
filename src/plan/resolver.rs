//! Maps a declared type to its extraction strategy
//!
//! Resolution is total: unsupported types come back as [`Strategy::Unsupported`]
//! instead of an error, and the assembler decides what to do with them.

use super::strategy::{Coercion, ExtractionStep, NullGuard, Strategy};
use crate::schema::{PropertyDescriptor, TypeKind};
use tracing::debug;

pub fn resolve(index: usize, descriptor: &PropertyDescriptor) -> ExtractionStep {
    let declared_type = descriptor.declared_type();

    let coercion = match declared_type.kind() {
        TypeKind::Bool => Some(Coercion::Bool),
        TypeKind::Float64 => Some(Coercion::Float64),
        TypeKind::Float32 => Some(Coercion::Float32),
        TypeKind::Int32 => Some(Coercion::Int32),
        TypeKind::Int64 => Some(Coercion::Int64),
        TypeKind::Int16 => Some(Coercion::Int16),
        TypeKind::Text => Some(Coercion::Text),
        TypeKind::Unsupported(_) => None,
    };

    let strategy = match coercion {
        Some(coercion) => Strategy::Extract {
            coercion,
            guard: if declared_type.is_nullable() {
                NullGuard::Nullable
            } else {
                NullGuard::Required
            },
        },
        None => Strategy::Unsupported {
            type_name: declared_type.to_string(),
        },
    };

    debug!(
        index,
        property = descriptor.name(),
        declared_type = %declared_type,
        strategy = ?strategy,
        "Resolved extraction strategy"
    );

    ExtractionStep {
        index,
        property: descriptor.name().to_string(),
        locator: descriptor.locator().to_string(),
        declared_type: declared_type.clone(),
        strategy,
    }
}
