//! Construction plans
//!
//! [`resolve`] turns one property descriptor into an [`ExtractionStep`];
//! [`assemble`] orders the steps of a whole [`ValueSchema`](crate::schema::ValueSchema)
//! into a [`ConstructionPlan`] ending in a single constructor call.

pub mod assembler;
pub mod resolver;
pub mod strategy;

pub use assembler::{assemble, ConstructionPlan, ConstructorCall};
pub use resolver::resolve;
pub use strategy::{Coercion, ExtractionStep, NullGuard, Strategy};
