//! Shared helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use xmlfactory::{ValueFactory, ValueSchema};

pub fn fixture_path(category: &str, name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(category)
        .join(name)
}

pub fn document(name: &str) -> String {
    fs::read_to_string(fixture_path("documents", name)).expect("Failed to read document fixture")
}

pub fn schema(name: &str) -> ValueSchema {
    ValueSchema::load(&fixture_path("schemas", name)).expect("Failed to load schema fixture")
}

pub fn factory(name: &str) -> ValueFactory {
    ValueFactory::from_schema(&schema(name)).expect("Failed to assemble plan")
}
