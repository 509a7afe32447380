//! Schema frontends for parsing data-model documents into IR.
//!
//! Each frontend is responsible for:
//! 1. Discovering and parsing schema documents in its format
//! 2. Normalizing the raw descriptors into the canonical entity model
//!
//! This keeps the synthesis core independent of how the data model was
//! described; the introspection collaborator that produced the documents is
//! out of scope.

pub mod json;

use std::path::Path;

use crate::diagnostic::GeneratorError;
use crate::ir::SchemaIR;

/// Trait for schema frontends.
pub trait Frontend {
    /// Returns the format name (e.g., "json").
    fn format(&self) -> &str;

    /// Returns file extensions this frontend handles.
    fn extensions(&self) -> &[&str];

    /// Parses all schema documents in the given directory and returns the
    /// normalized schema.
    fn parse_directory(&mut self, dir: &Path) -> Result<SchemaIR, GeneratorError>;
}

/// Creates a frontend for the given format.
pub fn create_frontend(format: &str) -> Result<Box<dyn Frontend>, GeneratorError> {
    match format {
        "json" => Ok(Box::new(json::JsonFrontend::new())),
        _ => Err(GeneratorError::UnsupportedFormat {
            format: format.to_string(),
        }),
    }
}
