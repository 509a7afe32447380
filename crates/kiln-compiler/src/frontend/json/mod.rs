//! JSON schema-document frontend.
//!
//! Consumes the introspection output: one or more `.json` documents
//! describing models, fields, relations and uniqueness constraints.

pub mod ast;
pub mod normalize;
pub mod parser;

use std::path::Path;

use crate::diagnostic::GeneratorError;
use crate::ir::SchemaIR;

use super::Frontend;

/// Frontend for JSON data-model documents.
pub struct JsonFrontend;

impl JsonFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for JsonFrontend {
    fn format(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse_directory(&mut self, dir: &Path) -> Result<SchemaIR, GeneratorError> {
        let documents = parser::parse_directory(dir)?;
        normalize::normalize(documents, dir.to_path_buf())
    }
}
