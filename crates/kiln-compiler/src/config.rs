//! Generator configuration.
//!
//! The core only ever sees typed values. Coercing strings ("true"/"false",
//! rule names) into these fields is the CLI's job, at the configuration
//! loading boundary.

use std::path::PathBuf;

use crate::ir::{OperationKind, Rule};

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory containing schema documents.
    pub schema_dir: PathBuf,

    /// Directory to write the generated project.
    pub out_dir: PathBuf,

    /// Schema document format (default: "json").
    pub format: String,

    /// Operation allow-list. `None` means all operation kinds are enabled.
    /// Essential kinds are force-included even when an explicit list omits
    /// them, so the generated API is always minimally usable.
    pub operations: Option<Vec<OperationKind>>,

    /// Prefix procedure names with the lower-first entity name
    /// (`userCreate` instead of `create`).
    pub prefix_entity_names: bool,

    /// Global soft-delete toggle. Restricts marker-driven behavior, never
    /// expands it: an entity without a `deletedAt` marker is unaffected
    /// either way.
    pub soft_delete: bool,

    /// Default rule applied to read-classified procedures.
    pub read_rule: Rule,

    /// Default rule applied to write-classified procedures.
    pub write_rule: Rule,

    /// Custom policy module. When set, rule-table synthesis is bypassed and
    /// the generated router imports `permissions` from this module instead.
    pub custom_policy: Option<PathBuf>,

    /// Wrap successful responses in a uniform envelope carrying the payload
    /// plus operation metadata.
    pub envelope: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schema"),
            out_dir: PathBuf::from(".kiln"),
            format: "json".to_string(),
            operations: None,
            prefix_entity_names: true,
            soft_delete: true,
            read_rule: Rule::Authenticated,
            write_rule: Rule::Authenticated,
            custom_policy: None,
            envelope: false,
        }
    }
}
