//! Generator error types.
//!
//! Everything in here is a generation-time failure: the run aborts with one
//! of these, rendered once through miette, and no partial output is written.
//! Errors surfaced by the *generated* code at request time are a different
//! population entirely (see `synth::taxonomy`).

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur during a generation run.
#[derive(Error, Diagnostic, Debug)]
pub enum GeneratorError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to read file '{path}': {message}")]
    #[diagnostic(code(kiln::io::read_error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Frontend Errors
    // =========================================================================
    #[error("Unsupported schema format: {format}")]
    #[diagnostic(code(kiln::frontend::unsupported_format))]
    UnsupportedFormat {
        format: String,
    },

    #[error("Failed to parse schema document: {}", path.display())]
    #[diagnostic(code(kiln::frontend::parse_failed))]
    ParseFailed {
        path: PathBuf,
        message: String,
    },

    #[error("No schema documents found in '{}'", dir.display())]
    #[diagnostic(
        code(kiln::frontend::no_schema),
        help("The data-model introspection step must run before generation. Point --schema at the directory it writes its documents to.")
    )]
    NoSchemaDocuments {
        dir: PathBuf,
    },

    #[error("Duplicate entity name: {name}")]
    #[diagnostic(code(kiln::frontend::duplicate_entity))]
    DuplicateEntity {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    // =========================================================================
    // Schema Mapping Errors
    // =========================================================================
    #[error("Entity '{entity}', field '{field}': unknown field kind '{kind}'")]
    #[diagnostic(
        code(kiln::schema::unknown_kind),
        help("Supported field kinds are: scalar, object, enum")
    )]
    UnknownFieldKind {
        entity: String,
        field: String,
        kind: String,
    },

    #[error("Entity '{entity}', field '{field}': unsupported type tag '{tag}'")]
    #[diagnostic(
        code(kiln::schema::unknown_type),
        help("Supported scalar types are: String, Int, BigInt, Float, Decimal, Boolean, DateTime, Bytes, Json")
    )]
    UnknownTypeTag {
        entity: String,
        field: String,
        tag: String,
    },

    #[error("Entity '{entity}', field '{field}': object field is missing a relation name")]
    #[diagnostic(code(kiln::schema::missing_relation))]
    MissingRelationName {
        entity: String,
        field: String,
    },

    #[error("Entity '{entity}', field '{field}': scalar field carries a relation name")]
    #[diagnostic(code(kiln::schema::unexpected_relation))]
    UnexpectedRelationName {
        entity: String,
        field: String,
    },

    // =========================================================================
    // Synthesis Errors
    // =========================================================================
    #[error("Entity '{entity}' has no identifier field")]
    #[diagnostic(
        code(kiln::synthesis::missing_identifier),
        help("Every entity needs an id field (or a single-field primary key) - findById, group-by defaults and ordering synthesis all depend on it.")
    )]
    MissingIdentifier {
        entity: String,
    },

    #[error("Entity '{entity}': cannot synthesize '{operation}' - no eligible fields")]
    #[diagnostic(
        code(kiln::synthesis::empty_aggregate_target),
        help("Aggregate and group-by operations need at least one non-list scalar field. Remove the operation from the allow-list for this entity or add a scalar field.")
    )]
    EmptyAggregateTarget {
        entity: String,
        operation: String,
    },

    // =========================================================================
    // Policy Errors
    // =========================================================================
    #[error("Custom policy module not found: {}", path.display())]
    #[diagnostic(
        code(kiln::policy::custom_not_found),
        help("The custom policy source must be a module exporting a named 'permissions' object.")
    )]
    CustomPolicyNotFound {
        path: PathBuf,
    },

    // =========================================================================
    // Naming / Consistency Errors
    // =========================================================================
    #[error("Entity '{entity}': rule table key '{key}' has no matching procedure")]
    #[diagnostic(code(kiln::naming::rule_without_procedure))]
    RuleWithoutProcedure {
        entity: String,
        key: String,
    },

    #[error("Entity '{entity}': procedure '{name}' has no rule table entry")]
    #[diagnostic(code(kiln::naming::procedure_without_rule))]
    ProcedureWithoutRule {
        entity: String,
        name: String,
    },

    #[error("Export identifier '{export}' is minted by both '{first}' and '{second}'")]
    #[diagnostic(
        code(kiln::naming::duplicate_export),
        help("Entity names that differ only in leading-letter case collide after lower-first derivation. Rename one of the entities.")
    )]
    DuplicateExport {
        export: String,
        first: String,
        second: String,
    },
}

impl GeneratorError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }
}
