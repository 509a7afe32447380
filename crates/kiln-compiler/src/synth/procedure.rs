//! Procedure synthesis.
//!
//! For each enabled (entity, operation kind) pair, produces one
//! `ProcedureSpec`: the derived name, contracts, route, call shape and
//! error-handling policy. This is pure data - the emission layer turns it
//! into source text, and must never make any of these decisions itself.

use crate::config::GeneratorConfig;
use crate::diagnostic::GeneratorError;
use crate::ir::{AccessClass, Entity, OperationKind};

use super::call::CallShape;
use super::naming;
use super::plan::OperationPlan;

/// What a procedure does when the underlying lookup returns no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Raise a `not_found` taxonomy error. Only read-unique and read-first.
    Throw,
    /// Propagate the underlying result unchanged - zero-row write results
    /// are not errors.
    PassThrough,
}

/// Shape of a procedure's successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// A single entity record.
    Entity,
    /// A list of entity records.
    EntityList,
    /// A `{ count: N }` object. Bulk writes are naturally shaped this way;
    /// the bare count operation is wrapped to match.
    Count,
    /// An aggregate result keyed by selection.
    AggregateResult,
    /// Grouped rows from a group-by.
    GroupedRows,
}

/// One synthesized procedure. Never persisted; recomputed per run.
#[derive(Debug, Clone)]
pub struct ProcedureSpec {
    pub entity: String,
    pub kind: OperationKind,

    /// Derived procedure name - also the rule-table key and the dispatch
    /// key in the entity's handler bundle.
    pub name: String,

    pub route_path: String,
    pub classification: AccessClass,

    /// Input-contract type name (validator ident derives from it).
    pub input_type: String,

    pub output: OutputShape,
    pub call: CallShape,
    pub not_found: NotFoundPolicy,

    /// Wrap the successful result in the uniform response envelope.
    pub envelope: bool,
}

impl ProcedureSpec {
    /// For read-unique against a soft-deleted entity: the marker field whose
    /// non-null value turns a found record into not-found.
    pub fn marker_not_found_check(&self) -> Option<&str> {
        if self.kind == OperationKind::FindById {
            self.call.marker_filter.as_deref()
        } else {
            None
        }
    }
}

fn output_shape(kind: OperationKind) -> OutputShape {
    match kind {
        OperationKind::Create
        | OperationKind::Update
        | OperationKind::Upsert
        | OperationKind::Delete
        | OperationKind::FindFirst
        | OperationKind::FindById => OutputShape::Entity,
        OperationKind::FindMany => OutputShape::EntityList,
        OperationKind::CreateMany
        | OperationKind::UpdateMany
        | OperationKind::DeleteMany
        | OperationKind::Count => OutputShape::Count,
        OperationKind::Aggregate => OutputShape::AggregateResult,
        OperationKind::GroupBy => OutputShape::GroupedRows,
    }
}

fn not_found_policy(kind: OperationKind) -> NotFoundPolicy {
    match kind {
        OperationKind::FindById | OperationKind::FindFirst => NotFoundPolicy::Throw,
        _ => NotFoundPolicy::PassThrough,
    }
}

/// Synthesizes every enabled procedure for one entity, in the fixed
/// operation order.
pub fn synthesize_entity(
    entity: &Entity,
    plan: &OperationPlan,
    config: &GeneratorConfig,
) -> Result<Vec<ProcedureSpec>, GeneratorError> {
    let id_field = entity
        .id_field()
        .ok_or_else(|| GeneratorError::MissingIdentifier {
            entity: entity.name.clone(),
        })?;

    let marker = plan.marker_field.as_deref();

    Ok(plan
        .enabled
        .iter()
        .map(|&kind| ProcedureSpec {
            entity: entity.name.clone(),
            kind,
            name: naming::procedure_name(&entity.name, kind, config.prefix_entity_names),
            route_path: naming::route_path(&entity.name, kind),
            classification: kind.classification(),
            input_type: naming::input_type(&entity.name, kind),
            output: output_shape(kind),
            call: CallShape::build(kind, marker, &id_field.name),
            not_found: not_found_policy(kind),
            envelope: config.envelope,
        })
        .collect())
}
