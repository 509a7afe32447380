//! The synthesis core.
//!
//! Pure in-memory transformation from the canonical entity model to
//! procedure specifications and the authorization rule table. Stages run in
//! dependency order and complete fully before any consumer (emission,
//! scaffolding) sees the result - there is no partial synthesis state.

pub mod authz;
pub mod call;
pub mod eligibility;
pub mod naming;
pub mod plan;
pub mod procedure;
pub mod taxonomy;

use crate::config::GeneratorConfig;
use crate::diagnostic::GeneratorError;
use crate::ir::{RuleTable, SchemaIR};

pub use plan::OperationPlan;
pub use procedure::ProcedureSpec;

/// The complete output of the synthesis stages for one run.
#[derive(Debug)]
pub struct Synthesis {
    /// Procedure specifications, entity-major in schema order, operations
    /// in the fixed kind order.
    pub procedures: Vec<ProcedureSpec>,

    /// The synthesized rule table; `None` when a custom policy source is
    /// configured.
    pub rule_table: Option<RuleTable>,
}

impl Synthesis {
    /// Procedures belonging to one entity.
    pub fn entity_procedures<'a>(
        &'a self,
        entity: &'a str,
    ) -> impl Iterator<Item = &'a ProcedureSpec> {
        self.procedures.iter().filter(move |p| p.entity == entity)
    }
}

/// Runs procedure and rule-table synthesis over resolved plans.
pub fn synthesize(
    schema: &SchemaIR,
    plans: &[OperationPlan],
    config: &GeneratorConfig,
) -> Result<Synthesis, GeneratorError> {
    let mut procedures = Vec::new();
    for (entity, plan) in schema.entities.iter().zip(plans) {
        procedures.extend(procedure::synthesize_entity(entity, plan, config)?);
    }

    let rule_table = authz::synthesize(&procedures, config);

    Ok(Synthesis {
        procedures,
        rule_table,
    })
}
