//! Operation policy resolution.
//!
//! For each non-hidden entity, decides which operation kinds are enabled,
//! whether soft-delete filter injection applies, and what the entity's
//! aggregation eligibility is. The procedure synthesizer consumes these
//! decisions verbatim; it never re-derives them.

use crate::config::GeneratorConfig;
use crate::ir::{Entity, OperationKind, SchemaIR};

use super::eligibility::AggregateEligibility;

/// Resolved operation policy for one entity.
#[derive(Debug, Clone)]
pub struct OperationPlan {
    pub entity: String,

    /// Enabled operation kinds, in the fixed `OperationKind::ALL` order.
    pub enabled: Vec<OperationKind>,

    /// Soft-delete behavior is active for this entity: it has a marker
    /// field AND the global toggle permits it. The toggle restricts, never
    /// expands.
    pub soft_delete: bool,

    /// Marker field name when `soft_delete` is set.
    pub marker_field: Option<String>,

    pub eligibility: AggregateEligibility,
}

impl OperationPlan {
    pub fn is_enabled(&self, kind: OperationKind) -> bool {
        self.enabled.contains(&kind)
    }
}

/// Resolves the operation plan for one entity.
///
/// An operation kind is enabled iff it appears in the configured allow-list;
/// a missing allow-list means all kinds. Essential kinds are force-included
/// even when an explicit allow-list omits them.
pub fn resolve(entity: &Entity, config: &GeneratorConfig) -> OperationPlan {
    let enabled = OperationKind::ALL
        .into_iter()
        .filter(|kind| match &config.operations {
            None => true,
            Some(list) => list.contains(kind) || OperationKind::ESSENTIAL.contains(kind),
        })
        .collect();

    let marker = entity.soft_delete_field().map(|f| f.name.clone());
    let soft_delete = marker.is_some() && config.soft_delete;

    OperationPlan {
        entity: entity.name.clone(),
        enabled,
        soft_delete,
        marker_field: if soft_delete { marker } else { None },
        eligibility: AggregateEligibility::of(entity),
    }
}

/// Resolves plans for every entity in schema order.
pub fn resolve_all(schema: &SchemaIR, config: &GeneratorConfig) -> Vec<OperationPlan> {
    schema
        .entities
        .iter()
        .map(|entity| resolve(entity, config))
        .collect()
}

/// Read operations that receive the soft-delete filter injection when a
/// marker is present.
pub fn filter_injected(kind: OperationKind) -> bool {
    matches!(
        kind,
        OperationKind::FindFirst
            | OperationKind::FindMany
            | OperationKind::FindById
            | OperationKind::Count
            | OperationKind::Aggregate
            | OperationKind::GroupBy
    )
}
