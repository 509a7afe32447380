//! Generation-time structural checks.
//!
//! The generator refuses to emit code that could only fail at runtime: a
//! malformed (entity, operation) combination aborts the run here, before
//! any synthesis output exists.

use crate::diagnostic::GeneratorError;
use crate::ir::{OperationKind, SchemaIR};
use crate::synth::OperationPlan;

/// Validates every entity against its resolved plan.
pub fn validate_structure(
    schema: &SchemaIR,
    plans: &[OperationPlan],
) -> Result<(), GeneratorError> {
    for (entity, plan) in schema.entities.iter().zip(plans) {
        if entity.id_field().is_none() {
            return Err(GeneratorError::MissingIdentifier {
                entity: entity.name.clone(),
            });
        }

        // Aggregate and group-by need at least one non-list scalar field to
        // select or group on. An entity made purely of relations can't
        // satisfy that shape no matter what the caller sends.
        for kind in [OperationKind::Aggregate, OperationKind::GroupBy] {
            if plan.is_enabled(kind) && entity.scalar_fields().next().is_none() {
                return Err(GeneratorError::EmptyAggregateTarget {
                    entity: entity.name.clone(),
                    operation: kind.api_name().to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::{Entity, Field, FieldKind, Relation, TypeTag};
    use crate::synth::plan;
    use std::path::PathBuf;

    fn id_field() -> Field {
        Field {
            name: "id".to_string(),
            kind: FieldKind::Scalar,
            type_tag: Some(TypeTag::Text),
            type_name: String::new(),
            optional: false,
            read_only: false,
            list: false,
            unique: false,
            id: true,
            generated: false,
            updated_at: false,
            relation: None,
        }
    }

    fn relation_only_entity() -> Entity {
        Entity {
            name: "Link".to_string(),
            fields: vec![Field {
                name: "target".to_string(),
                kind: FieldKind::Object,
                type_tag: None,
                type_name: "User".to_string(),
                optional: false,
                read_only: false,
                list: false,
                unique: false,
                id: true,
                generated: false,
                updated_at: false,
                relation: Some(Relation {
                    name: "LinkTarget".to_string(),
                    from_fields: vec![],
                    to_fields: vec![],
                }),
            }],
            unique_field_sets: vec![],
            unique_indexes: vec![],
            primary_key: None,
        }
    }

    fn check(entities: Vec<Entity>, config: &GeneratorConfig) -> Result<(), GeneratorError> {
        let schema = SchemaIR {
            entities,
            enums: vec![],
            source_dir: PathBuf::new(),
        };
        let plans = plan::resolve_all(&schema, config);
        validate_structure(&schema, &plans)
    }

    #[test]
    fn entity_without_identifier_is_fatal() {
        let entity = Entity {
            name: "Orphan".to_string(),
            fields: vec![],
            unique_field_sets: vec![],
            unique_indexes: vec![],
            primary_key: None,
        };
        let err = check(vec![entity], &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::MissingIdentifier { .. }));
    }

    #[test]
    fn aggregate_against_zero_scalar_fields_is_fatal() {
        let err = check(vec![relation_only_entity()], &GeneratorConfig::default()).unwrap_err();
        match err {
            GeneratorError::EmptyAggregateTarget { entity, operation } => {
                assert_eq!(entity, "Link");
                assert_eq!(operation, "aggregate");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn disabling_aggregate_ops_makes_the_entity_acceptable() {
        let config = GeneratorConfig {
            // Essential kinds only; aggregate and group-by disabled.
            operations: Some(vec![]),
            ..GeneratorConfig::default()
        };
        assert!(check(vec![relation_only_entity()], &config).is_ok());
    }

    #[test]
    fn ordinary_entity_passes() {
        let entity = Entity {
            name: "User".to_string(),
            fields: vec![id_field()],
            unique_field_sets: vec![],
            unique_indexes: vec![],
            primary_key: None,
        };
        assert!(check(vec![entity], &GeneratorConfig::default()).is_ok());
    }
}
