//! Entity model normalization.
//!
//! Converts raw model/field descriptors into the canonical entity model:
//! faithful kind/type classification, relation invariants, soft-delete
//! marker detection, and hidden-entity exclusion. Field declaration order is
//! preserved throughout.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::diagnostic::GeneratorError;
use crate::ir::{
    Entity, EnumDef, Field, FieldKind, Relation, SchemaIR, TypeTag, UniqueIndex,
};

use super::ast::{RawField, RawModel};
use super::parser::ParsedDocument;

/// Directive that removes an entity from every downstream stage.
const HIDDEN_DIRECTIVE: &str = "@hidden";

/// Normalizes parsed documents into a `SchemaIR`.
///
/// Models merge across documents; a duplicate entity name is a generation
/// error naming both declaration sites. Hidden entities are dropped here and
/// never reach the policy resolver or synthesizer.
pub fn normalize(
    documents: Vec<ParsedDocument>,
    source_dir: PathBuf,
) -> Result<SchemaIR, GeneratorError> {
    let mut schema = SchemaIR::new(source_dir);
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for parsed in documents {
        for model in &parsed.document.models {
            if let Some(first) = seen.get(&model.name) {
                return Err(GeneratorError::DuplicateEntity {
                    name: model.name.clone(),
                    first: first.clone(),
                    second: parsed.path.clone(),
                });
            }
            seen.insert(model.name.clone(), parsed.path.clone());

            if is_hidden(model) {
                continue;
            }

            schema.entities.push(normalize_model(model)?);
        }

        for raw_enum in &parsed.document.enums {
            schema.enums.push(EnumDef {
                name: raw_enum.name.clone(),
                values: raw_enum.values.iter().map(|v| v.name().to_string()).collect(),
            });
        }
    }

    Ok(schema)
}

fn is_hidden(model: &RawModel) -> bool {
    model
        .documentation
        .as_deref()
        .is_some_and(|doc| doc.contains(HIDDEN_DIRECTIVE))
}

fn normalize_model(model: &RawModel) -> Result<Entity, GeneratorError> {
    let mut fields = Vec::with_capacity(model.fields.len());
    for raw in &model.fields {
        fields.push(normalize_field(&model.name, raw)?);
    }

    Ok(Entity {
        name: model.name.clone(),
        fields,
        unique_field_sets: model.unique_fields.clone(),
        unique_indexes: model
            .unique_indexes
            .iter()
            .map(|idx| UniqueIndex {
                name: idx.name.clone(),
                fields: idx.fields.clone(),
            })
            .collect(),
        primary_key: model.primary_key.as_ref().map(|pk| pk.fields.clone()),
    })
}

fn normalize_field(entity: &str, raw: &RawField) -> Result<Field, GeneratorError> {
    let kind = match raw.kind.as_str() {
        "scalar" => FieldKind::Scalar,
        "object" => FieldKind::Object,
        "enum" => FieldKind::Enum,
        other => {
            return Err(GeneratorError::UnknownFieldKind {
                entity: entity.to_string(),
                field: raw.name.clone(),
                kind: other.to_string(),
            })
        }
    };

    // Relation invariant: an object field always carries a non-empty
    // relation name; a scalar field never does.
    let relation = match kind {
        FieldKind::Object => match raw.relation_name.as_deref() {
            Some(name) if !name.is_empty() => Some(Relation {
                name: name.to_string(),
                from_fields: raw.relation_from_fields.clone(),
                to_fields: raw.relation_to_fields.clone(),
            }),
            _ => {
                return Err(GeneratorError::MissingRelationName {
                    entity: entity.to_string(),
                    field: raw.name.clone(),
                })
            }
        },
        FieldKind::Scalar | FieldKind::Enum => {
            if raw.relation_name.as_deref().is_some_and(|n| !n.is_empty()) {
                return Err(GeneratorError::UnexpectedRelationName {
                    entity: entity.to_string(),
                    field: raw.name.clone(),
                });
            }
            None
        }
    };

    let type_tag = match kind {
        FieldKind::Scalar => Some(TypeTag::from_raw(&raw.type_name).ok_or_else(|| {
            GeneratorError::UnknownTypeTag {
                entity: entity.to_string(),
                field: raw.name.clone(),
                tag: raw.type_name.clone(),
            }
        })?),
        // Object and enum fields reference a named type; no scalar tag.
        FieldKind::Object | FieldKind::Enum => None,
    };

    Ok(Field {
        name: raw.name.clone(),
        kind,
        type_tag,
        type_name: raw.type_name.clone(),
        optional: !raw.is_required,
        read_only: raw.is_read_only,
        list: raw.is_list,
        unique: raw.is_unique,
        id: raw.is_id,
        generated: raw.is_generated,
        updated_at: raw.is_updated_at,
        relation,
    })
}
