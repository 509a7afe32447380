//! Canonical entity model.
//!
//! This IR is produced by schema frontends and consumed by the synthesis
//! stages. It represents the data model (entities, fields, relations,
//! uniqueness) in a way that's independent of the document format that
//! described it.

mod access;
mod operation;

pub use access::{Rule, RuleTable};
pub use operation::{AccessClass, OperationKind};

use std::path::PathBuf;

use serde::Serialize;

/// Field name that marks an entity as soft-deletable.
///
/// A non-list scalar timestamp field with exactly this name converts
/// physical deletes into marker updates everywhere downstream. There is no
/// other per-entity opt-in.
pub const SOFT_DELETE_FIELD: &str = "deletedAt";

/// Classification of a field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Scalar,
    Object,
    Enum,
}

/// Underlying type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Text,
    Integer,
    Float,
    Decimal,
    Boolean,
    Timestamp,
    Binary,
    Json,
}

impl TypeTag {
    /// Maps a raw introspection type tag to the canonical one.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "String" => Some(Self::Text),
            "Int" | "BigInt" => Some(Self::Integer),
            "Float" => Some(Self::Float),
            "Decimal" => Some(Self::Decimal),
            "Boolean" => Some(Self::Boolean),
            "DateTime" => Some(Self::Timestamp),
            "Bytes" => Some(Self::Binary),
            "Json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Numeric types are eligible for sum/avg aggregation.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Decimal)
    }

    /// Comparable types are eligible for min/max aggregation.
    pub fn is_comparable(self) -> bool {
        self.is_numeric() || matches!(self, Self::Timestamp | Self::Text)
    }
}

/// Relation metadata carried by an object-kind field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// Relation name shared by both sides.
    pub name: String,
    /// Local fields holding the foreign key.
    pub from_fields: Vec<String>,
    /// Referenced fields on the target entity.
    pub to_fields: Vec<String>,
}

/// A normalized field.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,

    /// Canonical scalar type. `None` for object and enum kinds, which carry
    /// their target in `type_name` instead.
    pub type_tag: Option<TypeTag>,

    /// Raw type name from the document: the scalar tag, or the referenced
    /// entity/enum name.
    pub type_name: String,

    pub optional: bool,
    pub read_only: bool,
    pub list: bool,
    pub unique: bool,
    pub id: bool,
    pub generated: bool,
    pub updated_at: bool,

    /// Present iff `kind` is `Object` (normalizer invariant).
    pub relation: Option<Relation>,
}

impl Field {
    /// True for the soft-delete marker field.
    pub fn is_soft_delete_marker(&self) -> bool {
        self.name == SOFT_DELETE_FIELD
            && self.kind == FieldKind::Scalar
            && self.type_tag == Some(TypeTag::Timestamp)
            && !self.list
    }
}

/// A multi-field unique index descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct UniqueIndex {
    pub name: Option<String>,
    pub fields: Vec<String>,
}

/// A normalized entity. Constructed once per generation run, immutable
/// thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    pub unique_field_sets: Vec<Vec<String>>,
    pub unique_indexes: Vec<UniqueIndex>,
    /// Explicit primary key fields, if the document declared one.
    pub primary_key: Option<Vec<String>>,
}

impl Entity {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The primary identifier field: the `isId` field, or the single field
    /// of an explicit one-field primary key.
    pub fn id_field(&self) -> Option<&Field> {
        if let Some(f) = self.fields.iter().find(|f| f.id) {
            return Some(f);
        }
        match self.primary_key.as_deref() {
            Some([single]) => self.field(single),
            _ => None,
        }
    }

    /// The soft-delete marker field, if this entity has one.
    pub fn soft_delete_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_soft_delete_marker())
    }

    /// Non-list scalar fields, the population aggregation eligibility and
    /// group-by keys are drawn from.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Scalar && !f.list)
    }
}

/// An enum declared by the schema.
#[derive(Debug, Clone, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

/// The complete normalized schema for one generation run.
#[derive(Debug)]
pub struct SchemaIR {
    pub entities: Vec<Entity>,
    pub enums: Vec<EnumDef>,
    pub source_dir: PathBuf,
}

impl SchemaIR {
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            entities: Vec::new(),
            enums: Vec::new(),
            source_dir,
        }
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_field() -> Field {
        Field {
            name: SOFT_DELETE_FIELD.to_string(),
            kind: FieldKind::Scalar,
            type_tag: Some(TypeTag::Timestamp),
            type_name: "DateTime".to_string(),
            optional: true,
            read_only: false,
            list: false,
            unique: false,
            id: false,
            generated: false,
            updated_at: false,
            relation: None,
        }
    }

    #[test]
    fn marker_detection_requires_name_and_type() {
        let mut f = marker_field();
        assert!(f.is_soft_delete_marker());

        f.type_tag = Some(TypeTag::Text);
        assert!(!f.is_soft_delete_marker());

        let mut g = marker_field();
        g.name = "deleted_at".to_string();
        assert!(!g.is_soft_delete_marker());

        let mut h = marker_field();
        h.list = true;
        assert!(!h.is_soft_delete_marker());
    }

    #[test]
    fn type_tag_mapping() {
        assert_eq!(TypeTag::from_raw("String"), Some(TypeTag::Text));
        assert_eq!(TypeTag::from_raw("Int"), Some(TypeTag::Integer));
        assert_eq!(TypeTag::from_raw("BigInt"), Some(TypeTag::Integer));
        assert_eq!(TypeTag::from_raw("DateTime"), Some(TypeTag::Timestamp));
        assert_eq!(TypeTag::from_raw("Unsupported"), None);
    }

    #[test]
    fn eligibility_classes() {
        assert!(TypeTag::Integer.is_numeric());
        assert!(TypeTag::Decimal.is_numeric());
        assert!(!TypeTag::Timestamp.is_numeric());
        assert!(TypeTag::Timestamp.is_comparable());
        assert!(TypeTag::Text.is_comparable());
        assert!(!TypeTag::Boolean.is_comparable());
        assert!(!TypeTag::Json.is_comparable());
    }
}
