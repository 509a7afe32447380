//! Raw schema-document types.
//!
//! These mirror the introspection collaborator's output shape verbatim.
//! Nothing here is validated beyond what serde enforces; classification and
//! invariant checks happen in `normalize`.

use serde::Deserialize;

/// A whole schema document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    #[serde(default)]
    pub models: Vec<RawModel>,
    #[serde(default)]
    pub enums: Vec<RawEnum>,
}

/// A raw model descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModel {
    pub name: String,

    /// Documentation comment attached to the model. Hidden-entity
    /// directives are embedded here.
    #[serde(default)]
    pub documentation: Option<String>,

    /// Fields in declaration order.
    pub fields: Vec<RawField>,

    /// Sets of field names that are unique together.
    #[serde(default)]
    pub unique_fields: Vec<Vec<String>>,

    #[serde(default)]
    pub unique_indexes: Vec<RawUniqueIndex>,

    #[serde(default)]
    pub primary_key: Option<RawPrimaryKey>,
}

/// A raw field descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub name: String,

    /// "scalar" | "object" | "enum"
    pub kind: String,

    /// Scalar type tag, or the referenced model/enum name.
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub is_list: bool,

    /// Required means non-nullable; the normalizer inverts this into the
    /// `optional` flag.
    #[serde(default = "default_true")]
    pub is_required: bool,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub is_id: bool,

    #[serde(default)]
    pub is_read_only: bool,

    #[serde(default)]
    pub is_generated: bool,

    #[serde(default)]
    pub is_updated_at: bool,

    #[serde(default)]
    pub relation_name: Option<String>,

    #[serde(default)]
    pub relation_from_fields: Vec<String>,

    #[serde(default)]
    pub relation_to_fields: Vec<String>,

    #[serde(default)]
    pub documentation: Option<String>,
}

fn default_true() -> bool {
    true
}

/// A raw named unique index.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUniqueIndex {
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<String>,
}

/// A raw compound primary key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrimaryKey {
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<String>,
}

/// A raw enum descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnum {
    pub name: String,
    pub values: Vec<RawEnumValue>,
}

/// One enum member. Documents spell these either as bare strings or as
/// `{ "name": ... }` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEnumValue {
    Name(String),
    Object { name: String },
}

impl RawEnumValue {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(s) => s,
            Self::Object { name } => name,
        }
    }
}
