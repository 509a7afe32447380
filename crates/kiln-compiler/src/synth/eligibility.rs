//! Per-entity aggregation eligibility.
//!
//! Computed once per entity by the policy resolver and consulted by the
//! procedure synthesizer (and the validator emitter) to decide which
//! aggregate sub-fields the aggregate/group-by input contracts accept.

use crate::ir::Entity;

/// Which aggregate selections an entity supports, by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateEligibility {
    /// Fields eligible for `_sum` (non-list numeric).
    pub sum: Vec<String>,
    /// Fields eligible for `_avg` (non-list numeric).
    pub avg: Vec<String>,
    /// Fields eligible for `_min` (non-list numeric, timestamp, or text).
    pub min: Vec<String>,
    /// Fields eligible for `_max` (same population as `_min`).
    pub max: Vec<String>,
}

impl AggregateEligibility {
    /// Derives eligibility from an entity's non-list scalar fields.
    pub fn of(entity: &Entity) -> Self {
        let mut eligibility = Self::default();
        for field in entity.scalar_fields() {
            let Some(tag) = field.type_tag else { continue };
            if tag.is_numeric() {
                eligibility.sum.push(field.name.clone());
                eligibility.avg.push(field.name.clone());
            }
            if tag.is_comparable() {
                eligibility.min.push(field.name.clone());
                eligibility.max.push(field.name.clone());
            }
        }
        eligibility
    }

    pub fn supports_sum(&self) -> bool {
        !self.sum.is_empty()
    }

    pub fn supports_avg(&self) -> bool {
        !self.avg.is_empty()
    }

    pub fn supports_min(&self) -> bool {
        !self.min.is_empty()
    }

    pub fn supports_max(&self) -> bool {
        !self.max.is_empty()
    }

    /// Count is legal against any entity, always.
    pub fn supports_count(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Field, FieldKind, TypeTag};

    fn scalar(name: &str, tag: TypeTag) -> Field {
        Field {
            name: name.to_string(),
            kind: FieldKind::Scalar,
            type_tag: Some(tag),
            type_name: String::new(),
            optional: false,
            read_only: false,
            list: false,
            unique: false,
            id: false,
            generated: false,
            updated_at: false,
            relation: None,
        }
    }

    fn entity(fields: Vec<Field>) -> Entity {
        Entity {
            name: "Test".to_string(),
            fields,
            unique_field_sets: vec![],
            unique_indexes: vec![],
            primary_key: None,
        }
    }

    #[test]
    fn numeric_fields_enable_sum_and_avg() {
        let e = entity(vec![
            scalar("id", TypeTag::Text),
            scalar("price", TypeTag::Decimal),
            scalar("views", TypeTag::Integer),
        ]);
        let eligibility = AggregateEligibility::of(&e);

        assert_eq!(eligibility.sum, vec!["price", "views"]);
        assert_eq!(eligibility.avg, vec!["price", "views"]);
        assert!(eligibility.supports_sum());
    }

    #[test]
    fn zero_numeric_fields_means_no_sum_or_avg() {
        let e = entity(vec![
            scalar("id", TypeTag::Text),
            scalar("active", TypeTag::Boolean),
            scalar("createdAt", TypeTag::Timestamp),
        ]);
        let eligibility = AggregateEligibility::of(&e);

        assert!(!eligibility.supports_sum());
        assert!(!eligibility.supports_avg());
        // min/max still apply to text and timestamp fields.
        assert_eq!(eligibility.min, vec!["id", "createdAt"]);
        assert!(eligibility.supports_count());
    }

    #[test]
    fn list_fields_are_never_eligible() {
        let mut views = scalar("views", TypeTag::Integer);
        views.list = true;
        let e = entity(vec![scalar("id", TypeTag::Text), views]);
        let eligibility = AggregateEligibility::of(&e);

        assert!(!eligibility.supports_sum());
        assert_eq!(eligibility.min, vec!["id"]);
    }

    #[test]
    fn boolean_and_json_are_excluded_from_min_max() {
        let e = entity(vec![
            scalar("flag", TypeTag::Boolean),
            scalar("meta", TypeTag::Json),
        ]);
        let eligibility = AggregateEligibility::of(&e);
        assert!(!eligibility.supports_min());
        assert!(!eligibility.supports_max());
    }
}
