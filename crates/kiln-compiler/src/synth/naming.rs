//! Identifier derivation.
//!
//! Every identifier the generator mints - procedure names, rule-table keys,
//! route paths, bundle exports - flows through the helpers here, so the
//! router, the policy artifact and the test scaffolds can never disagree on
//! a name. The consistency layer still verifies that, but this module is
//! what makes it hold in the first place.

use crate::ir::OperationKind;

/// Lowercases the first character only, leaving the rest of the string
/// untouched. `"AccommodationPricing"` becomes `"accommodationPricing"`,
/// never `"accommodationpricing"` - a multi-word entity name keeps its
/// internal capitalization.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Uppercases the first character only.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// The key an entity is filed under in the rule table and route paths.
pub fn entity_key(entity: &str) -> String {
    lower_first(entity)
}

/// Derives the externally visible procedure name for an (entity, operation)
/// pair. With prefixing, `("AccommodationPricing", Create)` derives
/// `"accommodationPricingCreate"`; without, the bare api name.
pub fn procedure_name(entity: &str, kind: OperationKind, prefixed: bool) -> String {
    if prefixed {
        format!("{}{}", lower_first(entity), upper_first(kind.api_name()))
    } else {
        kind.api_name().to_string()
    }
}

/// Route path for a procedure: `/{entityKey}/{segment}`.
pub fn route_path(entity: &str, kind: OperationKind) -> String {
    format!("/{}/{}", entity_key(entity), kind.route_segment())
}

/// The export identifier for an entity's procedure bundle. This exact
/// identifier is used by the handlers module, the router import, and the
/// generated test scaffold.
pub fn bundle_export(entity: &str) -> String {
    format!("{}Api", lower_first(entity))
}

/// The input-contract type name for a procedure.
pub fn input_type(entity: &str, kind: OperationKind) -> String {
    format!("{}{}Input", entity, upper_first(kind.api_name()))
}

/// The validator function name for a procedure input.
pub fn validator_name(entity: &str, kind: OperationKind) -> String {
    format!("validate{}", input_type(entity, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_first_keeps_internal_capitalization() {
        assert_eq!(lower_first("AccommodationPricing"), "accommodationPricing");
        assert_ne!(lower_first("AccommodationPricing"), "accommodationpricing");
        assert_eq!(lower_first("User"), "user");
        assert_eq!(lower_first("user"), "user");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn prefixed_procedure_name_casing() {
        assert_eq!(
            procedure_name("AccommodationPricing", OperationKind::Create, true),
            "accommodationPricingCreate"
        );
        assert_ne!(
            procedure_name("AccommodationPricing", OperationKind::Create, true),
            "accommodationpricingCreate"
        );
        assert_eq!(
            procedure_name("User", OperationKind::FindById, true),
            "userFindById"
        );
        assert_eq!(
            procedure_name("User", OperationKind::GroupBy, true),
            "userGroupBy"
        );
    }

    #[test]
    fn bare_procedure_name_without_prefixing() {
        assert_eq!(procedure_name("User", OperationKind::Create, false), "create");
        assert_eq!(
            procedure_name("User", OperationKind::FindById, false),
            "findById"
        );
    }

    #[test]
    fn route_paths_use_the_entity_key() {
        assert_eq!(
            route_path("AccommodationPricing", OperationKind::FindMany),
            "/accommodationPricing/find-many"
        );
        assert_eq!(route_path("User", OperationKind::GroupBy), "/user/group-by");
    }

    #[test]
    fn bundle_export_is_entity_keyed() {
        assert_eq!(bundle_export("User"), "userApi");
        assert_eq!(bundle_export("AccommodationPricing"), "accommodationPricingApi");
    }

    #[test]
    fn input_type_names() {
        assert_eq!(input_type("User", OperationKind::FindMany), "UserFindManyInput");
        assert_eq!(
            validator_name("User", OperationKind::GroupBy),
            "validateUserGroupByInput"
        );
    }
}
