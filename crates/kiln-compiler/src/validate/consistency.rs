//! Artifact naming consistency.
//!
//! The last gate before emission: every name minted by synthesis must agree
//! across every artifact that will carry it. A mismatch here is a fatal
//! generation error - a silently-emitted inconsistency (a rule key with no
//! procedure, a router export the test scaffold can't import) is exactly
//! the defect class this layer exists to make impossible.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostic::GeneratorError;
use crate::synth::{naming, Synthesis};

/// Verifies cross-artifact name agreement for a whole run.
///
/// For entities under auto-generated policy, the rule-table key set must
/// equal the procedure name set - both directions. Bundle export
/// identifiers must be globally unique: entity names differing only in
/// leading-letter case collide after lower-first derivation, and two
/// entities sharing an export would silently shadow each other in the
/// router and test scaffolds.
pub fn validate_consistency(synthesis: &Synthesis) -> Result<(), GeneratorError> {
    // Distinct entity names, in first-appearance order.
    let mut entities: Vec<&str> = Vec::new();
    for proc in &synthesis.procedures {
        if !entities.contains(&proc.entity.as_str()) {
            entities.push(&proc.entity);
        }
    }

    // Bundle export identifiers must be unique across the run. Checked
    // first: a key collision also corrupts the per-key table comparison
    // below, and this is the more actionable report.
    let mut exports: BTreeMap<String, &str> = BTreeMap::new();
    for entity in &entities {
        let export = naming::bundle_export(entity);
        if let Some(first) = exports.get(&export) {
            return Err(GeneratorError::DuplicateExport {
                export,
                first: (*first).to_string(),
                second: (*entity).to_string(),
            });
        }
        exports.insert(export, entity);
    }

    let Some(table) = &synthesis.rule_table else {
        // Custom policy source: table synthesis was bypassed, and the
        // external module's content is not ours to validate.
        return Ok(());
    };

    // Procedure names grouped the way the table is keyed.
    let mut by_key: BTreeMap<String, (String, BTreeSet<String>)> = BTreeMap::new();
    for proc in &synthesis.procedures {
        let key = naming::entity_key(&proc.entity);
        by_key
            .entry(key)
            .or_insert_with(|| (proc.entity.clone(), BTreeSet::new()))
            .1
            .insert(proc.name.clone());
    }

    for (key, (entity, names)) in &by_key {
        let rules = table.entity(key);
        for name in names {
            if rules.is_none_or(|r| !r.contains_key(name)) {
                return Err(GeneratorError::ProcedureWithoutRule {
                    entity: entity.clone(),
                    name: name.clone(),
                });
            }
        }
    }
    for (key, rules) in &table.entities {
        let names = by_key.get(key).map(|(_, names)| names);
        for rule_key in rules.keys() {
            if names.is_none_or(|n| !n.contains(rule_key)) {
                let entity = by_key
                    .get(key)
                    .map_or_else(|| key.clone(), |(entity, _)| entity.clone());
                return Err(GeneratorError::RuleWithoutProcedure {
                    entity,
                    key: rule_key.clone(),
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
    use crate::frontend::json::ast::RawDocument;
    use crate::frontend::json::normalize;
    use crate::frontend::json::parser::ParsedDocument;
    use crate::ir::Rule;
    use crate::synth::{plan, synthesize};
    use std::path::PathBuf;

    fn synthesis_for(json: &str, config: &GeneratorConfig) -> Synthesis {
        let document: RawDocument = serde_json::from_str(json).unwrap();
        let schema = normalize::normalize(
            vec![ParsedDocument {
                path: PathBuf::from("schema.json"),
                document,
            }],
            PathBuf::new(),
        )
        .unwrap();
        let plans = plan::resolve_all(&schema, config);
        synthesize(&schema, &plans, config).unwrap()
    }

    const USER_SCHEMA: &str = r#"{ "models": [{ "name": "User", "fields": [
        { "name": "id", "kind": "scalar", "type": "String", "isId": true }
    ] }] }"#;

    #[test]
    fn consistent_synthesis_passes() {
        let synthesis = synthesis_for(USER_SCHEMA, &GeneratorConfig::default());
        assert!(validate_consistency(&synthesis).is_ok());
    }

    #[test]
    fn round_trip_law_holds_for_every_entity() {
        let json = r#"{ "models": [
            { "name": "User", "fields": [
                { "name": "id", "kind": "scalar", "type": "String", "isId": true }
            ] },
            { "name": "AccommodationPricing", "fields": [
                { "name": "id", "kind": "scalar", "type": "String", "isId": true },
                { "name": "rate", "kind": "scalar", "type": "Decimal" }
            ] }
        ] }"#;
        let synthesis = synthesis_for(json, &GeneratorConfig::default());
        let table = synthesis.rule_table.as_ref().unwrap();

        // Key set equality per entity, both directions.
        for (key, entity) in [("user", "User"), ("accommodationPricing", "AccommodationPricing")] {
            let names: BTreeSet<String> = synthesis
                .entity_procedures(entity)
                .map(|p| p.name.clone())
                .collect();
            let keys: BTreeSet<String> = table.entity(key).unwrap().keys().cloned().collect();
            assert_eq!(names, keys);
        }
        assert!(validate_consistency(&synthesis).is_ok());
    }

    #[test]
    fn dropped_rule_is_detected() {
        let mut synthesis = synthesis_for(USER_SCHEMA, &GeneratorConfig::default());
        synthesis
            .rule_table
            .as_mut()
            .unwrap()
            .entities
            .get_mut("user")
            .unwrap()
            .remove("userCreate");

        let err = validate_consistency(&synthesis).unwrap_err();
        assert!(matches!(err, GeneratorError::ProcedureWithoutRule { .. }));
    }

    #[test]
    fn stray_rule_key_is_detected() {
        let mut synthesis = synthesis_for(USER_SCHEMA, &GeneratorConfig::default());
        synthesis
            .rule_table
            .as_mut()
            .unwrap()
            .entities
            .get_mut("user")
            .unwrap()
            .insert("userDrop".to_string(), Rule::Allow);

        let err = validate_consistency(&synthesis).unwrap_err();
        match err {
            GeneratorError::RuleWithoutProcedure { entity, key } => {
                assert_eq!(entity, "User");
                assert_eq!(key, "userDrop");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_entity_table_is_detected() {
        let mut synthesis = synthesis_for(USER_SCHEMA, &GeneratorConfig::default());
        synthesis.rule_table.as_mut().unwrap().entities.remove("user");

        let err = validate_consistency(&synthesis).unwrap_err();
        assert!(matches!(err, GeneratorError::ProcedureWithoutRule { .. }));
    }

    #[test]
    fn leading_case_collision_is_a_duplicate_export() {
        let json = r#"{ "models": [
            { "name": "User", "fields": [
                { "name": "id", "kind": "scalar", "type": "String", "isId": true }
            ] },
            { "name": "user", "fields": [
                { "name": "id", "kind": "scalar", "type": "String", "isId": true }
            ] }
        ] }"#;
        let synthesis = synthesis_for(json, &GeneratorConfig::default());
        let err = validate_consistency(&synthesis).unwrap_err();
        match err {
            GeneratorError::DuplicateExport { export, first, second } => {
                assert_eq!(export, "userApi");
                assert_eq!(first, "User");
                assert_eq!(second, "user");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_policy_skips_the_table_check() {
        let config = GeneratorConfig {
            custom_policy: Some(PathBuf::from("policy.ts")),
            ..GeneratorConfig::default()
        };
        let synthesis = synthesis_for(USER_SCHEMA, &config);
        assert!(synthesis.rule_table.is_none());
        assert!(validate_consistency(&synthesis).is_ok());
    }
}
