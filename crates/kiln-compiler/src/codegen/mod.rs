//! TypeScript code generation from synthesized data.
//!
//! Strictly the second stage of the two-stage pipeline: synthesis produces
//! procedure specifications and the rule table as pure data, and this
//! module renders that data into source text. Nothing here makes a naming,
//! policy or shaping decision - if a choice matters, it was made upstream
//! and lives on a `ProcedureSpec` or in the `RuleTable`.

pub mod handlers;
pub mod policy;
pub mod project;
pub mod router;
pub mod runtime;
pub mod test_scaffold;
pub mod ts_types;
pub mod validators;

use crate::config::GeneratorConfig;
use crate::diagnostic::GeneratorError;
use crate::ir::SchemaIR;
use crate::synth::{OperationPlan, Synthesis};

use ts_types::to_snake_case;

/// Generated TypeScript code.
pub struct GeneratedCode {
    /// Map of output-relative filename to content.
    pub files: Vec<(String, String)>,
}

/// Generates all module files from the synthesized run.
///
/// `policy_import` is the resolved module path for a custom policy source;
/// `None` means the rule table is rendered instead.
pub fn generate(
    schema: &SchemaIR,
    plans: &[OperationPlan],
    synthesis: &Synthesis,
    config: &GeneratorConfig,
    policy_import: Option<&str>,
) -> Result<GeneratedCode, GeneratorError> {
    let mut files = Vec::new();

    let entities: Vec<&str> = schema.entities.iter().map(|e| e.name.as_str()).collect();

    for (entity, plan) in schema.entities.iter().zip(plans) {
        let procs: Vec<_> = synthesis.entity_procedures(&entity.name).collect();
        let snake_name = to_snake_case(&entity.name);

        files.push((
            format!("src/generated/validators/{snake_name}.validator.ts"),
            validators::generate_validators(entity, &procs, &plan.eligibility),
        ));

        files.push((
            format!("src/generated/handlers/{snake_name}.handlers.ts"),
            handlers::generate_handlers(&entity.name, &procs),
        ));

        files.push((
            format!("tests/{snake_name}.api.test.ts"),
            test_scaffold::generate_test_scaffold(&entity.name, &procs),
        ));
    }

    files.push((
        "src/generated/router.ts".to_string(),
        router::generate_router(&entities, &synthesis.procedures),
    ));

    let policy_code = match (&synthesis.rule_table, policy_import) {
        (_, Some(import_path)) => policy::generate_custom_policy(import_path),
        (Some(table), None) => policy::generate_policy(table),
        // Synthesis guarantees one of the two exists.
        (None, None) => {
            return Err(GeneratorError::CustomPolicyNotFound {
                path: config.custom_policy.clone().unwrap_or_default(),
            })
        }
    };
    files.push(("src/generated/policy.ts".to_string(), policy_code));

    files.push((
        "src/generated/runtime/errors.ts".to_string(),
        runtime::generate_errors_module(),
    ));
    for (filename, content) in runtime::static_modules() {
        files.push((filename.to_string(), content.to_string()));
    }

    files.push((
        "src/generated/index.ts".to_string(),
        project::generate_generated_index(&entities),
    ));

    Ok(GeneratedCode { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::json::ast::RawDocument;
    use crate::frontend::json::normalize;
    use crate::frontend::json::parser::ParsedDocument;
    use crate::synth::{plan, synthesize};
    use std::path::PathBuf;

    fn generate_all(config: &GeneratorConfig, policy_import: Option<&str>) -> GeneratedCode {
        let document: RawDocument = serde_json::from_str(
            r#"{ "models": [
                { "name": "User", "fields": [
                    { "name": "id", "kind": "scalar", "type": "String", "isId": true },
                    { "name": "email", "kind": "scalar", "type": "String", "isUnique": true }
                ] },
                { "name": "Post", "fields": [
                    { "name": "id", "kind": "scalar", "type": "String", "isId": true },
                    { "name": "deletedAt", "kind": "scalar", "type": "DateTime", "isRequired": false }
                ] }
            ] }"#,
        )
        .unwrap();
        let schema = normalize::normalize(
            vec![ParsedDocument {
                path: PathBuf::from("schema.json"),
                document,
            }],
            PathBuf::new(),
        )
        .unwrap();
        let plans = plan::resolve_all(&schema, config);
        let synthesis = synthesize(&schema, &plans, config).unwrap();
        generate(&schema, &plans, &synthesis, config, policy_import).unwrap()
    }

    fn file<'a>(generated: &'a GeneratedCode, name: &str) -> &'a str {
        &generated
            .files
            .iter()
            .find(|(f, _)| f == name)
            .unwrap_or_else(|| panic!("missing file {name}"))
            .1
    }

    #[test]
    fn emits_the_full_module_set() {
        let generated = generate_all(&GeneratorConfig::default(), None);
        let names: Vec<&str> = generated.files.iter().map(|(f, _)| f.as_str()).collect();

        for expected in [
            "src/generated/validators/user.validator.ts",
            "src/generated/validators/post.validator.ts",
            "src/generated/handlers/user.handlers.ts",
            "src/generated/handlers/post.handlers.ts",
            "src/generated/router.ts",
            "src/generated/policy.ts",
            "src/generated/runtime/errors.ts",
            "src/generated/runtime/client.ts",
            "src/generated/runtime/envelope.ts",
            "src/generated/runtime/context.ts",
            "src/generated/index.ts",
            "tests/user.api.test.ts",
            "tests/post.api.test.ts",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn artifacts_agree_on_the_bundle_identifier() {
        let generated = generate_all(&GeneratorConfig::default(), None);

        let handlers = file(&generated, "src/generated/handlers/user.handlers.ts");
        let router = file(&generated, "src/generated/router.ts");
        let scaffold = file(&generated, "tests/user.api.test.ts");

        assert!(handlers.contains("export const userApi = {"));
        assert!(router.contains("import { userApi } from './handlers/user.handlers';"));
        assert!(scaffold.contains("import { userApi } from '../src/generated/handlers/user.handlers';"));
    }

    #[test]
    fn policy_artifact_contains_exactly_the_rule_table() {
        let generated = generate_all(&GeneratorConfig::default(), None);
        let policy = file(&generated, "src/generated/policy.ts");

        assert!(policy.contains("  user: {"));
        assert!(policy.contains("  post: {"));
        assert!(policy.contains("    userCreate: 'authenticated',"));
        assert!(policy.contains("    postGroupBy: 'authenticated',"));
    }

    #[test]
    fn custom_policy_swaps_the_artifact_for_a_re_export() {
        let config = GeneratorConfig {
            custom_policy: Some(PathBuf::from("policy/permissions.ts")),
            ..GeneratorConfig::default()
        };
        let generated = generate_all(&config, Some("../../policy/permissions"));
        let policy = file(&generated, "src/generated/policy.ts");

        assert!(policy.contains("export { permissions } from '../../policy/permissions';"));
        assert!(!policy.contains("export const permissions"));
    }

    #[test]
    fn generation_is_byte_identical_across_runs() {
        let config = GeneratorConfig::default();
        let a = generate_all(&config, None);
        let b = generate_all(&config, None);

        assert_eq!(a.files.len(), b.files.len());
        for ((name_a, content_a), (name_b, content_b)) in a.files.iter().zip(&b.files) {
            assert_eq!(name_a, name_b);
            assert_eq!(content_a, content_b, "{name_a} differs between runs");
        }
    }
}
