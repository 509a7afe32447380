//! Handler code generation.
//!
//! One handler module per entity, one exported async function per
//! synthesized procedure. Every decision here - method, rewrites, not-found
//! policy, response shaping - was already made by the synthesizer; this
//! module only renders the `ProcedureSpec` into TypeScript and emits the
//! bundle export the router and test scaffolds import.

use crate::ir::OperationKind;
use crate::synth::naming;
use crate::synth::procedure::{NotFoundPolicy, ProcedureSpec};

use super::ts_types::to_snake_case;

/// Generates the handler module for one entity.
pub fn generate_handlers(entity: &str, procedures: &[&ProcedureSpec]) -> String {
    let snake_name = to_snake_case(entity);
    let entity_key = naming::entity_key(entity);
    // The envelope toggle is carried per procedure; within a run it is
    // uniform, so the module-level success helper can follow it.
    let envelope = procedures.iter().any(|p| p.envelope);

    let mut code = String::new();

    code.push_str("// Generated by kiln. Do not edit.\n\n");
    code.push_str("import type { DataClient } from '../runtime/client';\n");
    code.push_str("import { apiError, storeErrorResponse } from '../runtime/errors';\n");
    if envelope {
        code.push_str("import { envelope } from '../runtime/envelope';\n");
    }

    let validator_imports: Vec<String> = procedures
        .iter()
        .map(|p| naming::validator_name(entity, p.kind))
        .collect();
    code.push_str(&format!(
        "import {{ {} }} from '../validators/{}.validator';\n",
        validator_imports.join(", "),
        snake_name
    ));

    code.push_str("\nexport type HandlerContext = {\n");
    code.push_str("  client: DataClient;\n");
    code.push_str("};\n\n");

    // Success shaping helper, shared by every handler in the module.
    if envelope {
        code.push_str("const ok = (operation: string, payload: unknown): Response =>\n");
        code.push_str("  new Response(JSON.stringify(envelope(operation, payload)), {\n");
    } else {
        code.push_str("const ok = (_operation: string, payload: unknown): Response =>\n");
        code.push_str("  new Response(JSON.stringify(payload), {\n");
    }
    code.push_str("    status: 200,\n");
    code.push_str("    headers: { 'Content-Type': 'application/json' },\n");
    code.push_str("  });\n");

    for proc in procedures {
        code.push_str(&generate_handler(entity, &entity_key, proc));
    }

    // The consistency-checked bundle export.
    code.push_str(&format!("\nexport const {} = {{\n", naming::bundle_export(entity)));
    for proc in procedures {
        code.push_str(&format!("  {},\n", proc.name));
    }
    code.push_str("};\n");

    code
}

fn generate_handler(entity: &str, entity_key: &str, proc: &ProcedureSpec) -> String {
    let name = &proc.name;
    let validator = naming::validator_name(entity, proc.kind);
    let method = proc.call.method;

    let mut code = format!(
        "\nexport async function {name}(ctx: HandlerContext, input: unknown): Promise<Response> {{\n"
    );

    code.push_str(&format!("  const validation = {validator}(input);\n"));
    code.push_str("  if (!validation.ok) {\n");
    code.push_str(&format!(
        "    return apiError('bad_request', 'invalid input for {name}');\n"
    ));
    code.push_str("  }\n");
    code.push_str(
        "  const args = { ...(validation.value as Record<string, unknown>) };\n",
    );

    // Soft-delete filter injection: marker is null unless the caller
    // addressed it explicitly.
    if let Some(marker) = &proc.call.marker_filter {
        code.push_str(
            "  const where = { ...((args.where as Record<string, unknown> | undefined) ?? {}) };\n",
        );
        code.push_str(&format!("  if (!('{marker}' in where)) {{\n"));
        code.push_str(&format!("    where.{marker} = null;\n"));
        code.push_str("  }\n");
        code.push_str("  args.where = where;\n");
    }

    // Soft-delete write rewrite: the call became an update that stamps the
    // marker instead of a physical delete.
    if let Some(marker) = &proc.call.marker_write {
        code.push_str(&format!(
            "  args.data = {{ {marker}: new Date().toISOString() }};\n"
        ));
    }

    // Group-by determinism defaults.
    if let Some(id_field) = &proc.call.default_by {
        code.push_str("  if (!Array.isArray(args.by) || (args.by as unknown[]).length === 0) {\n");
        code.push_str(&format!("    args.by = ['{id_field}'];\n"));
        code.push_str("  }\n");
    }
    if let Some(id_field) = &proc.call.default_order {
        code.push_str(
            "  if ((args.take !== undefined || args.skip !== undefined) && args.orderBy === undefined) {\n",
        );
        code.push_str(&format!("    args.orderBy = [{{ {id_field}: 'asc' }}];\n"));
        code.push_str("  }\n");
    }

    // An aggregate that selects nothing is rejected by the data layer;
    // default to a count.
    if proc.call.count_fallback {
        code.push_str(
            "  if (args._count === undefined && args._sum === undefined && args._avg === undefined && args._min === undefined && args._max === undefined) {\n",
        );
        code.push_str("    args._count = { _all: true };\n");
        code.push_str("  }\n");
    }

    code.push_str("  try {\n");
    code.push_str(&format!(
        "    const result = await ctx.client.{entity_key}.{method}(args);\n"
    ));

    if proc.not_found == NotFoundPolicy::Throw {
        if let Some(marker) = proc.marker_not_found_check() {
            code.push_str(&format!(
                "    if (result === null || result === undefined || (result as Record<string, unknown>).{marker} != null) {{\n"
            ));
        } else {
            code.push_str("    if (result === null || result === undefined) {\n");
        }
        code.push_str(&format!(
            "      return apiError('not_found', '{entity} not found');\n"
        ));
        code.push_str("    }\n");
    }

    // Count-shaped wrapping: the bare count becomes { count: N } to match
    // the naturally count-shaped bulk-write results.
    if proc.kind == OperationKind::Count {
        code.push_str(&format!(
            "    return ok('{name}', {{ count: result }});\n"
        ));
    } else {
        code.push_str(&format!("    return ok('{name}', result);\n"));
    }

    code.push_str("  } catch (err) {\n");
    code.push_str("    return storeErrorResponse(err);\n");
    code.push_str("  }\n");
    code.push_str("}\n");

    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::{Entity, Field, FieldKind, TypeTag};
    use crate::synth::{plan, procedure};

    fn scalar(name: &str, tag: TypeTag, id: bool) -> Field {
        Field {
            name: name.to_string(),
            kind: FieldKind::Scalar,
            type_tag: Some(tag),
            type_name: String::new(),
            optional: false,
            read_only: false,
            list: false,
            unique: false,
            id,
            generated: false,
            updated_at: false,
            relation: None,
        }
    }

    fn post_with_marker() -> Entity {
        Entity {
            name: "Post".to_string(),
            fields: vec![
                scalar("id", TypeTag::Text, true),
                scalar("title", TypeTag::Text, false),
                scalar("deletedAt", TypeTag::Timestamp, false),
            ],
            unique_field_sets: vec![],
            unique_indexes: vec![],
            primary_key: None,
        }
    }

    fn user() -> Entity {
        Entity {
            name: "User".to_string(),
            fields: vec![scalar("id", TypeTag::Text, true)],
            unique_field_sets: vec![],
            unique_indexes: vec![],
            primary_key: None,
        }
    }

    fn generate(entity: &Entity, config: &GeneratorConfig) -> String {
        let plan = plan::resolve(entity, config);
        let procs = procedure::synthesize_entity(entity, &plan, config).unwrap();
        let refs: Vec<&ProcedureSpec> = procs.iter().collect();
        generate_handlers(&entity.name, &refs)
    }

    #[test]
    fn soft_delete_find_many_injects_the_marker_filter() {
        let code = generate(&post_with_marker(), &GeneratorConfig::default());
        assert!(code.contains("export async function postFindMany("));
        assert!(code.contains("if (!('deletedAt' in where)) {"));
        assert!(code.contains("where.deletedAt = null;"));
    }

    #[test]
    fn soft_delete_rewrites_delete_into_update() {
        let code = generate(&post_with_marker(), &GeneratorConfig::default());
        // The delete handler stamps the marker and calls update, never delete.
        let delete_handler = code
            .split("export async function postDelete(")
            .nth(1)
            .unwrap()
            .split("export async function")
            .next()
            .unwrap();
        assert!(delete_handler.contains("args.data = { deletedAt: new Date().toISOString() };"));
        assert!(delete_handler.contains("ctx.client.post.update(args);"));
        assert!(!delete_handler.contains("ctx.client.post.delete(args);"));
    }

    #[test]
    fn physical_delete_without_marker() {
        let code = generate(&user(), &GeneratorConfig::default());
        assert!(code.contains("ctx.client.user.delete(args);"));
        assert!(!code.contains("new Date().toISOString()"));
    }

    #[test]
    fn find_by_id_treats_marked_rows_as_not_found() {
        let code = generate(&post_with_marker(), &GeneratorConfig::default());
        assert!(code.contains("(result as Record<string, unknown>).deletedAt != null"));
        assert!(code.contains("apiError('not_found', 'Post not found');"));
        assert!(code.contains("ctx.client.post.findUnique(args);"));
    }

    #[test]
    fn group_by_defaults_are_emitted() {
        let code = generate(&user(), &GeneratorConfig::default());
        assert!(code.contains("args.by = ['id'];"));
        assert!(code.contains("args.orderBy = [{ id: 'asc' }];"));
    }

    #[test]
    fn aggregate_count_fallback_is_emitted() {
        let code = generate(&user(), &GeneratorConfig::default());
        assert!(code.contains("args._count = { _all: true };"));
    }

    #[test]
    fn count_result_is_wrapped() {
        let code = generate(&user(), &GeneratorConfig::default());
        assert!(code.contains("return ok('userCount', { count: result });"));
    }

    #[test]
    fn bundle_export_lists_every_procedure() {
        let config = GeneratorConfig::default();
        let entity = user();
        let plan = plan::resolve(&entity, &config);
        let procs = procedure::synthesize_entity(&entity, &plan, &config).unwrap();
        let refs: Vec<&ProcedureSpec> = procs.iter().collect();
        let code = generate_handlers(&entity.name, &refs);

        assert!(code.contains("export const userApi = {"));
        for proc in &procs {
            assert!(code.contains(&format!("  {},\n", proc.name)), "{} missing", proc.name);
        }
    }

    #[test]
    fn envelope_toggle_changes_success_shaping() {
        let with = generate(
            &user(),
            &GeneratorConfig {
                envelope: true,
                ..GeneratorConfig::default()
            },
        );
        assert!(with.contains("import { envelope } from '../runtime/envelope';"));
        assert!(with.contains("JSON.stringify(envelope(operation, payload))"));

        let without = generate(&user(), &GeneratorConfig::default());
        assert!(!without.contains("import { envelope }"));
        assert!(without.contains("JSON.stringify(payload)"));
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let code = generate(&user(), &GeneratorConfig::default());
        assert!(code.contains("return apiError('bad_request', 'invalid input for userCreate');"));
    }
}
