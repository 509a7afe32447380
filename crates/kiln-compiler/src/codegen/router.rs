//! Router code generation.
//!
//! Wires the synthesized route paths to the handler bundles, with the
//! policy check in front of every dispatch. Reads arrive as GET with a JSON
//! `input` query parameter; writes as POST with a JSON body.

use crate::ir::AccessClass;
use crate::synth::naming;
use crate::synth::procedure::ProcedureSpec;

use super::ts_types::to_snake_case;

/// Generates the router module.
pub fn generate_router(entities: &[&str], procedures: &[ProcedureSpec]) -> String {
    let mut code = String::new();

    code.push_str("// Generated by kiln. Do not edit.\n\n");
    code.push_str("import type { DataClient } from './runtime/client';\n");
    code.push_str("import { resolveCaller, type CallerIdentity, type IdentityResolver } from './runtime/context';\n");
    code.push_str("import { apiError } from './runtime/errors';\n");
    code.push_str("import { permissions } from './policy';\n");

    for entity in entities {
        code.push_str(&format!(
            "import {{ {} }} from './handlers/{}.handlers';\n",
            naming::bundle_export(entity),
            to_snake_case(entity)
        ));
    }

    code.push_str("\nexport type RouterContext = {\n");
    code.push_str("  client: DataClient;\n");
    code.push_str("  resolveIdentity?: IdentityResolver;\n");
    code.push_str("};\n\n");

    code.push_str("const json = { 'Content-Type': 'application/json' };\n\n");

    code.push_str("export function createRouter(ctx: RouterContext) {\n");
    code.push_str("  const resolve = ctx.resolveIdentity ?? resolveCaller;\n");
    code.push_str("  const handlerCtx = { client: ctx.client };\n\n");
    code.push_str("  return async (req: Request): Promise<Response> => {\n");
    code.push_str("    const url = new URL(req.url);\n");
    code.push_str("    const path = url.pathname;\n");
    code.push_str("    const method = req.method;\n");
    code.push_str("    const caller: CallerIdentity | null = resolve(req);\n\n");

    // Rule enforcement mirrors the generator's secure-by-default stance:
    // anything that isn't an explicit allow or a satisfied authenticated
    // check refuses the request.
    code.push_str("    const checkRule = (rule: string | undefined): Response | null => {\n");
    code.push_str("      if (rule === 'allow') return null;\n");
    code.push_str("      if (rule === 'authenticated') {\n");
    code.push_str("        if (caller) return null;\n");
    code.push_str("        return new Response(JSON.stringify({ error: 'Unauthorized' }), { status: 401, headers: json });\n");
    code.push_str("      }\n");
    code.push_str("      return new Response(JSON.stringify({ error: 'Forbidden' }), { status: 403, headers: json });\n");
    code.push_str("    };\n\n");

    code.push_str("    const readInput = (): unknown => {\n");
    code.push_str("      const raw = url.searchParams.get('input');\n");
    code.push_str("      if (raw === null) return {};\n");
    code.push_str("      try {\n");
    code.push_str("        return JSON.parse(raw);\n");
    code.push_str("      } catch {\n");
    code.push_str("        return undefined;\n");
    code.push_str("      }\n");
    code.push_str("    };\n\n");

    code.push_str("    try {\n");

    let mut current_entity = "";
    for proc in procedures {
        if proc.entity != current_entity {
            current_entity = &proc.entity;
            code.push_str(&format!("      // {current_entity} routes\n"));
        }
        code.push_str(&generate_route(proc));
    }

    code.push_str("      return new Response(JSON.stringify({ error: 'Not Found' }), { status: 404, headers: json });\n");
    code.push_str("    } catch (err) {\n");
    code.push_str("      console.error('Router error:', err);\n");
    code.push_str("      return apiError('internal_error', 'unexpected error');\n");
    code.push_str("    }\n");
    code.push_str("  };\n");
    code.push_str("}\n");

    code
}

fn generate_route(proc: &ProcedureSpec) -> String {
    let entity_key = naming::entity_key(&proc.entity);
    let bundle = naming::bundle_export(&proc.entity);
    let name = &proc.name;
    let path = &proc.route_path;

    let http_method = match proc.classification {
        AccessClass::Read => "GET",
        AccessClass::Write => "POST",
    };

    let mut code = String::new();
    code.push_str(&format!(
        "      if (method === '{http_method}' && path === '{path}') {{\n"
    ));
    code.push_str(&format!(
        "        const denied = checkRule(permissions['{entity_key}']?.['{name}']);\n"
    ));
    code.push_str("        if (denied) return denied;\n");

    match proc.classification {
        AccessClass::Read => {
            code.push_str("        const input = readInput();\n");
            code.push_str("        if (input === undefined) return apiError('bad_request', 'input must be JSON');\n");
        }
        AccessClass::Write => {
            code.push_str("        const input = await req.json().catch(() => undefined);\n");
            code.push_str("        if (input === undefined) return apiError('bad_request', 'body must be JSON');\n");
        }
    }

    code.push_str(&format!(
        "        return {bundle}.{name}(handlerCtx, input);\n"
    ));
    code.push_str("      }\n");
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::frontend::json::ast::RawDocument;
    use crate::frontend::json::normalize;
    use crate::frontend::json::parser::ParsedDocument;
    use crate::synth::{plan, synthesize, Synthesis};
    use std::path::PathBuf;

    fn synthesis() -> Synthesis {
        let document: RawDocument = serde_json::from_str(
            r#"{ "models": [
                { "name": "User", "fields": [
                    { "name": "id", "kind": "scalar", "type": "String", "isId": true }
                ] },
                { "name": "Post", "fields": [
                    { "name": "id", "kind": "scalar", "type": "String", "isId": true }
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
        let config = GeneratorConfig::default();
        let plans = plan::resolve_all(&schema, &config);
        synthesize(&schema, &plans, &config).unwrap()
    }

    #[test]
    fn imports_every_bundle_by_its_export_name() {
        let code = generate_router(&["User", "Post"], &synthesis().procedures);
        assert!(code.contains("import { userApi } from './handlers/user.handlers';"));
        assert!(code.contains("import { postApi } from './handlers/post.handlers';"));
    }

    #[test]
    fn reads_are_get_and_writes_are_post() {
        let code = generate_router(&["User", "Post"], &synthesis().procedures);
        assert!(code.contains("if (method === 'GET' && path === '/user/find-many') {"));
        assert!(code.contains("if (method === 'POST' && path === '/user/create') {"));
        assert!(code.contains("if (method === 'POST' && path === '/post/delete-many') {"));
        assert!(code.contains("if (method === 'GET' && path === '/post/group-by') {"));
    }

    #[test]
    fn every_dispatch_is_guarded_by_its_own_rule_key() {
        let synthesis = synthesis();
        let code = generate_router(&["User", "Post"], &synthesis.procedures);
        for proc in &synthesis.procedures {
            let key = naming::entity_key(&proc.entity);
            assert!(
                code.contains(&format!(
                    "checkRule(permissions['{key}']?.['{}'])",
                    proc.name
                )),
                "missing rule check for {}",
                proc.name
            );
        }
    }

    #[test]
    fn unrecognized_rules_are_refused_at_runtime_too() {
        let code = generate_router(&["User"], &synthesis().procedures);
        // The fallthrough (deny and anything unrecognized) is a 403.
        assert!(code.contains("if (rule === 'allow') return null;"));
        assert!(code.contains("status: 403"));
    }

    #[test]
    fn dispatch_uses_the_bundle_dot_procedure_form() {
        let code = generate_router(&["User"], &synthesis().procedures);
        assert!(code.contains("return userApi.userFindById(handlerCtx, input);"));
        assert!(code.contains("return userApi.userCreate(handlerCtx, input);"));
    }
}
