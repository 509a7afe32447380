//! Test scaffolding generation.
//!
//! One bun:test file per entity, importing the handler bundle by the same
//! consistency-checked export identifier the router uses. The scaffold
//! asserts the bundle surface and the validation gate; domain assertions
//! are the application's to add.

use crate::synth::naming;
use crate::synth::procedure::ProcedureSpec;

use super::ts_types::to_snake_case;

/// Generates the test scaffold for one entity.
pub fn generate_test_scaffold(entity: &str, procedures: &[&ProcedureSpec]) -> String {
    let bundle = naming::bundle_export(entity);
    let snake_name = to_snake_case(entity);

    let mut code = String::new();

    code.push_str("// Generated by kiln as a starting point. Extend freely.\n\n");
    code.push_str("import { describe, expect, test } from 'bun:test';\n");
    code.push_str(&format!(
        "import {{ {bundle} }} from '../src/generated/handlers/{snake_name}.handlers';\n\n"
    ));

    // No handler may reach the client before validation passes, so an
    // empty client is safe for these cases.
    code.push_str("const ctx = { client: {} as never };\n\n");

    code.push_str(&format!("describe('{bundle}', () => {{\n"));

    code.push_str("  test('exports every generated procedure', () => {\n");
    for proc in procedures {
        code.push_str(&format!(
            "    expect(typeof {bundle}.{}).toBe('function');\n",
            proc.name
        ));
    }
    code.push_str("  });\n");

    for proc in procedures {
        code.push_str(&format!(
            "\n  test('{} rejects malformed input', async () => {{\n",
            proc.name
        ));
        code.push_str(&format!(
            "    const res = await {bundle}.{}(ctx, 42);\n",
            proc.name
        ));
        code.push_str("    expect(res.status).toBe(400);\n");
        code.push_str("  });\n");
    }

    code.push_str("});\n");

    code
}
