//! Policy artifact emission.
//!
//! Either the synthesized rule table rendered as a `permissions` object, or
//! a re-export of the external custom policy module. The router always
//! imports `./policy`, so the two sources are interchangeable at the import
//! site.

use crate::ir::RuleTable;

/// Generates `policy.ts` from the synthesized rule table.
pub fn generate_policy(table: &RuleTable) -> String {
    let mut code = String::new();

    code.push_str("// Generated by kiln. Do not edit.\n\n");
    code.push_str("export const permissions: Record<string, Record<string, string>> = {\n");
    for (entity_key, rules) in &table.entities {
        code.push_str(&format!("  {entity_key}: {{\n"));
        for (name, rule) in rules {
            code.push_str(&format!("    {name}: '{}',\n", rule.as_str()));
        }
        code.push_str("  },\n");
    }
    code.push_str("};\n");

    code
}

/// Generates `policy.ts` as a re-export of the custom policy module.
///
/// The external contract: the module must export a single named
/// `permissions` object. Its content is not ours to validate.
pub fn generate_custom_policy(import_path: &str) -> String {
    let mut code = String::new();
    code.push_str("// Generated by kiln. Do not edit.\n");
    code.push_str("//\n");
    code.push_str("// Custom policy source: rules are owned by the module below, which must\n");
    code.push_str("// export a named 'permissions' object.\n\n");
    code.push_str(&format!("export {{ permissions }} from '{import_path}';\n"));
    code
}
