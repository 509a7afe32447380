//! Project scaffolding generation for Bun/TypeScript.

/// Generates package.json for the generated project.
pub fn generate_package_json(name: &str) -> String {
    format!(
        r#"{{
  "name": "{name}",
  "type": "module",
  "scripts": {{
    "dev": "bun run --hot src/index.ts",
    "start": "bun run src/index.ts",
    "test": "bun test",
    "typecheck": "tsc --noEmit"
  }},
  "devDependencies": {{
    "@types/bun": "latest",
    "typescript": "^5.0.0"
  }}
}}
"#
    )
}

/// Generates tsconfig.json for the project.
pub fn generate_tsconfig() -> &'static str {
    r#"{
  "compilerOptions": {
    "target": "ESNext",
    "module": "ESNext",
    "moduleResolution": "bundler",
    "strict": true,
    "skipLibCheck": true,
    "noEmit": true,
    "esModuleInterop": true,
    "allowSyntheticDefaultImports": true,
    "resolveJsonModule": true,
    "isolatedModules": true,
    "types": ["bun-types"]
  },
  "include": ["src/**/*", "tests/**/*"]
}
"#
}

/// Generates src/index.ts entry point.
///
/// The data client comes from the data-layer generator that runs before
/// kiln; the entry point only wires it into the router.
pub fn generate_index_ts(port: u16) -> String {
    format!(
        r#"import type {{ DataClient }} from './generated/runtime/client';
import {{ createRouter }} from './generated/router';

// Provided by the data-access layer generator.
import {{ createClient }} from './client';

const client: DataClient = createClient();
const router = createRouter({{ client }});

Bun.serve({{
  port: {port},
  fetch: router,
}});

console.log('API listening on http://localhost:{port}');
"#
    )
}

/// Generates the barrel re-export for the generated directory.
pub fn generate_generated_index(entities: &[&str]) -> String {
    use super::ts_types::to_snake_case;

    let mut code = String::new();
    code.push_str("// Generated by kiln. Do not edit.\n\n");
    code.push_str("export { createRouter, type RouterContext } from './router';\n");
    code.push_str("export { permissions } from './policy';\n");
    for entity in entities {
        code.push_str(&format!(
            "export {{ {} }} from './handlers/{}.handlers';\n",
            crate::synth::naming::bundle_export(entity),
            to_snake_case(entity)
        ));
    }
    code
}

/// Generates .gitignore for the project.
pub fn generate_gitignore() -> &'static str {
    r#"node_modules/
dist/
*.log
"#
}

/// Generates README.md for the project.
pub fn generate_readme(name: &str) -> String {
    format!(
        r#"# {name}

Generated by kiln from your data-model schema.

## Layout

- `src/generated/` - validators, handlers, router, policy. Regenerated on
  every run; do not edit.
- `src/client.ts` - the data-access client wiring (yours).
- `tests/` - test scaffolds, written once. Extend freely; kiln never
  overwrites an existing scaffold.

## Running

```sh
bun install
bun run dev
```
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_json_carries_the_project_name() {
        let pkg = generate_package_json("shop-api");
        assert!(pkg.contains("\"name\": \"shop-api\""));
        assert!(pkg.contains("bun test"));
    }

    #[test]
    fn index_wires_client_into_router() {
        let index = generate_index_ts(4000);
        assert!(index.contains("createRouter({ client })"));
        assert!(index.contains("port: 4000,"));
    }

    #[test]
    fn barrel_exports_router_policy_and_bundles() {
        let code = generate_generated_index(&["User", "AccommodationPricing"]);
        assert!(code.contains("export { createRouter, type RouterContext } from './router';"));
        assert!(code.contains("export { permissions } from './policy';"));
        assert!(code.contains("export { userApi } from './handlers/user.handlers';"));
        assert!(code.contains(
            "export { accommodationPricingApi } from './handlers/accommodation_pricing.handlers';"
        ));
    }
}
