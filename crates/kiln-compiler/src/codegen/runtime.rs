//! Runtime TypeScript modules.
//!
//! Static modules are written in TypeScript in the `runtime/` directory and
//! embedded into the compiler binary using `include_str!`. The error
//! taxonomy module is generated instead - it is derived from the same table
//! the core uses (`synth::taxonomy::MAPPING`), so the Rust mapping and the
//! emitted runtime can never drift apart.

use crate::synth::taxonomy::{ApiErrorKind, MAPPING};

/// Abstract data client surface.
pub const CLIENT: &str = include_str!("../../runtime/client.ts");
/// Success envelope helper.
pub const ENVELOPE: &str = include_str!("../../runtime/envelope.ts");
/// Caller identity resolution.
pub const CONTEXT: &str = include_str!("../../runtime/context.ts");

/// Returns the static runtime modules as (filename, content) pairs.
pub fn static_modules() -> Vec<(&'static str, &'static str)> {
    vec![
        ("src/generated/runtime/client.ts", CLIENT),
        ("src/generated/runtime/envelope.ts", ENVELOPE),
        ("src/generated/runtime/context.ts", CONTEXT),
    ]
}

/// Generates the runtime error-taxonomy module from the core mapping table.
pub fn generate_errors_module() -> String {
    let mut code = String::new();

    code.push_str("// Generated by kiln. Do not edit.\n");
    code.push_str("//\n");
    code.push_str("// Store error signals map into exactly four API error kinds; anything\n");
    code.push_str("// unrecognized coerces to internal_error. The original store error never\n");
    code.push_str("// crosses this boundary.\n\n");
    code.push_str("import { StoreError } from './client';\n\n");

    code.push_str("export type ApiErrorKind = 'conflict' | 'not_found' | 'bad_request' | 'internal_error';\n\n");

    code.push_str("const STORE_ERROR_KINDS: Record<string, ApiErrorKind> = {\n");
    for (signal, kind) in MAPPING {
        code.push_str(&format!("  {}: '{}',\n", signal.code(), kind.as_str()));
    }
    code.push_str("};\n\n");

    code.push_str("const STATUS: Record<ApiErrorKind, number> = {\n");
    for kind in [
        ApiErrorKind::Conflict,
        ApiErrorKind::NotFound,
        ApiErrorKind::BadRequest,
        ApiErrorKind::InternalError,
    ] {
        code.push_str(&format!("  {}: {},\n", kind.as_str(), kind.http_status()));
    }
    code.push_str("};\n\n");

    code.push_str("export function mapStoreError(code: string): ApiErrorKind {\n");
    code.push_str("  return STORE_ERROR_KINDS[code] ?? 'internal_error';\n");
    code.push_str("}\n\n");

    code.push_str("export function apiError(kind: ApiErrorKind, message: string): Response {\n");
    code.push_str("  return new Response(JSON.stringify({ error: { kind, message } }), {\n");
    code.push_str("    status: STATUS[kind],\n");
    code.push_str("    headers: { 'Content-Type': 'application/json' },\n");
    code.push_str("  });\n");
    code.push_str("}\n\n");

    code.push_str("export function storeErrorResponse(err: unknown): Response {\n");
    code.push_str("  if (err instanceof StoreError) {\n");
    code.push_str("    const kind = mapStoreError(err.code);\n");
    code.push_str("    return apiError(kind, kind === 'internal_error' ? 'unexpected error' : err.message);\n");
    code.push_str("  }\n");
    code.push_str("  return apiError('internal_error', 'unexpected error');\n");
    code.push_str("}\n");

    code
}
