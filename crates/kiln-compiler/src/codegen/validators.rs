//! Runtime input-validator generation.
//!
//! One validator module per entity: an input type and a `validate*` function
//! for every synthesized procedure. Aggregation eligibility decides which
//! sub-fields the aggregate/group-by contracts accept - the allowed-field
//! arrays emitted here come straight from the policy resolver's decisions.

use crate::ir::{Entity, Field, FieldKind, OperationKind, TypeTag};
use crate::synth::eligibility::AggregateEligibility;
use crate::synth::naming;
use crate::synth::ProcedureSpec;

use super::ts_types::field_ts_type;

/// Generates the validator module for one entity.
pub fn generate_validators(
    entity: &Entity,
    procedures: &[&ProcedureSpec],
    eligibility: &AggregateEligibility,
) -> String {
    let mut code = String::new();

    code.push_str("// Generated by kiln. Do not edit.\n\n");

    code.push_str("export type ValidationError = { field: string; message: string };\n\n");
    code.push_str("export type ValidationResult<T> =\n");
    code.push_str("  | { ok: true; value: T }\n");
    code.push_str("  | { ok: false; errors: ValidationError[] };\n\n");

    code.push_str(&emit_helpers());
    code.push_str(&emit_field_lists(entity, eligibility));
    code.push_str(&emit_data_types(entity));

    for proc in procedures {
        code.push_str(&emit_input_type(entity, proc));
        code.push('\n');
        code.push_str(&emit_validator(entity, proc));
        code.push('\n');
    }

    code
}

/// Shared runtime check helpers, emitted once per module.
fn emit_helpers() -> String {
    let mut code = String::new();

    code.push_str("const typeOk = (value: unknown, expected: string): boolean => {\n");
    code.push_str("  if (expected === 'unknown') return true;\n");
    code.push_str("  if (typeof value !== expected) return false;\n");
    code.push_str("  return !(expected === 'number' && Number.isNaN(value as number));\n");
    code.push_str("};\n\n");

    code.push_str("const checkScalar = (\n");
    code.push_str("  errors: ValidationError[],\n");
    code.push_str("  obj: Record<string, unknown>,\n");
    code.push_str("  field: string,\n");
    code.push_str("  expected: string,\n");
    code.push_str("  list: boolean,\n");
    code.push_str("  required: boolean,\n");
    code.push_str("): void => {\n");
    code.push_str("  const value = obj[field];\n");
    code.push_str("  if (value === undefined || value === null) {\n");
    code.push_str("    if (required) errors.push({ field, message: 'Required' });\n");
    code.push_str("    return;\n");
    code.push_str("  }\n");
    code.push_str("  if (list) {\n");
    code.push_str("    if (!Array.isArray(value)) {\n");
    code.push_str("      errors.push({ field, message: 'Expected array' });\n");
    code.push_str("      return;\n");
    code.push_str("    }\n");
    code.push_str("    for (const item of value) {\n");
    code.push_str("      if (!typeOk(item, expected)) {\n");
    code.push_str("        errors.push({ field, message: `Expected ${expected}[]` });\n");
    code.push_str("        return;\n");
    code.push_str("      }\n");
    code.push_str("    }\n");
    code.push_str("  } else if (!typeOk(value, expected)) {\n");
    code.push_str("    errors.push({ field, message: `Expected ${expected}` });\n");
    code.push_str("  }\n");
    code.push_str("};\n\n");

    code.push_str("const checkObject = (\n");
    code.push_str("  errors: ValidationError[],\n");
    code.push_str("  value: unknown,\n");
    code.push_str("  field: string,\n");
    code.push_str("  required: boolean,\n");
    code.push_str("): value is Record<string, unknown> => {\n");
    code.push_str("  if (value === undefined || value === null) {\n");
    code.push_str("    if (required) errors.push({ field, message: 'Required' });\n");
    code.push_str("    return false;\n");
    code.push_str("  }\n");
    code.push_str("  if (typeof value !== 'object' || Array.isArray(value)) {\n");
    code.push_str("    errors.push({ field, message: 'Expected object' });\n");
    code.push_str("    return false;\n");
    code.push_str("  }\n");
    code.push_str("  return true;\n");
    code.push_str("};\n\n");

    code.push_str("const checkSelection = (\n");
    code.push_str("  errors: ValidationError[],\n");
    code.push_str("  value: unknown,\n");
    code.push_str("  field: string,\n");
    code.push_str("  allowed: readonly string[],\n");
    code.push_str("): void => {\n");
    code.push_str("  if (value === undefined) return;\n");
    code.push_str("  if (!checkObject(errors, value, field, false)) return;\n");
    code.push_str("  for (const key of Object.keys(value as Record<string, unknown>)) {\n");
    code.push_str("    if (field === '_count' && key === '_all') continue;\n");
    code.push_str("    if (!allowed.includes(key)) {\n");
    code.push_str("      errors.push({ field, message: `Field '${key}' is not eligible for ${field}` });\n");
    code.push_str("    }\n");
    code.push_str("  }\n");
    code.push_str("};\n\n");

    code
}

/// Eligibility and grouping field lists, as module constants.
fn emit_field_lists(entity: &Entity, eligibility: &AggregateEligibility) -> String {
    let upper = entity.name.to_uppercase();
    let scalars: Vec<String> = entity.scalar_fields().map(|f| f.name.clone()).collect();

    let quoted = |names: &[String]| -> String {
        names
            .iter()
            .map(|n| format!("'{n}'"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut code = String::new();
    code.push_str(&format!(
        "const {upper}_GROUP_FIELDS: readonly string[] = [{}];\n",
        quoted(&scalars)
    ));
    code.push_str(&format!(
        "const {upper}_COUNT_FIELDS: readonly string[] = [{}];\n",
        quoted(&scalars)
    ));
    code.push_str(&format!(
        "const {upper}_SUM_FIELDS: readonly string[] = [{}];\n",
        quoted(&eligibility.sum)
    ));
    code.push_str(&format!(
        "const {upper}_AVG_FIELDS: readonly string[] = [{}];\n",
        quoted(&eligibility.avg)
    ));
    code.push_str(&format!(
        "const {upper}_MIN_FIELDS: readonly string[] = [{}];\n",
        quoted(&eligibility.min)
    ));
    code.push_str(&format!(
        "const {upper}_MAX_FIELDS: readonly string[] = [{}];\n\n",
        quoted(&eligibility.max)
    ));
    code
}

/// Fields a caller may supply in create/update data.
fn writable_fields(entity: &Entity) -> Vec<&Field> {
    entity
        .fields
        .iter()
        .filter(|f| {
            matches!(f.kind, FieldKind::Scalar | FieldKind::Enum)
                && !f.read_only
                && !f.generated
                && !f.updated_at
        })
        .collect()
}

fn emit_data_types(entity: &Entity) -> String {
    let name = &entity.name;
    let mut code = String::new();

    code.push_str(&format!("export type {name}CreateData = {{\n"));
    for field in writable_fields(entity) {
        let marker = if field.optional { "?" } else { "" };
        code.push_str(&format!(
            "  {}{}: {};\n",
            field.name,
            marker,
            field_ts_type(field)
        ));
    }
    code.push_str("};\n\n");

    code.push_str(&format!("export type {name}UpdateData = {{\n"));
    for field in writable_fields(entity) {
        code.push_str(&format!(
            "  {}?: {};\n",
            field.name,
            field_ts_type(field)
        ));
    }
    code.push_str("};\n\n");

    code
}

fn emit_input_type(entity: &Entity, proc: &ProcedureSpec) -> String {
    let name = &entity.name;
    let type_name = &proc.input_type;
    const OPTIONAL_WHERE: &str = "where?: Record<string, unknown>;";
    const SELECTIONS: &str = "  _count?: { _all?: true } | Record<string, boolean>;\n  _sum?: Record<string, boolean>;\n  _avg?: Record<string, boolean>;\n  _min?: Record<string, boolean>;\n  _max?: Record<string, boolean>;\n";

    let body = match proc.kind {
        OperationKind::Create => format!("  data: {name}CreateData;\n"),
        OperationKind::CreateMany => format!("  data: {name}CreateData[];\n"),
        OperationKind::FindFirst | OperationKind::FindMany => format!(
            "  {OPTIONAL_WHERE}\n  orderBy?: unknown;\n  take?: number;\n  skip?: number;\n"
        ),
        OperationKind::FindById | OperationKind::Delete => {
            "  where: Record<string, unknown>;\n".to_string()
        }
        OperationKind::Update => format!(
            "  where: Record<string, unknown>;\n  data: {name}UpdateData;\n"
        ),
        OperationKind::UpdateMany => format!(
            "  {OPTIONAL_WHERE}\n  data: {name}UpdateData;\n"
        ),
        OperationKind::Upsert => format!(
            "  where: Record<string, unknown>;\n  create: {name}CreateData;\n  update: {name}UpdateData;\n"
        ),
        OperationKind::DeleteMany | OperationKind::Count => {
            format!("  {OPTIONAL_WHERE}\n")
        }
        OperationKind::Aggregate => format!("  {OPTIONAL_WHERE}\n{SELECTIONS}"),
        OperationKind::GroupBy => format!(
            "  by?: string[];\n  {OPTIONAL_WHERE}\n  orderBy?: unknown;\n  take?: number;\n  skip?: number;\n{SELECTIONS}"
        ),
    };

    format!("export type {type_name} = {{\n{body}}};\n")
}

fn expected_type(field: &Field) -> &'static str {
    match field.kind {
        FieldKind::Enum => "string",
        FieldKind::Object => "unknown",
        FieldKind::Scalar => match field.type_tag {
            Some(TypeTag::Text | TypeTag::Decimal | TypeTag::Timestamp | TypeTag::Binary) => {
                "string"
            }
            Some(TypeTag::Integer | TypeTag::Float) => "number",
            Some(TypeTag::Boolean) => "boolean",
            Some(TypeTag::Json) | None => "unknown",
        },
    }
}

fn emit_data_checks(entity: &Entity, target: &str, require_required: bool) -> String {
    let mut code = String::new();
    for field in writable_fields(entity) {
        let required = require_required && !field.optional;
        code.push_str(&format!(
            "    checkScalar(errors, {target}, '{}', '{}', {}, {});\n",
            field.name,
            expected_type(field),
            field.list,
            required
        ));
    }
    code
}

fn emit_validator(entity: &Entity, proc: &ProcedureSpec) -> String {
    let type_name = &proc.input_type;
    let fn_name = naming::validator_name(&entity.name, proc.kind);
    let upper = entity.name.to_uppercase();

    let mut code = format!(
        "export function {fn_name}(input: unknown): ValidationResult<{type_name}> {{\n"
    );
    code.push_str("  const errors: ValidationError[] = [];\n");
    code.push_str("  if (typeof input !== 'object' || input === null || Array.isArray(input)) {\n");
    code.push_str("    return { ok: false, errors: [{ field: '_root', message: 'Expected object' }] };\n");
    code.push_str("  }\n");
    code.push_str("  const obj = input as Record<string, unknown>;\n");

    match proc.kind {
        OperationKind::Create => {
            code.push_str("  if (checkObject(errors, obj.data, 'data', true)) {\n");
            code.push_str("    const data = obj.data as Record<string, unknown>;\n");
            code.push_str(&emit_data_checks(entity, "data", true));
            code.push_str("  }\n");
        }
        OperationKind::CreateMany => {
            code.push_str("  if (!Array.isArray(obj.data)) {\n");
            code.push_str("    errors.push({ field: 'data', message: 'Expected array' });\n");
            code.push_str("  } else {\n");
            code.push_str("    for (const entry of obj.data) {\n");
            code.push_str("      if (!checkObject(errors, entry, 'data', true)) continue;\n");
            code.push_str("      const data = entry as Record<string, unknown>;\n");
            // One extra indent level inside the loop.
            for line in emit_data_checks(entity, "data", true).lines() {
                code.push_str("  ");
                code.push_str(line);
                code.push('\n');
            }
            code.push_str("    }\n");
            code.push_str("  }\n");
        }
        OperationKind::FindFirst | OperationKind::FindMany => {
            code.push_str("  checkObject(errors, obj.where, 'where', false);\n");
            code.push_str("  checkScalar(errors, obj, 'take', 'number', false, false);\n");
            code.push_str("  checkScalar(errors, obj, 'skip', 'number', false, false);\n");
        }
        OperationKind::FindById | OperationKind::Delete => {
            code.push_str("  if (checkObject(errors, obj.where, 'where', true)) {\n");
            code.push_str("    if (Object.keys(obj.where as Record<string, unknown>).length === 0) {\n");
            code.push_str("      errors.push({ field: 'where', message: 'Expected a unique filter' });\n");
            code.push_str("    }\n");
            code.push_str("  }\n");
        }
        OperationKind::Update => {
            code.push_str("  checkObject(errors, obj.where, 'where', true);\n");
            code.push_str("  if (checkObject(errors, obj.data, 'data', true)) {\n");
            code.push_str("    const data = obj.data as Record<string, unknown>;\n");
            code.push_str(&emit_data_checks(entity, "data", false));
            code.push_str("  }\n");
        }
        OperationKind::UpdateMany => {
            code.push_str("  checkObject(errors, obj.where, 'where', false);\n");
            code.push_str("  if (checkObject(errors, obj.data, 'data', true)) {\n");
            code.push_str("    const data = obj.data as Record<string, unknown>;\n");
            code.push_str(&emit_data_checks(entity, "data", false));
            code.push_str("  }\n");
        }
        OperationKind::Upsert => {
            code.push_str("  checkObject(errors, obj.where, 'where', true);\n");
            code.push_str("  if (checkObject(errors, obj.create, 'create', true)) {\n");
            code.push_str("    const data = obj.create as Record<string, unknown>;\n");
            code.push_str(&emit_data_checks(entity, "data", true));
            code.push_str("  }\n");
            code.push_str("  if (checkObject(errors, obj.update, 'update', true)) {\n");
            code.push_str("    const data = obj.update as Record<string, unknown>;\n");
            code.push_str(&emit_data_checks(entity, "data", false));
            code.push_str("  }\n");
        }
        OperationKind::DeleteMany | OperationKind::Count => {
            code.push_str("  checkObject(errors, obj.where, 'where', false);\n");
        }
        OperationKind::Aggregate => {
            code.push_str("  checkObject(errors, obj.where, 'where', false);\n");
            code.push_str(&emit_selection_checks(&upper));
        }
        OperationKind::GroupBy => {
            code.push_str("  checkObject(errors, obj.where, 'where', false);\n");
            code.push_str("  checkScalar(errors, obj, 'take', 'number', false, false);\n");
            code.push_str("  checkScalar(errors, obj, 'skip', 'number', false, false);\n");
            code.push_str("  if (obj.by !== undefined) {\n");
            code.push_str("    if (!Array.isArray(obj.by)) {\n");
            code.push_str("      errors.push({ field: 'by', message: 'Expected array' });\n");
            code.push_str("    } else {\n");
            code.push_str("      for (const key of obj.by) {\n");
            code.push_str(&format!(
                "        if (typeof key !== 'string' || !{upper}_GROUP_FIELDS.includes(key)) {{\n"
            ));
            code.push_str("          errors.push({ field: 'by', message: `Cannot group by '${String(key)}'` });\n");
            code.push_str("        }\n");
            code.push_str("      }\n");
            code.push_str("    }\n");
            code.push_str("  }\n");
            code.push_str(&emit_selection_checks(&upper));
        }
    }

    code.push_str("  if (errors.length > 0) {\n");
    code.push_str("    return { ok: false, errors };\n");
    code.push_str("  }\n");
    code.push_str(&format!(
        "  return {{ ok: true, value: input as {type_name} }};\n"
    ));
    code.push_str("}\n");
    code
}

fn emit_selection_checks(upper: &str) -> String {
    let mut code = String::new();
    code.push_str(&format!(
        "  checkSelection(errors, obj._count, '_count', {upper}_COUNT_FIELDS);\n"
    ));
    code.push_str(&format!(
        "  checkSelection(errors, obj._sum, '_sum', {upper}_SUM_FIELDS);\n"
    ));
    code.push_str(&format!(
        "  checkSelection(errors, obj._avg, '_avg', {upper}_AVG_FIELDS);\n"
    ));
    code.push_str(&format!(
        "  checkSelection(errors, obj._min, '_min', {upper}_MIN_FIELDS);\n"
    ));
    code.push_str(&format!(
        "  checkSelection(errors, obj._max, '_max', {upper}_MAX_FIELDS);\n"
    ));
    code
}
