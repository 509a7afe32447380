//! TypeScript type mapping and name casing for emission.

use crate::ir::{Field, FieldKind, TypeTag};

/// Converts a canonical type tag to the TypeScript type the generated
/// contracts use. Decimals travel as strings to avoid float precision loss;
/// timestamps as ISO strings; binary as base64.
pub fn to_ts_type(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Text => "string",
        TypeTag::Integer | TypeTag::Float => "number",
        TypeTag::Decimal => "string",
        TypeTag::Boolean => "boolean",
        TypeTag::Timestamp => "string",
        TypeTag::Binary => "string",
        TypeTag::Json => "unknown",
    }
}

/// TypeScript type for a field, including list and optional markers.
pub fn field_ts_type(field: &Field) -> String {
    let base = match field.kind {
        FieldKind::Scalar => field.type_tag.map_or("unknown", to_ts_type).to_string(),
        // Enum members travel as their string names; relations as objects.
        FieldKind::Enum => "string".to_string(),
        FieldKind::Object => "Record<string, unknown>".to_string(),
    };
    let base = if field.list { format!("{base}[]") } else { base };
    if field.optional {
        format!("{base} | null")
    } else {
        base
    }
}

/// Converts a PascalCase or camelCase name to snake_case (file names).
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            for lower in c.to_lowercase() {
                result.push(lower);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Converts a snake_case name to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}
