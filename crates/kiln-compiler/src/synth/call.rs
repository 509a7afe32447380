//! Data-access call shapes.
//!
//! A `CallShape` captures everything about how a procedure's data-access
//! call differs from the naive one: the (possibly rewritten) client method
//! plus the argument rewrites that soft delete, group-by determinism and
//! aggregate defaulting require. `resolve` applies those rewrites to a
//! caller's arguments as a pure value transform - no text, no templates -
//! and the handler emitter mirrors the same decisions in TypeScript.

use serde_json::{json, Map, Value};

use crate::ir::OperationKind;

use super::plan::filter_injected;

/// Timestamp sentinel for the soft-delete marker write. The emitter renders
/// it as `new Date()`; the pure shape stays free of clock access.
pub const NOW_SENTINEL: &str = "$now";

/// Aggregate selection keys recognized by the data layer.
pub const AGGREGATE_SELECTIONS: [&str; 5] = ["_count", "_sum", "_avg", "_min", "_max"];

/// The shape of a procedure's underlying data-access call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallShape {
    /// Client method actually invoked, after any soft-delete rewrite.
    pub method: &'static str,

    /// Client method the operation kind lowers to before rewriting.
    pub base_method: &'static str,

    /// Inject `marker: null` into the where-clause unless the caller set
    /// the marker field explicitly.
    pub marker_filter: Option<String>,

    /// Rewrite the call into a marker-setting update instead of a physical
    /// delete.
    pub marker_write: Option<String>,

    /// Default grouping key (the primary identifier) substituted for an
    /// empty `by` list.
    pub default_by: Option<String>,

    /// Ordering field synthesized when pagination arrives without an
    /// explicit ordering. Deterministic results are load-bearing for test
    /// reproducibility.
    pub default_order: Option<String>,

    /// Substitute `_count: { _all: true }` when no aggregate sub-field was
    /// selected. The data layer rejects an aggregate that selects nothing.
    pub count_fallback: bool,
}

impl CallShape {
    /// Builds the call shape for an (operation, entity) pair.
    ///
    /// `marker` is the entity's active soft-delete marker (already gated on
    /// the global toggle by the policy resolver); `id_field` is the primary
    /// identifier name.
    pub fn build(kind: OperationKind, marker: Option<&str>, id_field: &str) -> Self {
        let soft_write = marker.is_some()
            && matches!(kind, OperationKind::Delete | OperationKind::DeleteMany);

        let method = match (kind, soft_write) {
            (OperationKind::Delete, true) => "update",
            (OperationKind::DeleteMany, true) => "updateMany",
            _ => kind.client_method(),
        };

        Self {
            method,
            base_method: kind.client_method(),
            marker_filter: marker
                .filter(|_| filter_injected(kind))
                .map(str::to_string),
            marker_write: if soft_write {
                marker.map(str::to_string)
            } else {
                None
            },
            default_by: (kind == OperationKind::GroupBy).then(|| id_field.to_string()),
            default_order: (kind == OperationKind::GroupBy).then(|| id_field.to_string()),
            count_fallback: kind == OperationKind::Aggregate,
        }
    }

    /// Applies the shape's rewrites to a caller's arguments.
    ///
    /// Accepts any JSON value; anything that isn't an object is treated as
    /// an empty argument set (input validation has already rejected it for
    /// the caller-facing path).
    pub fn resolve(&self, args: &Value) -> Value {
        let mut args = match args {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        if let Some(marker) = &self.marker_filter {
            inject_marker_filter(&mut args, marker);
        }

        if let Some(marker) = &self.marker_write {
            let mut stamp = Map::new();
            stamp.insert(NOW_SENTINEL.to_string(), Value::Bool(true));
            let mut data = Map::new();
            data.insert(marker.clone(), Value::Object(stamp));
            args.insert("data".to_string(), Value::Object(data));
        }

        if let Some(id_field) = &self.default_by {
            default_group_by(&mut args, id_field);
        }
        if let Some(id_field) = &self.default_order {
            default_group_order(&mut args, id_field);
        }

        if self.count_fallback && !AGGREGATE_SELECTIONS.iter().any(|k| args.contains_key(*k)) {
            args.insert("_count".to_string(), json!({ "_all": true }));
        }

        Value::Object(args)
    }
}

/// `where.marker = null` unless the caller addressed the marker explicitly.
fn inject_marker_filter(args: &mut Map<String, Value>, marker: &str) {
    let entry = args
        .entry("where".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(where_clause) = entry {
        if !where_clause.contains_key(marker) {
            where_clause.insert(marker.to_string(), Value::Null);
        }
    }
}

/// An empty (or missing) `by` list falls back to the primary identifier;
/// an entirely unconstrained group-by is never emitted.
fn default_group_by(args: &mut Map<String, Value>, id_field: &str) {
    let empty = match args.get("by") {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    };
    if empty {
        args.insert(
            "by".to_string(),
            Value::Array(vec![Value::String(id_field.to_string())]),
        );
    }
}

/// Pagination without an ordering gets an ascending ordering on the primary
/// identifier.
fn default_group_order(args: &mut Map<String, Value>, id_field: &str) {
    let paginated = args.contains_key("take") || args.contains_key("skip");
    if !paginated {
        return;
    }
    let ordered = match args.get("orderBy") {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    };
    if !ordered {
        let mut order = Map::new();
        order.insert(id_field.to_string(), Value::String("asc".to_string()));
        args.insert(
            "orderBy".to_string(),
            Value::Array(vec![Value::Object(order)]),
        );
    }
}
