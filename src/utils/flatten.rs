// src/utils/flatten.rs

//! Dotted-path flattening of JSON trees into single-level rows.
//!
//! Nested maps become `parent.child` keys. Arrays collapse into one display
//! cell: scalars are joined with `", "`, and arrays holding maps render each
//! item as `key: value` lines with a blank line between items. The rendering
//! is meant for people reading a spreadsheet and cannot be parsed back into
//! the original structure.

use std::collections::BTreeMap;

use serde_json::Value;

/// Flatten a tree into `dotted.key -> cell` pairs.
///
/// A non-map root yields a single `value` entry.
pub fn flatten(value: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    match value {
        Value::Object(_) => flatten_into(value, "", &mut out),
        other => {
            out.insert("value".to_string(), render_cell(other));
        }
    }
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, &path, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), render_cell(other));
        }
    }
}

/// Render any value as a single cell.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => render_array(items),
        Value::Object(_) => render_item(value),
    }
}

fn render_array(items: &[Value]) -> String {
    let structured = items.iter().any(|v| matches!(v, Value::Object(_) | Value::Array(_)));
    let separator = if structured { "\n\n" } else { ", " };
    items
        .iter()
        .map(render_item)
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_item(value: &Value) -> String {
    match value {
        Value::Object(_) => flatten(value)
            .into_iter()
            .map(|(key, cell)| format!("{key}: {cell}"))
            .collect::<Vec<_>>()
            .join("\n"),
        other => render_cell(other),
    }
}
