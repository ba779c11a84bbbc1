//! Checkbox-gated string lists
//!
//! An empty list is never stored: the field is removed instead, so "no
//! restriction" has exactly one representation in the document.

use serde_json::{Map, Value};

/// The list actually written for a gated field.
///
/// Empty when the gate is off; otherwise entries are trimmed and blanks
/// dropped, keeping order.
pub fn effective_list(raw: &[String], enabled: bool) -> Vec<String> {
    if !enabled {
        return Vec::new();
    }
    raw.iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Store `list` under `field`, or remove the field when the list is empty
pub(crate) fn set_field_if_list_non_empty(
    map: &mut Map<String, Value>,
    field: &str,
    list: Vec<String>,
) {
    if list.is_empty() {
        map.remove(field);
    } else {
        map.insert(
            field.to_string(),
            Value::Array(list.into_iter().map(Value::String).collect()),
        );
    }
}

/// Read a list of strings, skipping entries of any other type
pub(crate) fn read_string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
