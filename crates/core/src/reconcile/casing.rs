//! Recursive key renaming for request bodies.

use serde_json::{Map, Value};

/// Rename every object key from camelCase to snake_case, recursing into arrays and objects.
///
/// Each ASCII uppercase letter becomes `_` followed by its lowercase form, so `fatherName`
/// becomes `father_name` and `opNo` becomes `op_no`.
pub fn to_snake_case(value: Value) -> Value {
    rename_keys(value, &snake_key)
}

/// Rename every object key from snake_case to camelCase, recursing into arrays and objects.
///
/// An underscore followed by a lowercase ASCII letter becomes the uppercase letter; other
/// underscores are kept.
pub fn to_camel_case(value: Value) -> Value {
    rename_keys(value, &camel_key)
}

fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (rename(&key), rename_keys(value, rename)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rename_keys(item, rename))
                .collect(),
        ),
        other => other,
    }
}

fn snake_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn camel_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('_', Some(next)) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}
