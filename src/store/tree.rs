//! Path and JSON-tree helpers shared by the store backends.
//!
//! A location is addressed by a `/`-separated path. Empty segments are
//! ignored, so `"classes/"`, `"/classes"` and `"classes"` are the same
//! location. `null` and empty objects are never kept in a tree: writing
//! either removes the location and prunes any parent left empty.

use serde_json::{Map, Value};

use crate::error::{AppError, Result};

const FORBIDDEN: &[char] = &['.', '#', '$', '[', ']'];

/// Split a path into validated segments.
pub fn segments(path: &str) -> Result<Vec<String>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.contains(FORBIDDEN) {
                Err(AppError::BadRequest(format!(
                    "Invalid path segment '{}' in '{}'",
                    s, path
                )))
            } else {
                Ok(s.to_string())
            }
        })
        .collect()
}

/// Join a base path and a key without producing doubled separators.
pub fn child(path: &str, key: &str) -> String {
    let base = path.trim_end_matches('/');
    let key = key.trim_start_matches('/');
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", base, key)
    }
}

pub fn get_at<'a>(node: &'a Value, segs: &[String]) -> Option<&'a Value> {
    let mut current = node;
    for seg in segs {
        current = current.as_object()?.get(seg)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Replace the value at `segs`, creating intermediate objects as needed.
pub fn set_at(node: &mut Value, segs: &[String], value: Value) {
    let value = prune(value);
    if value.is_null() {
        remove_at(node, segs);
        return;
    }

    let Some((head, rest)) = segs.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let entry = map.entry(head.clone()).or_insert(Value::Null);
        set_at(entry, rest, value);
    }
}

/// Remove the value at `segs`. Returns true when `node` is left empty.
pub fn remove_at(node: &mut Value, segs: &[String]) -> bool {
    let Some((head, rest)) = segs.split_first() else {
        *node = Value::Null;
        return true;
    };

    match node {
        Value::Object(map) => {
            if let Some(child) = map.get_mut(head) {
                if remove_at(child, rest) {
                    map.remove(head);
                }
            }
            if map.is_empty() {
                *node = Value::Null;
                true
            } else {
                false
            }
        }
        Value::Null => true,
        _ => false,
    }
}

/// Strip nulls and empty objects; an empty result collapses to `null`.
pub fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, prune(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if pruned.is_empty() {
                Value::Null
            } else {
                Value::Object(pruned)
            }
        }
        other => other,
    }
}

/// Whether a write at `written` can change the value observed at `watched`.
pub fn overlaps(watched: &[String], written: &[String]) -> bool {
    watched.iter().zip(written.iter()).all(|(a, b)| a == b)
}
