//! JSON Patch apply logic over plain `serde_json::Value` trees.
//!
//! Object members are resolved exactly, falling back to a unique
//! case-insensitive match (see [`member_key`]). Array indices follow RFC 6902:
//! `-` appends on `add`, anything else must be a canonical index.

use serde_json::Value;

use crate::pointer::{format_json_pointer, get, get_mut, is_valid_index, member_key, parse_json_pointer};
use crate::types::{OpKind, Operation, PatchError};

// ── Path navigation ───────────────────────────────────────────────────────

/// Name the first segment of `path` that cannot be resolved in `doc`.
fn missing_segment(doc: &Value, path: &[String]) -> String {
    for i in 0..path.len() {
        if get(doc, &path[..=i]).is_none() {
            return path[i].clone();
        }
    }
    path.last().cloned().unwrap_or_default()
}

fn parent_mut<'a>(doc: &'a mut Value, parent_path: &[String]) -> Result<&'a mut Value, PatchError> {
    if get(doc, parent_path).is_none() {
        return Err(PatchError::NotFound {
            segment: missing_segment(doc, parent_path),
        });
    }
    get_mut(doc, parent_path).ok_or_else(|| PatchError::InvalidTarget(format_json_pointer(parent_path)))
}

fn array_index(key: &str, len: usize, allow_end: bool) -> Result<usize, PatchError> {
    if allow_end && key == "-" {
        return Ok(len);
    }
    if !is_valid_index(key) {
        return Err(PatchError::InvalidIndex(key.to_string()));
    }
    let idx: usize = key.parse().map_err(|_| PatchError::InvalidIndex(key.to_string()))?;
    let bound = if allow_end { len } else { len.saturating_sub(1) };
    if idx > bound || (!allow_end && len == 0) {
        return Err(PatchError::NotFound { segment: key.to_string() });
    }
    Ok(idx)
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => {
            let key = member_key(map, key).unwrap_or(key.as_str()).to_string();
            Ok(map.insert(key, value))
        }
        Value::Array(arr) => {
            let idx = array_index(key, arr.len(), true)?;
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::InvalidTarget(format_json_pointer(parent_path))),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Option<Value>, PatchError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Err(PatchError::InvalidTarget(String::new()));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => {
            let key = member_key(map, key)
                .ok_or_else(|| PatchError::NotFound { segment: key.clone() })?
                .to_string();
            Ok(map.remove(&key))
        }
        Value::Array(arr) => {
            let idx = array_index(key, arr.len(), false)?;
            Ok(Some(arr.remove(idx)))
        }
        _ => Err(PatchError::InvalidTarget(format_json_pointer(parent_path))),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PatchError> {
    if get(doc, path).is_none() {
        return Err(PatchError::NotFound {
            segment: missing_segment(doc, path),
        });
    }
    let target = get_mut(doc, path).ok_or_else(|| PatchError::InvalidTarget(format_json_pointer(path)))?;
    Ok(Some(std::mem::replace(target, value)))
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    let src = get(doc, from)
        .ok_or_else(|| PatchError::NotFound { segment: missing_segment(doc, from) })?
        .clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<Option<Value>, PatchError> {
    // path must not be a child of from
    if path.len() > from.len() && path[..from.len()] == from[..] {
        return Err(PatchError::InvalidTarget(format_json_pointer(path)));
    }
    let value = apply_remove(doc, from)?
        .ok_or_else(|| PatchError::NotFound { segment: missing_segment(doc, from) })?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = get(doc, path).ok_or_else(|| PatchError::NotFound {
        segment: missing_segment(doc, path),
    })?;
    if values_equal(actual, value) {
        Ok(())
    } else {
        Err(PatchError::Test(format_json_pointer(path)))
    }
}

/// Structural equality where numbers compare by numeric value (`1 == 1.0`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

fn require_from(op: &Operation) -> Result<Vec<String>, PatchError> {
    op.from
        .as_deref()
        .map(parse_json_pointer)
        .ok_or_else(|| PatchError::InvalidOp(format!("missing from for {}", op.op)))
}

// ── Main apply function ───────────────────────────────────────────────────

/// Apply a single operation to the document (in-place mutation).
///
/// Returns the previous value at the path, if the operation displaced one.
pub fn apply_op(doc: &mut Value, op: &Operation) -> Result<Option<Value>, PatchError> {
    let path = parse_json_pointer(&op.path);
    match op.op {
        OpKind::Add => apply_add(doc, &path, op.value_or_null()?),
        OpKind::Remove => apply_remove(doc, &path),
        OpKind::Replace => apply_replace(doc, &path, op.value_or_null()?),
        OpKind::Copy => apply_copy(doc, &path, &require_from(op)?),
        OpKind::Move => apply_move(doc, &path, &require_from(op)?),
        OpKind::Test => {
            apply_test(doc, &path, &op.value_or_null()?)?;
            Ok(None)
        }
    }
}

/// Apply a sequence of operations, returning the final document.
///
/// The input is consumed; on error nothing is returned, so callers that need
/// the original must keep their own copy.
pub fn apply_ops(mut doc: Value, ops: &[Operation]) -> Result<Value, PatchError> {
    for op in ops {
        apply_op(&mut doc, op)?;
    }
    Ok(doc)
}

// ── Tests ─────────────────────────────────────────────────────────────────
