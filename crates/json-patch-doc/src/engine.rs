//! Patch engines: applying operations to typed models.
//!
//! [`TypedPatchEngine`] applies an operation to the serde representation of a
//! model and then insists that the model can represent the result. Members the
//! model does not declare are dropped by serde on the way back in; the engine
//! reports those as [`PatchError::NotFound`] instead of losing them silently.
//! Members set to `null` are checked too, by probing whether the model
//! declares them.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::apply::{apply_op, apply_ops, values_equal};
use crate::pointer::{format_json_pointer, get, get_mut};
use crate::types::{Operation, PatchDocument, PatchError};

/// Applies single operations to a model of type `M`.
pub trait PatchEngine<M> {
    fn apply(&self, model: &mut M, op: &Operation) -> Result<(), PatchError>;
}

/// Engine for any serde model whose sink and nested types are plain members.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedPatchEngine;

impl<M> PatchEngine<M> for TypedPatchEngine
where
    M: Serialize + DeserializeOwned,
{
    fn apply(&self, model: &mut M, op: &Operation) -> Result<(), PatchError> {
        let mut doc = serde_json::to_value(&*model)?;
        apply_op(&mut doc, op)?;
        *model = materialize(&doc)?;
        Ok(())
    }
}

/// Deserialize `doc` into `M` and check that nothing was lost on the way.
fn materialize<M>(doc: &Value) -> Result<M, PatchError>
where
    M: Serialize + DeserializeOwned,
{
    let patched = M::deserialize(doc).map_err(|e| PatchError::Rejected(e.to_string()))?;
    let roundtrip = serde_json::to_value(&patched)?;
    let mut expected = Cow::Borrowed(doc);
    loop {
        let mut path = Vec::new();
        match drift(&expected, &roundtrip, &mut path) {
            None => return Ok(patched),
            Some(Drift::DroppedNull) if declares_member::<M>(doc, &path) => {
                // A declared member that serializes as absent when empty.
                remove_member(expected.to_mut(), &path);
            }
            Some(Drift::Dropped | Drift::DroppedNull) => {
                return Err(PatchError::NotFound {
                    segment: path.pop().unwrap_or_default(),
                })
            }
            Some(Drift::Changed) => {
                return Err(PatchError::Rejected(format!(
                    "the value at '{}' is not representable by the model",
                    format_json_pointer(&path)
                )))
            }
        }
    }
}

enum Drift {
    Dropped,
    DroppedNull,
    Changed,
}

/// Find the first place where `actual` fails to carry what `expected` holds.
///
/// Members only `actual` has (defaults filled in by serde) are fine. On a hit
/// `path` points at it.
fn drift(expected: &Value, actual: &Value, path: &mut Vec<String>) -> Option<Drift> {
    match (expected, actual) {
        (Value::Null, _) => None,
        (Value::Object(e), Value::Object(a)) => {
            for (k, v) in e {
                path.push(k.clone());
                match a.get(k) {
                    None if v.is_null() => return Some(Drift::DroppedNull),
                    None => return Some(Drift::Dropped),
                    Some(w) => {
                        if let Some(d) = drift(v, w, path) {
                            return Some(d);
                        }
                    }
                }
                path.pop();
            }
            None
        }
        (Value::Array(e), Value::Array(a)) if e.len() == a.len() => {
            for (i, (v, w)) in e.iter().zip(a).enumerate() {
                path.push(i.to_string());
                if let Some(d) = drift(v, w, path) {
                    return Some(d);
                }
                path.pop();
            }
            None
        }
        _ if values_equal(expected, actual) => None,
        _ => Some(Drift::Changed),
    }
}

/// Whether `M` declares the member at `path`, which holds `null` in `doc`.
///
/// `null` and an absent member look the same once serialized, so the member
/// is probed with other values: a declared member either rejects the probe or
/// keeps it, an unknown one silently drops every probe.
fn declares_member<M>(doc: &Value, path: &[String]) -> bool
where
    M: Serialize + DeserializeOwned,
{
    for probe in [json!({}), json!([]), json!(0)] {
        let mut probed = doc.clone();
        match get_mut(&mut probed, path) {
            Some(slot) => *slot = probe,
            None => return false,
        }
        let Ok(model) = M::deserialize(&probed) else {
            return true;
        };
        match serde_json::to_value(&model) {
            Ok(roundtrip) if get(&roundtrip, path).is_some() => return true,
            Ok(_) => {}
            Err(_) => return true,
        }
    }
    false
}

fn remove_member(doc: &mut Value, path: &[String]) {
    let Some((key, parent)) = path.split_last() else {
        return;
    };
    if let Some(Value::Object(map)) = get_mut(doc, parent) {
        map.remove(key);
    }
}

impl<M> PatchDocument<M>
where
    M: Serialize + DeserializeOwned,
{
    /// Apply every operation to `model` with the [`TypedPatchEngine`].
    ///
    /// All or nothing: `model` is only replaced once the whole document
    /// applied cleanly.
    pub fn apply_to(&self, model: &mut M) -> Result<(), PatchError> {
        let doc = serde_json::to_value(&*model)?;
        let mut working: M = materialize(&doc)?;
        for op in self.operations() {
            TypedPatchEngine.apply(&mut working, op)?;
        }
        *model = working;
        Ok(())
    }
}

impl<M> PatchDocument<M> {
    /// Apply every operation with a caller supplied engine, all or nothing.
    pub fn apply_with<E>(&self, engine: &E, model: &mut M) -> Result<(), PatchError>
    where
        E: PatchEngine<M>,
        M: Clone,
    {
        let mut working = model.clone();
        for op in self.operations() {
            engine.apply(&mut working, op)?;
        }
        *model = working;
        Ok(())
    }

    /// Apply the document to an untyped JSON value.
    pub fn apply_value(&self, doc: Value) -> Result<Value, PatchError> {
        apply_ops(doc, self.operations())
    }
}
