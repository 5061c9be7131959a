//! JSON codec for patch operations.
//!
//! Converts operations to/from `serde_json::Value` in the RFC 6902 format,
//! and implements serde for [`Operation`] and [`PatchDocument`] on top of it.
//! Serializing writes raw values verbatim.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{OpKind, Operation, PatchDocument, PatchError, PatchValue};

// ── Decoding ──────────────────────────────────────────────────────────────

fn decode_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>, PatchError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(PatchError::InvalidOp(format!("{key} must be a string"))),
    }
}

/// Decode a single operation object.
///
/// Only `op` and `path` are mandatory, plus `from` for `move` and `copy`.
/// A missing `value` is kept as `None`; engines read it as `null`.
pub fn from_json(v: &Value) -> Result<Operation, PatchError> {
    let map = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op: OpKind = decode_str(map, "op")?
        .ok_or_else(|| PatchError::InvalidOp("missing op".into()))?
        .parse()?;
    let path = decode_str(map, "path")?
        .ok_or_else(|| PatchError::InvalidOp("missing path".into()))?
        .to_string();
    let from = decode_str(map, "from")?.map(str::to_string);
    if op.uses_from() && from.is_none() {
        return Err(PatchError::InvalidOp(format!("missing from for {op}")));
    }
    let value = map.get("value").cloned().map(PatchValue::Plain);
    Ok(Operation { op, path, from, value })
}

/// Decode an array of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Operation>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

// ── Encoding ──────────────────────────────────────────────────────────────

/// Encode an operation as a JSON object.
pub fn to_json(op: &Operation) -> Result<Value, PatchError> {
    Ok(serde_json::to_value(op)?)
}

/// Encode a list of operations as a JSON array.
pub fn to_json_patch(ops: &[Operation]) -> Result<Value, PatchError> {
    ops.iter().map(to_json).collect::<Result<Vec<_>, _>>().map(Value::Array)
}

// ── serde ─────────────────────────────────────────────────────────────────

impl Serialize for PatchValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PatchValue::Plain(v) => v.serialize(serializer),
            PatchValue::Raw(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PatchValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(PatchValue::Plain)
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + usize::from(self.from.is_some()) + usize::from(self.value.is_some());
        let mut m = serializer.serialize_map(Some(len))?;
        m.serialize_entry("op", self.op.as_str())?;
        m.serialize_entry("path", &self.path)?;
        if let Some(from) = &self.from {
            m.serialize_entry("from", from)?;
        }
        if let Some(value) = &self.value {
            m.serialize_entry("value", value)?;
        }
        m.end()
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        from_json(&v).map_err(serde::de::Error::custom)
    }
}

impl<M> Serialize for PatchDocument<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for op in self.operations() {
            seq.serialize_element(op)?;
        }
        seq.end()
    }
}

impl<'de, M> Deserialize<'de> for PatchDocument<M> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Operation>::deserialize(deserializer).map(PatchDocument::from_operations)
    }
}

impl<M> PatchDocument<M> {
    pub fn from_json(v: &Value) -> Result<Self, PatchError> {
        from_json_patch(v).map(Self::from_operations)
    }

    pub fn from_json_str(s: &str) -> Result<Self, PatchError> {
        let v: Value = serde_json::from_str(s)?;
        Self::from_json(&v)
    }

    pub fn to_json(&self) -> Result<Value, PatchError> {
        to_json_patch(self.operations())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{} {}", self.op, self.path),
        }
    }
}
