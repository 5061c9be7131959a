//! Core types for JSON Patch documents.
//!
//! Only the six RFC 6902 operations exist. Operations keep their paths as
//! pointer strings exactly as the client sent them; they are parsed when an
//! engine applies them.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde_json::value::RawValue;
use serde_json::Value;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("The target location specified by path segment '{segment}' was not found.")]
    NotFound { segment: String },
    #[error("The path segment '{0}' is not a valid array index.")]
    InvalidIndex(String),
    #[error("The target location '{0}' cannot be patched.")]
    InvalidTarget(String),
    #[error("The current value at '{0}' is not equal to the test value.")]
    Test(String),
    #[error("Invalid operation: {0}")]
    InvalidOp(String),
    #[error("The model rejected the patched value: {0}")]
    Rejected(String),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

// ── Op kind ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Move => "move",
            OpKind::Copy => "copy",
            OpKind::Test => "test",
        }
    }

    /// Whether the operation reads its source from `from`.
    pub fn uses_from(&self) -> bool {
        matches!(self, OpKind::Move | OpKind::Copy)
    }
}

impl FromStr for OpKind {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(OpKind::Add),
            "remove" => Ok(OpKind::Remove),
            "replace" => Ok(OpKind::Replace),
            "move" => Ok(OpKind::Move),
            "copy" => Ok(OpKind::Copy),
            "test" => Ok(OpKind::Test),
            other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Values ────────────────────────────────────────────────────────────────

/// The value carried by an operation.
///
/// `Raw` holds a structured-JSON node exactly as it was received, e.g. when a
/// server forwards request bytes without parsing them.
#[derive(Debug, Clone)]
pub enum PatchValue {
    Plain(Value),
    Raw(Box<RawValue>),
}

impl PatchValue {
    /// Parse the value into a plain `serde_json::Value`.
    pub fn to_value(&self) -> Result<Value, PatchError> {
        match self {
            PatchValue::Plain(v) => Ok(v.clone()),
            PatchValue::Raw(raw) => Ok(serde_json::from_str(raw.get())?),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, PatchValue::Raw(_))
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            PatchValue::Plain(v) => Some(v),
            PatchValue::Raw(_) => None,
        }
    }
}

impl PartialEq for PatchValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PatchValue::Plain(a), PatchValue::Plain(b)) => a == b,
            (PatchValue::Raw(a), PatchValue::Raw(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

impl From<Value> for PatchValue {
    fn from(value: Value) -> Self {
        PatchValue::Plain(value)
    }
}

impl From<Box<RawValue>> for PatchValue {
    fn from(raw: Box<RawValue>) -> Self {
        PatchValue::Raw(raw)
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// A single JSON Patch operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: OpKind,
    pub path: String,
    pub from: Option<String>,
    pub value: Option<PatchValue>,
}

impl Operation {
    pub fn new(op: OpKind, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            from: None,
            value: None,
        }
    }

    pub fn add(path: impl Into<String>, value: impl Into<PatchValue>) -> Self {
        Self::new(OpKind::Add, path).with_value(value)
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self::new(OpKind::Remove, path)
    }

    pub fn replace(path: impl Into<String>, value: impl Into<PatchValue>) -> Self {
        Self::new(OpKind::Replace, path).with_value(value)
    }

    pub fn move_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(OpKind::Move, path).with_from(from)
    }

    pub fn copy_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(OpKind::Copy, path).with_from(from)
    }

    pub fn test(path: impl Into<String>, value: impl Into<PatchValue>) -> Self {
        Self::new(OpKind::Test, path).with_value(value)
    }

    pub fn with_value(mut self, value: impl Into<PatchValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// The operation's value as plain JSON; a missing value reads as `null`.
    pub fn value_or_null(&self) -> Result<Value, PatchError> {
        match &self.value {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// An ordered list of operations targeting a model of type `M`.
pub struct PatchDocument<M> {
    operations: Vec<Operation>,
    _model: PhantomData<fn() -> M>,
}

impl<M> PatchDocument<M> {
    pub fn new() -> Self {
        Self::from_operations(Vec::new())
    }

    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            _model: PhantomData,
        }
    }

    pub fn push(&mut self, op: Operation) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operations_mut(&mut self) -> &mut Vec<Operation> {
        &mut self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl<M> Default for PatchDocument<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for PatchDocument<M> {
    fn clone(&self) -> Self {
        Self::from_operations(self.operations.clone())
    }
}

impl<M> PartialEq for PatchDocument<M> {
    fn eq(&self, other: &Self) -> bool {
        self.operations == other.operations
    }
}

impl<M> fmt::Debug for PatchDocument<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchDocument")
            .field("model", &std::any::type_name::<M>())
            .field("operations", &self.operations)
            .finish()
    }
}

impl<M> FromIterator<Operation> for PatchDocument<M> {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::from_operations(iter.into_iter().collect())
    }
}

impl<'a, M> IntoIterator for &'a PatchDocument<M> {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
