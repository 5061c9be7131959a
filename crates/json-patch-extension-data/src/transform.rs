//! Per-operation rewriting against a disposable copy of the model.
//!
//! Each operation is first tried as-is. Operations the model rejects are
//! moved below the extension data: directly when the extension data already
//! holds entries, or collected for a single bulk insert when it starts empty.

use json_patch_doc::pointer;
use json_patch_doc::{Operation, PatchEngine, PatchError};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::AdapterError;
use crate::path::{RelativeKey, SinkPath};

/// What the transformer hands over to the assembler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformation {
    /// Passthrough and rewritten operations, in input order.
    pub operations: Vec<Operation>,
    /// Entries collected while the extension data started empty.
    pub buffered: Map<String, Value>,
    /// The extension data held entries when the call started. Otherwise the
    /// assembler adds it in one piece.
    pub started_nonempty: bool,
}

/// Read the extension data of `model`. Absent or `null` reads as empty.
pub fn sink_map<M: Serialize>(model: &M, sink: &SinkPath) -> Result<Map<String, Value>, AdapterError> {
    let doc = serde_json::to_value(model).map_err(AdapterError::ModelRoundTrip)?;
    match pointer::get(&doc, sink.segments()) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(AdapterError::SinkNotAMap {
            path: sink.to_string(),
        }),
    }
}

pub struct OperationTransformer<'a, M, E> {
    engine: &'a E,
    sink: &'a SinkPath,
    model: &'a mut M,
    output: Transformation,
}

impl<'a, M, E> OperationTransformer<'a, M, E>
where
    M: Serialize,
    E: PatchEngine<M>,
{
    /// `model` is the test copy; it is patched as operations go through.
    pub fn new(engine: &'a E, sink: &'a SinkPath, model: &'a mut M) -> Result<Self, AdapterError> {
        let started_nonempty = !sink_map(&*model, sink)?.is_empty();
        Ok(Self {
            engine,
            sink,
            model,
            output: Transformation {
                started_nonempty,
                ..Transformation::default()
            },
        })
    }

    pub fn run<'o>(
        mut self,
        ops: impl IntoIterator<Item = &'o Operation>,
    ) -> Result<Transformation, AdapterError> {
        for op in ops {
            self.step(op)?;
        }
        Ok(self.output)
    }

    fn step(&mut self, op: &Operation) -> Result<(), AdapterError> {
        let original = match self.engine.apply(&mut *self.model, op) {
            Ok(()) => {
                trace!("operation {} applies to the model as-is", op);
                self.output.operations.push(op.clone());
                return Ok(());
            }
            Err(e) => e,
        };

        let key = self.sink.relative_key(&op.path);
        if key.is_empty() {
            return Err(self.not_adaptable(
                op,
                original,
                PatchError::InvalidTarget(self.sink.to_string()),
            ));
        }

        if self.output.started_nonempty {
            self.redirect(op, &key, original)
        } else {
            self.buffer(op, &key)
        }
    }

    fn redirect(&mut self, op: &Operation, key: &RelativeKey, original: PatchError) -> Result<(), AdapterError> {
        let path = self.sink.join(key);
        // The test model reflects every operation applied so far.
        let present = sink_map(&*self.model, self.sink)?.contains_key(&key.map_key());
        let rewritten = if present {
            let value = match op.value_or_null() {
                Ok(value) => value,
                Err(e) => return Err(self.not_adaptable(op, original, e)),
            };
            Operation::replace(path, value)
        } else {
            Operation {
                path,
                ..op.clone()
            }
        };

        if let Err(e) = self.engine.apply(&mut *self.model, &rewritten) {
            return Err(self.not_adaptable(op, original, e));
        }
        debug!(
            "redirected {} from '{}' to '{}' as {}",
            op.op, op.path, rewritten.path, rewritten.op
        );
        self.output.operations.push(rewritten);
        Ok(())
    }

    fn buffer(&mut self, op: &Operation, key: &RelativeKey) -> Result<(), AdapterError> {
        let value = match &op.value {
            Some(value) => value.to_value().map_err(|source| AdapterError::SinkInsert {
                sink_path: self.sink.to_string(),
                source,
            })?,
            None => Value::Null,
        };
        let map_key = key.map_key();
        debug!("buffered {} at '{}' under key '{}'", op.op, op.path, map_key);
        self.output.buffered.insert(map_key, value);
        Ok(())
    }

    fn not_adaptable(&self, op: &Operation, original: PatchError, rewrite: PatchError) -> AdapterError {
        AdapterError::NotAdaptable {
            operation: op.to_string(),
            sink_path: self.sink.to_string(),
            original,
            rewrite,
        }
    }
}
