//! Final document assembly: bulk insert and value sanitizing.

use json_patch_doc::{Operation, PatchDocument, PatchEngine, PatchError, PatchValue};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::AdapterError;
use crate::path::SinkPath;
use crate::transform::{sink_map, Transformation};

/// Turn a raw JSON node into the plain value stored in extension data.
///
/// Strings yield their content and other scalars their JSON text. Objects and
/// arrays are parsed as-is. Plain values are returned unchanged.
pub fn sanitize_value(value: &PatchValue) -> Result<Value, PatchError> {
    let raw = match value {
        PatchValue::Plain(v) => return Ok(v.clone()),
        PatchValue::Raw(raw) => raw,
    };
    let parsed: Value = serde_json::from_str(raw.get())?;
    Ok(match parsed {
        Value::Bool(_) | Value::Number(_) => Value::String(raw.get().trim().to_string()),
        other => other,
    })
}

pub struct DocumentAssembler<'a, M, E> {
    engine: &'a E,
    sink: &'a SinkPath,
    model: &'a mut M,
}

impl<'a, M, E> DocumentAssembler<'a, M, E>
where
    M: Serialize,
    E: PatchEngine<M>,
{
    /// `model` is the test copy the transformer left behind.
    pub fn new(engine: &'a E, sink: &'a SinkPath, model: &'a mut M) -> Self {
        Self {
            engine,
            sink,
            model,
        }
    }

    pub fn assemble(self, transformation: Transformation) -> Result<PatchDocument<M>, AdapterError> {
        let Transformation {
            mut operations,
            buffered,
            started_nonempty,
        } = transformation;

        if !started_nonempty {
            let mut entries = sink_map(&*self.model, self.sink)?;
            let count = buffered.len();
            entries.extend(buffered);
            let insert = Operation::add(self.sink.as_str(), Value::Object(entries));
            self.engine
                .apply(&mut *self.model, &insert)
                .map_err(|source| self.insert_failed(source))?;
            debug!("added {} buffered entries at '{}'", count, self.sink);
            operations.push(insert);
        }

        for op in &mut operations {
            self.sanitize(op)?;
        }
        Ok(PatchDocument::from_operations(operations))
    }

    fn sanitize(&self, op: &mut Operation) -> Result<(), AdapterError> {
        if !self.sink.contains(&op.path) {
            return Ok(());
        }
        if let Some(value @ PatchValue::Raw(_)) = &op.value {
            let plain = sanitize_value(value).map_err(|source| self.insert_failed(source))?;
            op.value = Some(PatchValue::Plain(plain));
        }
        Ok(())
    }

    fn insert_failed(&self, source: PatchError) -> AdapterError {
        AdapterError::SinkInsert {
            sink_path: self.sink.to_string(),
            source,
        }
    }
}
