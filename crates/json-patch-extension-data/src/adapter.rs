use std::fmt;
use std::marker::PhantomData;

use json_patch_doc::{PatchDocument, PatchEngine, TypedPatchEngine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::accessor::{ExtensionData, SinkAccessor};
use crate::assemble::DocumentAssembler;
use crate::error::AdapterError;
use crate::path::{resolve_sink_path, SinkPath};
use crate::transform::OperationTransformer;

/// Rewrites patch documents so that edits to members the model does not
/// declare land in its extension data.
///
/// The sink path is resolved and validated once, on construction. An adapter
/// holds no per-call state and can be shared freely.
pub struct ExtensionDataAdapter<M, E = TypedPatchEngine> {
    sink: SinkPath,
    engine: E,
    _model: PhantomData<fn() -> M>,
}

impl<M> ExtensionDataAdapter<M, TypedPatchEngine> {
    pub fn new(accessor: SinkAccessor<M>) -> Result<Self, AdapterError> {
        Self::with_engine(accessor, TypedPatchEngine)
    }
}

impl<M: ExtensionData> ExtensionDataAdapter<M, TypedPatchEngine> {
    /// Adapter for a model that registered its accessor.
    pub fn for_model() -> Result<Self, AdapterError> {
        Self::new(M::accessor())
    }
}

impl<M, E> ExtensionDataAdapter<M, E> {
    /// Adapter that simulates operations with `engine`.
    pub fn with_engine(accessor: SinkAccessor<M>, engine: E) -> Result<Self, AdapterError> {
        let sink = resolve_sink_path(accessor.fields())?;
        debug!(
            "resolved extension data of {} at '{}'",
            std::any::type_name::<M>(),
            sink
        );
        Ok(Self {
            sink,
            engine,
            _model: PhantomData,
        })
    }

    pub fn sink_path(&self) -> &SinkPath {
        &self.sink
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<M, E> ExtensionDataAdapter<M, E>
where
    M: Serialize + DeserializeOwned,
    E: PatchEngine<M>,
{
    /// Produce a document that applies cleanly to `model`.
    ///
    /// Operations the model accepts are kept as they are. The others are
    /// moved below the extension data. Neither `document` nor `model` is
    /// touched; the simulation runs on a serialized copy of the model.
    pub fn transform(
        &self,
        document: &PatchDocument<M>,
        model: &M,
    ) -> Result<PatchDocument<M>, AdapterError> {
        let mut test_model = test_copy(model)?;
        let transformation =
            OperationTransformer::new(&self.engine, &self.sink, &mut test_model)?.run(document)?;
        DocumentAssembler::new(&self.engine, &self.sink, &mut test_model).assemble(transformation)
    }
}

fn test_copy<M>(model: &M) -> Result<M, AdapterError>
where
    M: Serialize + DeserializeOwned,
{
    let json = serde_json::to_string(model).map_err(AdapterError::ModelRoundTrip)?;
    serde_json::from_str(&json).map_err(AdapterError::ModelRoundTrip)
}

impl<M, E: Clone> Clone for ExtensionDataAdapter<M, E> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            engine: self.engine.clone(),
            _model: PhantomData,
        }
    }
}

impl<M, E: fmt::Debug> fmt::Debug for ExtensionDataAdapter<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDataAdapter")
            .field("model", &std::any::type_name::<M>())
            .field("sink", &self.sink)
            .field("engine", &self.engine)
            .finish()
    }
}

/// One-shot adaptation straight from a document.
pub trait AdaptExt<M> {
    fn adapt(&self, accessor: SinkAccessor<M>, model: &M) -> Result<PatchDocument<M>, AdapterError>;
}

impl<M> AdaptExt<M> for PatchDocument<M>
where
    M: Serialize + DeserializeOwned,
{
    fn adapt(&self, accessor: SinkAccessor<M>, model: &M) -> Result<PatchDocument<M>, AdapterError> {
        ExtensionDataAdapter::new(accessor)?.transform(self, model)
    }
}
