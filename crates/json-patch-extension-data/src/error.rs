use json_patch_doc::PatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The serde name and the patch name of a field disagree.
    ///
    /// Paths are resolved with the patch name while the test copy of the model
    /// goes through serde, so both have to address the same member.
    #[error(
        "The serde name {} and the patch name {} don't match for field {field}. Both naming schemes have to agree",
        .serde_name.as_deref().unwrap_or("(unset)"),
        .patch_name.as_deref().unwrap_or("(unset)")
    )]
    InconsistentNaming {
        field: String,
        serde_name: Option<String>,
        patch_name: Option<String>,
    },

    /// The accessor names no field, an empty field, or flags a non-leaf step
    /// as the extension data.
    #[error("Invalid accessor: {0}")]
    InvalidAccessor(String),

    /// The test copy could not be made by serializing and deserializing the
    /// model.
    #[error("The model must round-trip through serde_json: {0}")]
    ModelRoundTrip(#[source] serde_json::Error),

    /// The member at the extension-data path serializes to something other
    /// than a map.
    #[error("The extension data at '{path}' is not a map")]
    SinkNotAMap { path: String },

    /// An operation failed on the model and again after being moved below the
    /// extension data. Carries both failures.
    #[error(
        "The operation {operation} could neither be applied to the model ({original}) nor be adapted to match the extension data '{sink_path}' ({rewrite})"
    )]
    NotAdaptable {
        operation: String,
        sink_path: String,
        original: PatchError,
        rewrite: PatchError,
    },

    /// The single `add` that creates the extension data could not be applied.
    #[error("The extension data '{sink_path}' could not be added: {source}")]
    SinkInsert {
        sink_path: String,
        #[source]
        source: PatchError,
    },
}
