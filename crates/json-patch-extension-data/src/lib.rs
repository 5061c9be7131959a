//! Route JSON Patch operations into a model's extension data.
//!
//! Clients write patch paths without knowing which members of a model are
//! statically typed and which live in its open-ended extension-data map. An
//! [`ExtensionDataAdapter`] simulates each operation against a copy of the
//! model and moves the ones the model rejects below the extension data, so the
//! resulting document applies cleanly.
//!
//! ```
//! use json_patch_doc::{Operation, PatchDocument};
//! use json_patch_extension_data::{ExtensionDataAdapter, SinkAccessor};
//! use serde::{Deserialize, Serialize};
//! use serde_json::{json, Map, Value};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Model {
//!     #[serde(rename = "MyInteger")]
//!     my_integer: i32,
//!     #[serde(rename = "MyExtensionData", default, skip_serializing_if = "Option::is_none")]
//!     extension_data: Option<Map<String, Value>>,
//! }
//!
//! let adapter = ExtensionDataAdapter::new(SinkAccessor::<Model>::new().sink("MyExtensionData")).unwrap();
//! let mut model = Model { my_integer: 1, extension_data: None };
//! let doc = PatchDocument::new()
//!     .with(Operation::replace("/MyInteger", json!(2)))
//!     .with(Operation::add("/uvw", json!("xyz")));
//!
//! let adapted = adapter.transform(&doc, &model).unwrap();
//! adapted.apply_to(&mut model).unwrap();
//! assert_eq!(model.my_integer, 2);
//! assert_eq!(model.extension_data.unwrap()["uvw"], json!("xyz"));
//! ```

pub mod accessor;
pub mod adapter;
pub mod assemble;
pub mod error;
pub mod path;
pub mod transform;

pub use accessor::{ExtensionData, FieldDescriptor, SinkAccessor};
pub use adapter::{AdaptExt, ExtensionDataAdapter};
pub use assemble::{sanitize_value, DocumentAssembler};
pub use error::AdapterError;
pub use path::{resolve_sink_path, RelativeKey, SinkPath};
pub use transform::{OperationTransformer, Transformation};
