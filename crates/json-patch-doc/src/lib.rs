//! Typed JSON Patch (RFC 6902) documents.
//!
//! A [`PatchDocument<M>`] is an ordered list of [`Operation`]s aimed at a model
//! of type `M`. Documents decode from and encode to the usual JSON array form,
//! and can be applied to a model through a [`PatchEngine`]. The default
//! [`TypedPatchEngine`] works on the serde representation of the model and
//! refuses edits the model cannot hold.
//!
//! # Example
//!
//! ```
//! use json_patch_doc::{Operation, PatchDocument};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Model {
//!     name: String,
//! }
//!
//! let mut model = Model { name: "a".into() };
//! let doc = PatchDocument::<Model>::new().with(Operation::replace("/name", json!("b")));
//! doc.apply_to(&mut model).unwrap();
//! assert_eq!(model.name, "b");
//!
//! let unknown = PatchDocument::<Model>::new().with(Operation::add("/other", json!(1)));
//! assert!(unknown.apply_to(&mut model).is_err());
//! ```

pub mod apply;
pub mod codec;
pub mod engine;
pub mod pointer;
pub mod types;

pub use apply::{apply_op, apply_ops, values_equal};
pub use codec::{from_json, from_json_patch, to_json, to_json_patch};
pub use engine::{PatchEngine, TypedPatchEngine};
pub use pointer::Path;
pub use types::{OpKind, Operation, PatchDocument, PatchError, PatchValue};
