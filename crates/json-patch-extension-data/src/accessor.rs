//! Field-descriptor table describing how to reach the extension data.
//!
//! A [`SinkAccessor`] lists the fields traversed from the model root down to
//! the extension-data field, one [`FieldDescriptor`] per step. Each descriptor
//! carries the field's own identifier and the names the two naming schemes
//! give it:
//!
//! - the serde name, i.e. whatever `#[serde(rename = "...")]` says;
//! - the patch name, the member name clients use in patch paths.
//!
//! ```
//! use json_patch_extension_data::{FieldDescriptor, SinkAccessor};
//!
//! struct Model;
//!
//! let accessor = SinkAccessor::<Model>::new()
//!     .field(FieldDescriptor::new("my_model").with_serde_name("moooooodel").with_patch_name("moooooodel"))
//!     .sink("MyExtensionData");
//! assert_eq!(accessor.fields().len(), 2);
//! assert!(accessor.fields()[1].is_sink());
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// One traversed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    ident: String,
    serde_name: Option<String>,
    patch_name: Option<String>,
    is_sink: bool,
}

impl FieldDescriptor {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            serde_name: None,
            patch_name: None,
            is_sink: false,
        }
    }

    /// Descriptor of the extension-data field itself.
    pub fn sink(ident: impl Into<String>) -> Self {
        Self {
            is_sink: true,
            ..Self::new(ident)
        }
    }

    pub fn with_serde_name(mut self, name: impl Into<String>) -> Self {
        self.serde_name = Some(name.into());
        self
    }

    pub fn with_patch_name(mut self, name: impl Into<String>) -> Self {
        self.patch_name = Some(name.into());
        self
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn serde_name(&self) -> Option<&str> {
        self.serde_name.as_deref()
    }

    pub fn patch_name(&self) -> Option<&str> {
        self.patch_name.as_deref()
    }

    pub fn is_sink(&self) -> bool {
        self.is_sink
    }

    /// The name used as path segment: patch name, else serde name, else the
    /// identifier.
    pub fn resolved_name(&self) -> &str {
        self.patch_name
            .as_deref()
            .or(self.serde_name.as_deref())
            .unwrap_or(&self.ident)
    }
}

impl From<&str> for FieldDescriptor {
    fn from(ident: &str) -> Self {
        FieldDescriptor::new(ident)
    }
}

impl From<String> for FieldDescriptor {
    fn from(ident: String) -> Self {
        FieldDescriptor::new(ident)
    }
}

/// Root-to-sink traversal for models of type `M`.
pub struct SinkAccessor<M> {
    fields: Vec<FieldDescriptor>,
    _model: PhantomData<fn() -> M>,
}

impl<M> SinkAccessor<M> {
    pub fn new() -> Self {
        Self::from_fields(Vec::new())
    }

    pub fn from_fields(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            _model: PhantomData,
        }
    }

    /// Step through an intermediate field.
    pub fn field(mut self, field: impl Into<FieldDescriptor>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Finish at the extension-data field.
    ///
    /// A plain identifier becomes [`FieldDescriptor::sink`]; a descriptor
    /// passed in is marked as the sink.
    pub fn sink(mut self, field: impl Into<FieldDescriptor>) -> Self {
        let mut field = field.into();
        field.is_sink = true;
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl<M> Default for SinkAccessor<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for SinkAccessor<M> {
    fn clone(&self) -> Self {
        Self::from_fields(self.fields.clone())
    }
}

impl<M> fmt::Debug for SinkAccessor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkAccessor")
            .field("model", &std::any::type_name::<M>())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Models that know where their extension data lives.
pub trait ExtensionData: Serialize + DeserializeOwned + Sized {
    fn accessor() -> SinkAccessor<Self>;
}
