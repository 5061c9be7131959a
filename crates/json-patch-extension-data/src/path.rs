//! Canonical path of the extension data and paths relative to it.

use std::fmt;

use json_patch_doc::pointer::{eq_ignore_case, escape_component, format_json_pointer, parse_json_pointer};

use crate::accessor::FieldDescriptor;
use crate::error::AdapterError;

/// The resolved JSON Pointer of the extension-data field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkPath {
    pointer: String,
    segments: Vec<String>,
}

impl SinkPath {
    pub fn as_str(&self) -> &str {
        &self.pointer
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Strip the longest case-insensitive common prefix shared with `path`.
    ///
    /// Prefixes are compared segment by segment, so `/MyModel/myKey` against
    /// `/MyModel/MyExtensionData` leaves `myKey`.
    pub fn relative_key(&self, path: &str) -> RelativeKey {
        let segments = parse_json_pointer(path);
        let common = self
            .segments
            .iter()
            .zip(&segments)
            .take_while(|(a, b)| eq_ignore_case(a, b))
            .count();
        RelativeKey(segments[common..].to_vec())
    }

    /// Whether `path` addresses the extension data or something below it.
    pub fn contains(&self, path: &str) -> bool {
        let segments = parse_json_pointer(path);
        segments.len() >= self.segments.len()
            && self
                .segments
                .iter()
                .zip(&segments)
                .all(|(a, b)| eq_ignore_case(a, b))
    }

    /// The pointer addressing `key` inside the extension data.
    pub fn join(&self, key: &RelativeKey) -> String {
        format!("{}/{}", self.pointer, key.pointer_suffix())
    }
}

impl fmt::Display for SinkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pointer)
    }
}

/// What is left of an operation path once the sink prefix is stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeKey(Vec<String>);

impl RelativeKey {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The key as stored in the extension-data map.
    pub fn map_key(&self) -> String {
        self.0.join("/")
    }

    /// The key as pointer text, without the leading `/`.
    pub fn pointer_suffix(&self) -> String {
        self.0
            .iter()
            .map(|s| escape_component(s))
            .collect::<Vec<_>>()
            .join("/")
    }
}

// ── Resolution ────────────────────────────────────────────────────────────

/// Resolve the canonical path of the sink from its root-to-sink traversal.
///
/// Fields are visited leaf to root. Every field except the sink must be named
/// consistently by both naming schemes.
pub fn resolve_sink_path(fields: &[FieldDescriptor]) -> Result<SinkPath, AdapterError> {
    if fields.is_empty() {
        return Err(AdapterError::InvalidAccessor(
            "expected a path of at least one field".into(),
        ));
    }
    let leaf = fields.len() - 1;
    let mut segments = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate().rev() {
        if field.ident().is_empty() {
            return Err(AdapterError::InvalidAccessor(format!(
                "field #{i} has an empty identifier"
            )));
        }
        if field.is_sink() && i != leaf {
            return Err(AdapterError::InvalidAccessor(format!(
                "field {} is the extension data but is not the last field",
                field.ident()
            )));
        }
        if !field.is_sink() {
            check_naming(field)?;
        }
        segments.push(field.resolved_name().to_string());
    }
    segments.reverse();
    Ok(SinkPath {
        pointer: format_json_pointer(&segments),
        segments,
    })
}

fn check_naming(field: &FieldDescriptor) -> Result<(), AdapterError> {
    let consistent = match (field.serde_name(), field.patch_name()) {
        (Some(serde), Some(patch)) => eq_ignore_case(serde, patch),
        (Some(name), None) | (None, Some(name)) => eq_ignore_case(name, field.ident()),
        (None, None) => true,
    };
    if consistent {
        return Ok(());
    }
    Err(AdapterError::InconsistentNaming {
        field: field.ident().to_string(),
        serde_name: field.serde_name().map(str::to_string),
        patch_name: field.patch_name().map(str::to_string),
    })
}
