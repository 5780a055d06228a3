// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph construction, evaluation, and persistence.

/// Errors that can occur when building, evaluating, or loading a layer graph.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// The operation is structurally meaningless for this layer type
    /// (e.g., computing the `Input` layer).
    #[error("invalid operation '{operation}' on layer type '{layer_type}'")]
    InvalidOperation {
        layer_type: &'static str,
        operation: &'static str,
    },

    /// A layer, element, or coordinate index is beyond its bound.
    #[error("{what} index {index} out of range (bound {bound})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// A persisted record carries a version the reader does not understand.
    #[error("unsupported version {version} for '{layer_type}'")]
    UnsupportedVersion {
        layer_type: String,
        version: u32,
    },

    /// A layer read an activation that the current pass has not produced.
    #[error("layer {layer_index} has not been evaluated in this pass")]
    Unresolved { layer_index: usize },

    /// The registry has no factory for a persisted type name.
    #[error("unknown layer type '{0}'")]
    UnknownLayerType(String),

    /// A persisted record lacks a required field.
    #[error("missing field '{field}'")]
    MissingField { field: String },

    /// A record parsed, but its contents are inconsistent.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The persisted document is not valid JSON, or a field has the wrong type.
    #[error("failed to parse model document: {0}")]
    Json(#[from] serde_json::Error),

    /// The model file could not be read or written.
    #[error("model I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, bound: usize) -> Self {
        Self::IndexOutOfRange { what, index, bound }
    }
}
