// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The polymorphic [`Layer`] abstraction.
//!
//! A layer consumes scalars addressed by [`Coordinate`]s into earlier layers
//! and produces a fixed-size output vector. Concrete layers live in
//! [`crate::layers`]; the [`crate::Model`] owns them as `Box<dyn Layer>` and
//! rebuilds them from persisted records through the [`crate::LayerRegistry`].

use crate::{Coordinate, LayerError, RecordReader, RecordWriter};
use std::fmt;

/// Iterator over the input coordinates of one output element.
pub type CoordinateIterator<'a> = Box<dyn Iterator<Item = Coordinate> + 'a>;

/// A computation node in the layer graph.
///
/// Implementations must be pure: `compute` may only read the supplied
/// activations and write its own outputs. Layers are `Send + Sync` so an
/// immutable model can be evaluated from several threads at once.
pub trait Layer: fmt::Debug + Send + Sync {
    /// Number of output elements.
    fn size(&self) -> usize;

    /// Computes all outputs from already-resolved upstream activations.
    ///
    /// `outputs.len()` equals [`Layer::size`].
    fn compute(&self, inputs: &Activations<'_>, outputs: &mut [f64]) -> Result<(), LayerError>;

    /// Enumerates the upstream coordinates output element `index` depends on.
    fn input_coordinates(&self, index: usize) -> Result<CoordinateIterator<'_>, LayerError>;

    /// The name this layer is persisted and registered under.
    fn runtime_type_name(&self) -> &'static str;

    /// Writes the record version followed by the type-specific fields.
    fn write(&self, writer: &mut RecordWriter) -> Result<(), LayerError>;
}

/// A concrete layer type that can be reconstructed from a persisted record.
///
/// Registering a type with [`crate::LayerRegistry::register`] makes it
/// loadable by name.
pub trait RegisteredLayer: Layer + Sized + 'static {
    /// Registry key and value of the persisted `type` field.
    const TYPE_NAME: &'static str;

    /// Version written by [`Layer::write`].
    const CURRENT_VERSION: u32;

    /// Rebuilds the layer, dispatching on the record's version.
    fn read(reader: &RecordReader) -> Result<Self, LayerError>;
}

/// Read-only view of the activations resolved so far in one evaluation pass.
///
/// Slot `i` holds the outputs of layer `i`, or `None` if that layer has not
/// been computed in this pass.
#[derive(Debug, Clone, Copy)]
pub struct Activations<'a> {
    layers: &'a [Option<Vec<f64>>],
}

impl<'a> Activations<'a> {
    pub fn new(layers: &'a [Option<Vec<f64>>]) -> Self {
        Self { layers }
    }

    /// Returns the scalar at `coordinate`.
    pub fn value(&self, coordinate: Coordinate) -> Result<f64, LayerError> {
        let slot = self.layers.get(coordinate.layer_index).ok_or_else(|| {
            LayerError::out_of_range("layer", coordinate.layer_index, self.layers.len())
        })?;
        let values = slot.as_ref().ok_or(LayerError::Unresolved {
            layer_index: coordinate.layer_index,
        })?;
        values.get(coordinate.element_index).copied().ok_or_else(|| {
            LayerError::out_of_range("element", coordinate.element_index, values.len())
        })
    }
}

/// Rejects any record version not listed in `supported`.
pub(crate) fn check_version(
    layer_type: &str,
    version: u32,
    supported: &[u32],
) -> Result<(), LayerError> {
    if supported.contains(&version) {
        Ok(())
    } else {
        Err(LayerError::UnsupportedVersion {
            layer_type: layer_type.to_owned(),
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_lookup() {
        let slots = vec![Some(vec![1.0, 2.0]), None, Some(vec![5.0])];
        let acts = Activations::new(&slots);

        assert_eq!(acts.value(Coordinate::new(0, 1)).unwrap(), 2.0);
        assert_eq!(acts.value(Coordinate::new(2, 0)).unwrap(), 5.0);
        assert!(matches!(
            acts.value(Coordinate::new(1, 0)),
            Err(LayerError::Unresolved { layer_index: 1 })
        ));
        assert!(matches!(
            acts.value(Coordinate::new(0, 2)),
            Err(LayerError::IndexOutOfRange { what: "element", index: 2, bound: 2 })
        ));
        assert!(matches!(
            acts.value(Coordinate::new(3, 0)),
            Err(LayerError::IndexOutOfRange { what: "layer", index: 3, bound: 3 })
        ));
    }

    #[test]
    fn test_check_version() {
        assert!(check_version("Sum", 1, &[1]).is_ok());
        assert!(matches!(
            check_version("Sum", 2, &[1]),
            Err(LayerError::UnsupportedVersion { version: 2, .. })
        ));
    }
}
