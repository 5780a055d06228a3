// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The root layer that carries externally supplied features.

use crate::layer::check_version;
use crate::{
    Activations, CoordinateIterator, Layer, LayerError, RecordReader, RecordWriter,
    RegisteredLayer,
};

/// The graph root. Its outputs are the feature values of the example being
/// evaluated, so it has no inputs and cannot be computed.
///
/// The width of incoming data is often unknown until it is observed, so the
/// size starts at zero and only ever grows via [`Input::increase_size`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    size: usize,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(size: usize) -> Self {
        Self { size }
    }

    /// Grows the layer to at least `minimum_size` elements. Never shrinks.
    pub fn increase_size(&mut self, minimum_size: usize) {
        self.size = self.size.max(minimum_size);
    }
}

impl Layer for Input {
    fn size(&self) -> usize {
        self.size
    }

    fn compute(&self, _inputs: &Activations<'_>, _outputs: &mut [f64]) -> Result<(), LayerError> {
        Err(LayerError::InvalidOperation {
            layer_type: Self::TYPE_NAME,
            operation: "compute",
        })
    }

    fn input_coordinates(&self, _index: usize) -> Result<CoordinateIterator<'_>, LayerError> {
        Err(LayerError::InvalidOperation {
            layer_type: Self::TYPE_NAME,
            operation: "input_coordinates",
        })
    }

    fn runtime_type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn write(&self, writer: &mut RecordWriter) -> Result<(), LayerError> {
        writer.write_version(Self::CURRENT_VERSION)?;
        writer.write("size", &self.size)
    }
}

impl RegisteredLayer for Input {
    const TYPE_NAME: &'static str = "Input";
    const CURRENT_VERSION: u32 = 1;

    fn read(reader: &RecordReader) -> Result<Self, LayerError> {
        let version = reader.read_version()?;
        check_version(Self::TYPE_NAME, version, &[1])?;
        Ok(Self {
            size: reader.read("size")?,
        })
    }
}
