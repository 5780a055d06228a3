// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reduction layer: each output is the sum of a list of upstream scalars.

use crate::layer::check_version;
use crate::{
    Activations, Coordinate, CoordinateIterator, Layer, LayerError, RecordReader, RecordWriter,
    RegisteredLayer,
};

/// Output `k` is the sum of the values at `coordinates[k]`. An empty list
/// sums to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sum {
    coordinates: Vec<Vec<Coordinate>>,
}

impl Sum {
    pub fn new(coordinates: Vec<Vec<Coordinate>>) -> Self {
        Self { coordinates }
    }

    /// A single-output sum over `coordinates`.
    pub fn single(coordinates: Vec<Coordinate>) -> Self {
        Self::new(vec![coordinates])
    }
}

impl Layer for Sum {
    fn size(&self) -> usize {
        self.coordinates.len()
    }

    fn compute(&self, inputs: &Activations<'_>, outputs: &mut [f64]) -> Result<(), LayerError> {
        for (out, terms) in outputs.iter_mut().zip(&self.coordinates) {
            let mut total = 0.0;
            for &coordinate in terms {
                total += inputs.value(coordinate)?;
            }
            *out = total;
        }
        Ok(())
    }

    fn input_coordinates(&self, index: usize) -> Result<CoordinateIterator<'_>, LayerError> {
        let terms = self
            .coordinates
            .get(index)
            .ok_or_else(|| LayerError::out_of_range("element", index, self.coordinates.len()))?;
        Ok(Box::new(terms.iter().copied()))
    }

    fn runtime_type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn write(&self, writer: &mut RecordWriter) -> Result<(), LayerError> {
        writer.write_version(Self::CURRENT_VERSION)?;
        writer.write("coordinates", &self.coordinates)
    }
}

impl RegisteredLayer for Sum {
    const TYPE_NAME: &'static str = "Sum";
    const CURRENT_VERSION: u32 = 1;

    fn read(reader: &RecordReader) -> Result<Self, LayerError> {
        let version = reader.read_version()?;
        check_version(Self::TYPE_NAME, version, &[1])?;
        Ok(Self::new(reader.read("coordinates")?))
    }
}
