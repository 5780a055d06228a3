// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise affine layer: one constant and one upstream scalar per output.

use crate::layer::check_version;
use crate::{
    Activations, Coordinate, CoordinateIterator, Layer, LayerError, RecordReader, RecordWriter,
    RegisteredLayer,
};
use std::iter;

/// Binary operation applied between a layer constant and its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Multiply,
}

impl Operation {
    pub fn apply(self, constant: f64, input: f64) -> f64 {
        match self {
            Self::Add => constant + input,
            Self::Multiply => constant * input,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "multiply",
        }
    }
}

/// Output `k` is `values[k] (op) input(coordinates[k])`.
///
/// With [`Operation::Multiply`] this is a per-element scale, with
/// [`Operation::Add`] a per-element shift.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinatewise {
    operation: Operation,
    values: Vec<f64>,
    coordinates: Vec<Coordinate>,
}

impl Coordinatewise {
    /// Creates the layer. `values` and `coordinates` must have equal length.
    pub fn new(
        operation: Operation,
        values: Vec<f64>,
        coordinates: Vec<Coordinate>,
    ) -> Result<Self, LayerError> {
        if values.len() != coordinates.len() {
            return Err(LayerError::MalformedRecord(format!(
                "{} has {} values but {} coordinates",
                Self::TYPE_NAME,
                values.len(),
                coordinates.len()
            )));
        }
        Ok(Self {
            operation,
            values,
            coordinates,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Layer for Coordinatewise {
    fn size(&self) -> usize {
        self.values.len()
    }

    fn compute(&self, inputs: &Activations<'_>, outputs: &mut [f64]) -> Result<(), LayerError> {
        for ((out, &constant), &coordinate) in
            outputs.iter_mut().zip(&self.values).zip(&self.coordinates)
        {
            *out = self.operation.apply(constant, inputs.value(coordinate)?);
        }
        Ok(())
    }

    fn input_coordinates(&self, index: usize) -> Result<CoordinateIterator<'_>, LayerError> {
        let coordinate = self
            .coordinates
            .get(index)
            .copied()
            .ok_or_else(|| LayerError::out_of_range("element", index, self.coordinates.len()))?;
        Ok(Box::new(iter::once(coordinate)))
    }

    fn runtime_type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn write(&self, writer: &mut RecordWriter) -> Result<(), LayerError> {
        writer.write_version(Self::CURRENT_VERSION)?;
        writer.write("operation", &self.operation)?;
        writer.write("values", &self.values)?;
        writer.write("coordinates", &self.coordinates)
    }
}

impl RegisteredLayer for Coordinatewise {
    const TYPE_NAME: &'static str = "Coordinatewise";
    const CURRENT_VERSION: u32 = 1;

    fn read(reader: &RecordReader) -> Result<Self, LayerError> {
        let version = reader.read_version()?;
        check_version(Self::TYPE_NAME, version, &[1])?;
        Self::new(
            reader.read("operation")?,
            reader.read("values")?,
            reader.read("coordinates")?,
        )
    }
}
