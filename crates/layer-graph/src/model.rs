// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The model: an append-only arena of layers addressed by index.
//!
//! ```text
//! index 0        1            2          ...
//!       Input ◄─ Coordinatewise ◄─ Sum ◄─ ...
//! ```
//!
//! Layer 0 is always the [`Input`]. Every other layer may only hold
//! coordinates into layers with a smaller index, which [`Model::add_layer`]
//! checks on insertion. The graph is therefore acyclic by construction and
//! evaluation needs no cycle detection.
//!
//! # Persisted Format
//! ```json
//! {
//!   "format_version": 1,
//!   "layers": [
//!     { "type": "Input", "version": 1, "size": 3 },
//!     { "type": "Sum", "version": 1, "coordinates": [[{ "layer_index": 0, "element_index": 0 }]] }
//!   ]
//! }
//! ```

use crate::layers::Input;
use crate::record::TYPE_FIELD;
use crate::{
    Coordinate, Evaluation, Layer, LayerError, LayerRegistry, RecordReader, RecordWriter,
    RegisteredLayer,
};
use std::fmt;
use std::path::Path;

/// Version of the top-level persisted document.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ModelDocument {
    format_version: u32,
    layers: Vec<serde_json::Value>,
}

/// An ordered collection of layers rooted at an [`Input`].
#[derive(Debug, Default)]
pub struct Model {
    input: Input,
    /// `layers[i]` is model layer `i + 1`.
    layers: Vec<Box<dyn Layer>>,
    /// Distinct upstream layer indices, parallel to `layers`.
    upstream: Vec<Vec<usize>>,
}

impl Model {
    /// Creates a model holding only an empty input layer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_size(size: usize) -> Self {
        Self {
            input: Input::with_size(size),
            ..Self::default()
        }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Grows the input layer to at least `minimum_size` features.
    pub fn increase_input_size(&mut self, minimum_size: usize) {
        self.input.increase_size(minimum_size);
    }

    /// Number of layers, including the input.
    pub fn num_layers(&self) -> usize {
        self.layers.len() + 1
    }

    pub fn layer(&self, index: usize) -> Result<&dyn Layer, LayerError> {
        if index == 0 {
            return Ok(&self.input);
        }
        self.layers
            .get(index - 1)
            .map(|layer| layer.as_ref())
            .ok_or_else(|| LayerError::out_of_range("layer", index, self.num_layers()))
    }

    pub fn layer_size(&self, index: usize) -> Result<usize, LayerError> {
        Ok(self.layer(index)?.size())
    }

    /// Iterates over all layers in index order, starting with the input.
    pub fn iter_layers(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        std::iter::once(&self.input as &dyn Layer).chain(self.layers.iter().map(|l| l.as_ref()))
    }

    /// Appends `layer` and returns its index.
    ///
    /// Every input coordinate must point at an existing layer and an element
    /// within that layer's current size.
    pub fn add_layer(&mut self, layer: Box<dyn Layer>) -> Result<usize, LayerError> {
        let index = self.num_layers();
        if layer.runtime_type_name() == Input::TYPE_NAME {
            return Err(LayerError::InvalidOperation {
                layer_type: Input::TYPE_NAME,
                operation: "add_layer",
            });
        }

        let mut upstream = Vec::new();
        for element in 0..layer.size() {
            for coordinate in layer.input_coordinates(element)? {
                self.check_coordinate(coordinate, index)?;
                upstream.push(coordinate.layer_index);
            }
        }
        upstream.sort_unstable();
        upstream.dedup();

        tracing::debug!(
            "added layer {index} ({}, size {}, reads {:?})",
            layer.runtime_type_name(),
            layer.size(),
            upstream,
        );
        self.layers.push(layer);
        self.upstream.push(upstream);
        Ok(index)
    }

    /// Checks that `coordinate` addresses an existing element of this model.
    pub fn validate_coordinate(&self, coordinate: Coordinate) -> Result<(), LayerError> {
        self.check_coordinate(coordinate, self.num_layers())
    }

    fn check_coordinate(&self, coordinate: Coordinate, layer_bound: usize) -> Result<(), LayerError> {
        if coordinate.layer_index >= layer_bound {
            return Err(LayerError::out_of_range(
                "coordinate layer",
                coordinate.layer_index,
                layer_bound,
            ));
        }
        let size = self.layer_size(coordinate.layer_index)?;
        if coordinate.element_index >= size {
            return Err(LayerError::out_of_range(
                "coordinate element",
                coordinate.element_index,
                size,
            ));
        }
        Ok(())
    }

    /// Distinct layers read by layer `index`. Empty for the input.
    pub fn upstream_of(&self, index: usize) -> &[usize] {
        match index {
            0 => &[],
            i => self.upstream.get(i - 1).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Coordinates of every element of the last layer.
    pub fn output_coordinates(&self) -> Vec<Coordinate> {
        let last = self.num_layers() - 1;
        let size = self.layer_size(last).unwrap_or(0);
        Coordinate::range(last, size)
    }

    /// Starts an evaluation pass over `features`.
    pub fn evaluation(&self, features: &[f64]) -> Evaluation<'_> {
        Evaluation::new(self, features)
    }

    /// Resolves `coordinates` for one feature vector in a fresh pass.
    pub fn compute(
        &self,
        features: &[f64],
        coordinates: &[Coordinate],
    ) -> Result<Vec<f64>, LayerError> {
        self.evaluation(features).resolve_all(coordinates)
    }

    /// Returns a one-line description of the model.
    pub fn summary(&self) -> String {
        let total: usize = self.iter_layers().map(|l| l.size()).sum();
        format!(
            "Model: {} layers, input size {}, {} elements total",
            self.num_layers(),
            self.input.size(),
            total,
        )
    }

    // ── Persistence ────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String, LayerError> {
        Ok(serde_json::to_string(&self.to_document()?)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, LayerError> {
        Ok(serde_json::to_string_pretty(&self.to_document()?)?)
    }

    /// Writes the model as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), LayerError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        tracing::info!("saved model to '{}': {}", path.display(), self.summary());
        Ok(())
    }

    /// Parses a model using the process-wide registry.
    pub fn from_json(json: &str) -> Result<Self, LayerError> {
        Self::from_json_with(json, LayerRegistry::global())
    }

    /// Parses a model, resolving layer types through `registry`.
    ///
    /// Either the whole document loads and validates, or an error is returned.
    pub fn from_json_with(json: &str, registry: &LayerRegistry) -> Result<Self, LayerError> {
        let document: ModelDocument = serde_json::from_str(json)?;
        if document.format_version != MODEL_FORMAT_VERSION {
            return Err(LayerError::UnsupportedVersion {
                layer_type: "Model".to_owned(),
                version: document.format_version,
            });
        }

        let mut records = document.layers.into_iter();
        let first = records
            .next()
            .ok_or_else(|| LayerError::MalformedRecord("model has no layers".into()))?;
        let first = RecordReader::from_value(first)?;
        let first_type = first.type_name()?;
        if first_type != Input::TYPE_NAME {
            return Err(LayerError::MalformedRecord(format!(
                "first layer must be '{}', found '{first_type}'",
                Input::TYPE_NAME
            )));
        }

        let mut model = Model {
            input: Input::read(&first)?,
            ..Model::default()
        };

        for record in records {
            let reader = RecordReader::from_value(record)?;
            let type_name = reader.type_name()?;
            if type_name == Input::TYPE_NAME {
                return Err(LayerError::MalformedRecord(format!(
                    "'{}' may only appear as layer 0",
                    Input::TYPE_NAME
                )));
            }
            let layer = registry.create(&type_name, &reader)?;
            model.add_layer(layer)?;
        }

        tracing::debug!("{}", model.summary());
        Ok(model)
    }

    /// Loads a model from a JSON file using the process-wide registry.
    pub fn from_file(path: &Path) -> Result<Self, LayerError> {
        let content = std::fs::read_to_string(path)?;
        let model = Self::from_json(&content)?;
        tracing::info!("loaded model from '{}': {}", path.display(), model.summary());
        Ok(model)
    }

    fn to_document(&self) -> Result<ModelDocument, LayerError> {
        let mut layers = Vec::with_capacity(self.num_layers());
        for layer in self.iter_layers() {
            let mut writer = RecordWriter::new();
            writer.write(TYPE_FIELD, layer.runtime_type_name())?;
            layer.write(&mut writer)?;
            layers.push(writer.into_value());
        }
        Ok(ModelDocument {
            format_version: MODEL_FORMAT_VERSION,
            layers,
        })
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model ({} layers):", self.num_layers())?;
        for (index, layer) in self.iter_layers().enumerate() {
            writeln!(
                f,
                "  [{index}] {} (size {}) reads {:?}",
                layer.runtime_type_name(),
                layer.size(),
                self.upstream_of(index),
            )?;
        }
        Ok(())
    }
}
