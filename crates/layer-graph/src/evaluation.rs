// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Forward evaluation of coordinates with a per-pass activation cache.
//!
//! An [`Evaluation`] borrows an immutable [`Model`] and owns its cache, so
//! any number of passes may run over the same model concurrently, one per
//! thread. Within a pass each layer is computed at most once.

use crate::layer::Layer;
use crate::{Activations, Coordinate, LayerError, Model};

/// One evaluation pass over a fixed input feature vector.
#[derive(Debug)]
pub struct Evaluation<'m> {
    model: &'m Model,
    /// Slot `i` holds layer `i`'s outputs once computed.
    activations: Vec<Option<Vec<f64>>>,
    layers_computed: usize,
}

impl<'m> Evaluation<'m> {
    pub(crate) fn new(model: &'m Model, features: &[f64]) -> Self {
        let mut evaluation = Self {
            model,
            activations: vec![None; model.num_layers()],
            layers_computed: 0,
        };
        evaluation.reset(features);
        evaluation
    }

    /// Clears the cache and loads a new feature vector, keeping the pass
    /// bound to the same model.
    ///
    /// Features beyond the input size are ignored; missing ones are zero.
    pub fn reset(&mut self, features: &[f64]) {
        let size = self.model.input().size();
        let mut input = vec![0.0; size];
        let n = features.len().min(size);
        input[..n].copy_from_slice(&features[..n]);

        self.activations.iter_mut().for_each(|slot| *slot = None);
        self.activations[0] = Some(input);
        self.layers_computed = 0;
    }

    /// Resolves the scalar at `coordinate`, computing upstream layers first.
    pub fn resolve(&mut self, coordinate: Coordinate) -> Result<f64, LayerError> {
        self.model.validate_coordinate(coordinate)?;
        self.ensure_layer(coordinate.layer_index)?;
        Activations::new(&self.activations).value(coordinate)
    }

    /// Resolves every coordinate in order, sharing the cache.
    pub fn resolve_all(&mut self, coordinates: &[Coordinate]) -> Result<Vec<f64>, LayerError> {
        coordinates.iter().map(|&c| self.resolve(c)).collect()
    }

    /// Returns all outputs of layer `index`, computing it if needed.
    pub fn layer_values(&mut self, index: usize) -> Result<&[f64], LayerError> {
        self.model.layer(index)?;
        self.ensure_layer(index)?;
        self.activations[index]
            .as_deref()
            .ok_or(LayerError::Unresolved { layer_index: index })
    }

    /// Number of `Layer::compute` calls made since the last reset.
    pub fn layers_computed(&self) -> usize {
        self.layers_computed
    }

    /// Computes `target` and everything it depends on, in dependency order.
    ///
    /// Uses an explicit stack so deep graphs do not exhaust the call stack.
    fn ensure_layer(&mut self, target: usize) -> Result<(), LayerError> {
        let model = self.model;
        let mut stack = vec![(target, false)];

        while let Some((index, expanded)) = stack.pop() {
            if self.activations[index].is_some() {
                continue;
            }
            if expanded {
                let layer = model.layer(index)?;
                let mut outputs = vec![0.0; layer.size()];
                layer.compute(&Activations::new(&self.activations), &mut outputs)?;
                self.activations[index] = Some(outputs);
                self.layers_computed += 1;
            } else {
                stack.push((index, true));
                stack.extend(
                    model
                        .upstream_of(index)
                        .iter()
                        .filter(|&&up| self.activations[up].is_none())
                        .map(|&up| (up, false)),
                );
            }
        }
        Ok(())
    }
}
