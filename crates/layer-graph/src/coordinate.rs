// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-level addresses into a model's layers.

use std::fmt;

/// The address of one scalar output: element `element_index` of the layer at
/// `layer_index` in the owning [`crate::Model`].
///
/// A coordinate is a plain index pair, not a reference. It is only meaningful
/// against the model it was built for, and a layer may only hold coordinates
/// into layers that precede it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Coordinate {
    pub layer_index: usize,
    pub element_index: usize,
}

impl Coordinate {
    pub const fn new(layer_index: usize, element_index: usize) -> Self {
        Self {
            layer_index,
            element_index,
        }
    }

    /// Returns coordinates for elements `0..size` of one layer.
    pub fn range(layer_index: usize, size: usize) -> Vec<Coordinate> {
        (0..size).map(|e| Coordinate::new(layer_index, e)).collect()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.layer_index, self.element_index)
    }
}
