// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # layer-graph
//!
//! An in-memory computation graph for small embeddable models.
//!
//! - [`Coordinate`] — `(layer, element)` address of one scalar.
//! - [`Layer`] — the polymorphic computation node; built-ins live in [`layers`].
//! - [`Model`] — an append-only arena of layers rooted at an [`layers::Input`].
//!   Coordinates only point backwards, so the graph is a DAG by construction.
//! - [`Evaluation`] — one forward pass with its own activation cache.
//! - [`LayerRegistry`] — type name → factory map used to rebuild layers from
//!   versioned records.
//!
//! # Example
//! ```
//! use layer_graph::layers::{Coordinatewise, Operation, Sum};
//! use layer_graph::{Coordinate, Model};
//!
//! let mut model = Model::with_input_size(2);
//! let scaled = model
//!     .add_layer(Box::new(
//!         Coordinatewise::new(Operation::Multiply, vec![2.0, 3.0], Coordinate::range(0, 2))
//!             .unwrap(),
//!     ))
//!     .unwrap();
//! let total = model
//!     .add_layer(Box::new(Sum::single(Coordinate::range(scaled, 2))))
//!     .unwrap();
//!
//! let out = model.compute(&[1.0, 1.0], &[Coordinate::new(total, 0)]).unwrap();
//! assert_eq!(out, vec![5.0]);
//!
//! let restored = Model::from_json(&model.to_json().unwrap()).unwrap();
//! assert_eq!(restored.num_layers(), 3);
//! ```

mod coordinate;
mod error;
mod evaluation;
mod layer;
pub mod layers;
mod model;
pub mod record;
mod registry;

pub use coordinate::Coordinate;
pub use error::LayerError;
pub use evaluation::Evaluation;
pub use layer::{Activations, CoordinateIterator, Layer, RegisteredLayer};
pub use model::{Model, MODEL_FORMAT_VERSION};
pub use record::{RecordReader, RecordWriter};
pub use registry::{LayerFactory, LayerRegistry};
