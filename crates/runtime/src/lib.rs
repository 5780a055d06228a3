// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! Wires the dataset pipeline to the layer graph.
//!
//! The runtime takes:
//! - A [`Model`](layer_graph::Model) from `layer-graph`, built in code or
//!   loaded from the path in [`RuntimeConfig`].
//! - A row source from `dataset`, parsed with the configured row format.
//!
//! It loads the rows into a [`RowDataset`](dataset::RowDataset), grows the
//! model's input layer to fit, and resolves the output coordinates for every
//! example.
//!
//! # Type-State Pipeline
//! ```text
//! Pipeline<Idle> → Pipeline<Loaded>
//! ```
//! Evaluating before a dataset is loaded does not compile.
//!
//! # Parallel Evaluation
//! Examples are evaluated on a `rayon` pool sized from the config. The model
//! is shared read-only; each worker owns its activation cache.

mod config;
mod engine;
mod error;
mod metrics;

pub use config::{RowFormat, RuntimeConfig};
pub use engine::{EvaluationOutput, Idle, Loaded, Pipeline, PipelineState};
pub use error::RuntimeError;
pub use metrics::EvaluationMetrics;
