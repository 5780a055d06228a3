// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the evaluation pipeline.

/// Errors that can occur while loading data or evaluating a model.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Building, loading, or evaluating the model failed.
    #[error("model error: {0}")]
    Layer(#[from] layer_graph::LayerError),

    /// Reading or parsing example rows failed.
    #[error("dataset error: {0}")]
    Dataset(#[from] dataset::DatasetError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
