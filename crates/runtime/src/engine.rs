// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The evaluation pipeline with type-state–enforced ordering.
//!
//! ```text
//! Pipeline<Idle>
//!     │  .load_dataset() / .load_dataset_file()
//!     ▼
//! Pipeline<Loaded>
//!     │  .evaluate()
//!     ▼
//!   EvaluationOutput
//! ```
//!
//! Loading consumes the idle pipeline, grows the model's input layer to the
//! widest example, and returns a pipeline that owns the dataset.

use std::path::Path;
use std::time::Instant;

use dataset::{
    DataVector, EntryParser, LineRowSource, ParsingIterator, RowDataset, RowSource,
    SparseDataVector,
};
use layer_graph::{Coordinate, Layer, LayerError, Model};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::{EvaluationMetrics, RuntimeConfig, RuntimeError};

// ── Type-state markers ─────────────────────────────────────────

/// A model is loaded but no examples are.
#[derive(Debug)]
pub struct Idle;

/// The pipeline owns a dataset whose examples carry vectors of type `V`.
#[derive(Debug)]
pub struct Loaded<V = SparseDataVector> {
    dataset: RowDataset<V>,
}

/// Marker trait for pipeline states.
pub trait PipelineState: std::fmt::Debug {}
impl PipelineState for Idle {}
impl<V: DataVector> PipelineState for Loaded<V> {}

// ── Evaluation output ──────────────────────────────────────────

/// The result of evaluating a dataset.
#[derive(Debug)]
pub struct EvaluationOutput {
    /// Coordinates resolved for every example, in column order.
    pub coordinates: Vec<Coordinate>,
    /// One row of values per example, in dataset order.
    pub rows: Vec<Vec<f64>>,
    pub metrics: EvaluationMetrics,
}

// ── Pipeline ───────────────────────────────────────────────────

/// Feeds examples to a model and resolves output coordinates for each.
///
/// `S` is a type-state marker: [`evaluate`](Pipeline::evaluate) is only
/// available once a dataset is loaded.
///
/// # Example
/// ```
/// use dataset::VecRowSource;
/// use layer_graph::layers::Sum;
/// use layer_graph::{Coordinate, Model};
/// use runtime::{Pipeline, RuntimeConfig};
///
/// let mut model = Model::with_input_size(2);
/// model.add_layer(Box::new(Sum::single(Coordinate::range(0, 2)))).unwrap();
///
/// let rows = VecRowSource::new(["1 0:1 1:2", "0 1:5"]);
/// let pipeline = Pipeline::new(RuntimeConfig::default(), model)
///     .load_dataset(rows)
///     .unwrap();
/// let output = pipeline.evaluate().unwrap();
/// assert_eq!(output.rows, vec![vec![3.0], vec![5.0]]);
/// ```
pub struct Pipeline<S: PipelineState = Idle> {
    config: RuntimeConfig,
    model: Model,
    state: S,
}

impl<S: PipelineState> Pipeline<S> {
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The coordinates resolved per example: the configured list, or every
    /// element of the model's last layer when none is configured.
    pub fn output_coordinates(&self) -> Result<Vec<Coordinate>, RuntimeError> {
        if self.config.output_coordinates.is_empty() {
            return Ok(self.model.output_coordinates());
        }
        for &c in &self.config.output_coordinates {
            self.model.validate_coordinate(c)?;
        }
        Ok(self.config.output_coordinates.clone())
    }

    /// Evaluates every example of `dataset` in parallel.
    ///
    /// Each worker keeps its own activation cache and reuses it across the
    /// examples it handles. Features wider than the model's input are
    /// truncated.
    pub fn evaluate_dataset<V: DataVector>(
        &self,
        dataset: &RowDataset<V>,
    ) -> Result<EvaluationOutput, RuntimeError> {
        let coordinates = self.output_coordinates()?;
        let threads = self.config.resolve_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| RuntimeError::ThreadPool(e.to_string()))?;

        tracing::debug!(
            "evaluating {} examples x {} coordinates on {threads} threads",
            dataset.num_examples(),
            coordinates.len(),
        );

        let start = Instant::now();
        let model = &self.model;
        let width = model.input().size();
        let results = pool.install(|| {
            dataset
                .examples()
                .par_iter()
                .map_init(
                    || model.evaluation(&[]),
                    |evaluation, example| -> Result<(Vec<f64>, usize), LayerError> {
                        evaluation.reset(&example.data_vector().to_dense(width));
                        let values = evaluation.resolve_all(&coordinates)?;
                        Ok((values, evaluation.layers_computed()))
                    },
                )
                .collect::<Result<Vec<_>, LayerError>>()
        })?;

        let mut metrics = EvaluationMetrics::new(threads, coordinates.len());
        let mut rows = Vec::with_capacity(results.len());
        for (values, layers_computed) in results {
            metrics.record_example(layers_computed);
            rows.push(values);
        }
        metrics.finalise(start.elapsed());
        tracing::info!("{}", metrics.summary());

        Ok(EvaluationOutput {
            coordinates,
            rows,
            metrics,
        })
    }
}

// ── Idle → Loaded ──────────────────────────────────────────────

impl Pipeline<Idle> {
    /// Creates a pipeline around an already-built model.
    pub fn new(config: RuntimeConfig, model: Model) -> Self {
        tracing::info!("pipeline created: {}", model.summary());
        Self {
            config,
            model,
            state: Idle,
        }
    }

    /// Loads the model named by `config.model_path`.
    pub fn from_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let model = Model::from_file(&config.model_path)?;
        Ok(Self::new(config, model))
    }

    /// Parses every row of `source` into sparse examples.
    ///
    /// See [`load_dataset_as`](Self::load_dataset_as).
    pub fn load_dataset<S: RowSource>(
        self,
        source: S,
    ) -> Result<Pipeline<Loaded<SparseDataVector>>, RuntimeError> {
        self.load_dataset_as(source)
    }

    /// Opens a row file and loads it with [`load_dataset`](Self::load_dataset).
    pub fn load_dataset_file(
        self,
        path: &Path,
    ) -> Result<Pipeline<Loaded<SparseDataVector>>, RuntimeError> {
        let source = LineRowSource::open(path)?;
        self.load_dataset(source)
    }

    /// Parses every row of `source` with the configured parser, shuffles the
    /// result when a seed is configured, and grows the model's input layer to
    /// the widest example. Fails on the first bad row.
    pub fn load_dataset_as<V: DataVector, S: RowSource>(
        mut self,
        source: S,
    ) -> Result<Pipeline<Loaded<V>>, RuntimeError> {
        let iterator: ParsingIterator<S, Box<dyn EntryParser + Send + Sync>, V> =
            ParsingIterator::new(source, self.config.create_parser());
        let mut dataset = RowDataset::from_parsing_iterator(iterator)?;

        if let Some(seed) = self.config.shuffle_seed {
            dataset.random_permute(&mut StdRng::seed_from_u64(seed));
            tracing::debug!("shuffled dataset with seed {seed}");
        }

        self.model.increase_input_size(dataset.max_data_vector_size());
        tracing::info!(
            "loaded {} examples, input size now {}",
            dataset.num_examples(),
            self.model.input().size(),
        );

        Ok(Pipeline {
            config: self.config,
            model: self.model,
            state: Loaded { dataset },
        })
    }
}

// ── Loaded: evaluate ───────────────────────────────────────────

impl<V: DataVector> Pipeline<Loaded<V>> {
    pub fn dataset(&self) -> &RowDataset<V> {
        &self.state.dataset
    }

    /// Evaluates the loaded dataset.
    pub fn evaluate(&self) -> Result<EvaluationOutput, RuntimeError> {
        self.evaluate_dataset(&self.state.dataset)
    }

    /// Drops the dataset and returns to the idle state, keeping the grown
    /// model.
    pub fn unload(self) -> (Pipeline<Idle>, RowDataset<V>) {
        let pipeline = Pipeline {
            config: self.config,
            model: self.model,
            state: Idle,
        };
        (pipeline, self.state.dataset)
    }
}

impl<S: PipelineState> std::fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("state", &std::any::type_name::<S>())
            .field("model_layers", &self.model.num_layers())
            .field("input_size", &self.model.input().size())
            .field("row_format", &self.config.row_format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RowFormat;
    use dataset::{DenseDataVector, VecRowSource};
    use layer_graph::layers::{Coordinatewise, Operation, Sum};

    /// Input(n) → scale by (1, 2, ..., n) → sum.
    fn weighted_sum(n: usize) -> Model {
        let mut model = Model::with_input_size(n);
        let weights: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        let scaled = model
            .add_layer(Box::new(
                Coordinatewise::new(Operation::Multiply, weights, Coordinate::range(0, n))
                    .unwrap(),
            ))
            .unwrap();
        model
            .add_layer(Box::new(Sum::single(Coordinate::range(scaled, n))))
            .unwrap();
        model
    }

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            num_threads: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_idle_to_loaded() {
        let pipeline = Pipeline::new(config(), weighted_sum(2))
            .load_dataset(VecRowSource::new(["1 0:1", "0 1:1"]))
            .unwrap();
        assert_eq!(pipeline.dataset().num_examples(), 2);
    }

    #[test]
    fn test_load_grows_input() {
        let pipeline = Pipeline::new(config(), weighted_sum(2))
            .load_dataset(VecRowSource::new(["1 0:1", "0 6:1"]))
            .unwrap();
        assert_eq!(pipeline.model().input().size(), 7);
    }

    #[test]
    fn test_evaluate() {
        let pipeline = Pipeline::new(config(), weighted_sum(3))
            .load_dataset(VecRowSource::new(["1 0:1 1:1 2:1", "0 2:2", "1"]))
            .unwrap();
        let output = pipeline.evaluate().unwrap();

        assert_eq!(output.coordinates, vec![Coordinate::new(2, 0)]);
        assert_eq!(output.rows, vec![vec![6.0], vec![6.0], vec![0.0]]);
        assert_eq!(output.metrics.examples, 3);
        assert_eq!(output.metrics.layers_computed, 6);
    }

    #[test]
    fn test_extra_features_ignored_by_model() {
        // Feature 5 widens the input but no layer reads it.
        let pipeline = Pipeline::new(config(), weighted_sum(2))
            .load_dataset(VecRowSource::new(["1 0:1 5:100"]))
            .unwrap();
        assert_eq!(pipeline.evaluate().unwrap().rows, vec![vec![1.0]]);
    }

    #[test]
    fn test_configured_coordinates() {
        let cfg = RuntimeConfig {
            output_coordinates: vec![Coordinate::new(1, 1), Coordinate::new(0, 0)],
            ..config()
        };
        let pipeline = Pipeline::new(cfg, weighted_sum(2))
            .load_dataset(VecRowSource::new(["1 0:3 1:4"]))
            .unwrap();
        assert_eq!(pipeline.evaluate().unwrap().rows, vec![vec![8.0, 3.0]]);
    }

    #[test]
    fn test_invalid_configured_coordinate() {
        let cfg = RuntimeConfig {
            output_coordinates: vec![Coordinate::new(9, 0)],
            ..config()
        };
        let pipeline = Pipeline::new(cfg, weighted_sum(2));
        assert!(matches!(
            pipeline.output_coordinates(),
            Err(RuntimeError::Layer(LayerError::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_dense_rows_as_dense_vectors() {
        let cfg = RuntimeConfig {
            row_format: RowFormat::Dense,
            has_weight: true,
            ..config()
        };
        let pipeline = Pipeline::new(cfg, weighted_sum(2))
            .load_dataset_as::<DenseDataVector, _>(VecRowSource::new(["1 0.5 2,3"]))
            .unwrap();
        let example = pipeline.dataset().example(0).unwrap();
        assert_eq!(example.weight(), 0.5);
        assert_eq!(example.data_vector().as_slice(), &[2.0, 3.0]);
        assert_eq!(pipeline.evaluate().unwrap().rows, vec![vec![8.0]]);
    }

    #[test]
    fn test_bad_row_fails_load() {
        let result = Pipeline::new(config(), weighted_sum(1))
            .load_dataset(VecRowSource::new(["1 0:1", "1 0-1"]));
        assert!(matches!(
            result,
            Err(RuntimeError::Dataset(dataset::DatasetError::Parse { row: 1, .. }))
        ));
    }

    #[test]
    fn test_unload_keeps_model() {
        let loaded = Pipeline::new(config(), weighted_sum(1))
            .load_dataset(VecRowSource::new(["1 3:1"]))
            .unwrap();
        let (idle, data) = loaded.unload();
        assert_eq!(data.num_examples(), 1);
        assert_eq!(idle.model().input().size(), 4);
    }

    #[test]
    fn test_evaluate_external_dataset() {
        let pipeline = Pipeline::new(config(), weighted_sum(2));
        let data: RowDataset = RowDataset::new();
        let output = pipeline.evaluate_dataset(&data).unwrap();
        assert!(output.rows.is_empty());
        assert_eq!(output.metrics.examples_per_second(), 0.0);
    }

    #[test]
    fn test_debug_format() {
        let pipeline = Pipeline::new(config(), weighted_sum(2));
        let debug = format!("{pipeline:?}");
        assert!(debug.contains("Pipeline"));
        assert!(debug.contains("Idle"));
    }
}
