// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Evaluation profiling metrics.
//!
//! [`EvaluationMetrics`] collects wall-clock time, per-example layer work,
//! and throughput for one batch evaluation.

use std::time::Duration;

/// Aggregate metrics for a batch evaluation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EvaluationMetrics {
    /// Total wall-clock time for the batch.
    pub total_duration: Duration,
    /// Number of examples evaluated.
    pub examples: usize,
    /// Coordinates resolved per example.
    pub coordinates_per_example: usize,
    /// Sum over examples of the layers computed for that example.
    pub layers_computed: usize,
    /// Worker threads used.
    pub num_threads: usize,
}

impl EvaluationMetrics {
    /// Creates an empty metrics container.
    pub fn new(num_threads: usize, coordinates_per_example: usize) -> Self {
        Self {
            total_duration: Duration::ZERO,
            examples: 0,
            coordinates_per_example,
            layers_computed: 0,
            num_threads,
        }
    }

    /// Records one evaluated example.
    pub fn record_example(&mut self, layers_computed: usize) {
        self.examples += 1;
        self.layers_computed += layers_computed;
    }

    /// Finalises metrics with the total wall-clock time.
    pub fn finalise(&mut self, total: Duration) {
        self.total_duration = total;
    }

    /// Returns examples per second throughput.
    pub fn examples_per_second(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs <= 0.0 || self.examples == 0 {
            return 0.0;
        }
        self.examples as f64 / secs
    }

    /// Mean number of layers computed per example.
    pub fn layers_per_example(&self) -> f64 {
        if self.examples == 0 {
            return 0.0;
        }
        self.layers_computed as f64 / self.examples as f64
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Evaluation: {:.2}ms total, {} examples x {} coordinates on {} threads, \
             {:.1} layers/example ({:.1} ex/s)",
            self.total_duration.as_secs_f64() * 1000.0,
            self.examples,
            self.coordinates_per_example,
            self.num_threads,
            self.layers_per_example(),
            self.examples_per_second(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let m = EvaluationMetrics::new(4, 2);
        assert_eq!(m.examples_per_second(), 0.0);
        assert_eq!(m.layers_per_example(), 0.0);
        assert_eq!(m.num_threads, 4);
    }

    #[test]
    fn test_record_and_finalise() {
        let mut m = EvaluationMetrics::new(2, 1);
        m.record_example(3);
        m.record_example(5);
        m.finalise(Duration::from_millis(30));

        assert_eq!(m.examples, 2);
        assert_eq!(m.layers_computed, 8);
        assert!((m.layers_per_example() - 4.0).abs() < 1e-12);
        assert!(m.examples_per_second() > 0.0);
    }

    #[test]
    fn test_summary_format() {
        let mut m = EvaluationMetrics::new(2, 3);
        m.record_example(1);
        m.finalise(Duration::from_millis(10));

        let s = m.summary();
        assert!(s.contains("Evaluation:"));
        assert!(s.contains("1 examples x 3 coordinates"));
        assert!(s.contains("2 threads"));
    }

    #[test]
    fn test_examples_per_second() {
        let mut m = EvaluationMetrics::new(1, 1);
        for _ in 0..100 {
            m.record_example(1);
        }
        m.finalise(Duration::from_secs(2));
        assert!((m.examples_per_second() - 50.0).abs() < 0.01);
    }
}
