// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/linear.json"
//! row_format = "sparse"
//! has_weight = false
//! max_feature_index = 16777215
//! num_threads = 4
//! shuffle_seed = 42
//! output_coordinates = [
//!     { layer_index = 2, element_index = 0 },
//! ]
//! ```

use dataset::{
    DenseEntryParser, EntryParser, RowConvention, SparseEntryParser, DEFAULT_MAX_FEATURE_INDEX,
};
use layer_graph::Coordinate;
use std::path::{Path, PathBuf};

use crate::RuntimeError;

/// Text layout of example rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFormat {
    /// `label [weight] index:value ...`
    #[default]
    Sparse,
    /// `label [weight] v0 v1 ...`
    Dense,
}

/// Configuration for the evaluation pipeline.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Path to the persisted model document.
    pub model_path: PathBuf,
    /// Layout of the example rows.
    #[serde(default)]
    pub row_format: RowFormat,
    /// Whether each row carries a weight after the label.
    #[serde(default)]
    pub has_weight: bool,
    /// Rows naming a feature index above this are rejected.
    #[serde(default = "default_max_feature_index")]
    pub max_feature_index: usize,
    /// Number of worker threads (defaults to number of online CPU cores).
    pub num_threads: Option<usize>,
    /// When set, the loaded dataset is shuffled with this seed.
    pub shuffle_seed: Option<u64>,
    /// Coordinates to resolve per example. Empty means every element of the
    /// model's last layer.
    #[serde(default)]
    pub output_coordinates: Vec<Coordinate>,
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// The row convention implied by `has_weight` and `max_feature_index`.
    pub fn row_convention(&self) -> RowConvention {
        RowConvention::new(self.has_weight).with_max_feature_index(self.max_feature_index)
    }

    /// Creates the entry parser for the configured row format.
    pub fn create_parser(&self) -> Box<dyn EntryParser + Send + Sync> {
        let convention = self.row_convention();
        match self.row_format {
            RowFormat::Sparse => Box::new(SparseEntryParser::new(convention)),
            RowFormat::Dense => Box::new(DenseEntryParser::new(convention)),
        }
    }
}

fn default_max_feature_index() -> usize {
    DEFAULT_MAX_FEATURE_INDEX
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./model.json"),
            row_format: RowFormat::Sparse,
            has_weight: false,
            max_feature_index: DEFAULT_MAX_FEATURE_INDEX,
            num_threads: None,
            shuffle_seed: None,
            output_coordinates: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.row_format, RowFormat::Sparse);
        assert!(!c.has_weight);
        assert!(c.output_coordinates.is_empty());
        assert_eq!(c.shuffle_seed, None);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
model_path = "/tmp/model.json"
row_format = "dense"
has_weight = true
num_threads = 2
shuffle_seed = 7
output_coordinates = [
    { layer_index = 3, element_index = 1 },
    { layer_index = 0, element_index = 0 },
]
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.model_path, PathBuf::from("/tmp/model.json"));
        assert_eq!(c.row_format, RowFormat::Dense);
        assert!(c.has_weight);
        assert_eq!(c.num_threads, Some(2));
        assert_eq!(c.shuffle_seed, Some(7));
        assert_eq!(
            c.output_coordinates,
            vec![Coordinate::new(3, 1), Coordinate::new(0, 0)]
        );
    }

    #[test]
    fn test_minimal_toml() {
        let c = RuntimeConfig::from_toml(r#"model_path = "m.json""#).unwrap();
        assert_eq!(c.row_format, RowFormat::Sparse);
        assert!(!c.has_weight);
        assert_eq!(c.num_threads, None);
        assert_eq!(c.max_feature_index, DEFAULT_MAX_FEATURE_INDEX);
    }

    #[test]
    fn test_max_feature_index_reaches_parser() {
        let c = RuntimeConfig::from_toml("model_path = \"m\"\nmax_feature_index = 2").unwrap();
        assert_eq!(c.row_convention().max_feature_index, 2);
        let parser = c.create_parser();
        assert!(parser.parse(0, "1 2:1").is_ok());
        assert!(parser.parse(0, "1 3:1").is_err());
    }

    #[test]
    fn test_unknown_row_format() {
        let err = RuntimeConfig::from_toml("model_path = \"m\"\nrow_format = \"csv\"").unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigError(_)));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig {
            shuffle_seed: Some(11),
            output_coordinates: vec![Coordinate::new(1, 2)],
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back.shuffle_seed, Some(11));
        assert_eq!(back.output_coordinates, c.output_coordinates);
        assert_eq!(back.row_format, c.row_format);
    }

    #[test]
    fn test_create_parser() {
        let sparse = RuntimeConfig::default().create_parser();
        assert_eq!(sparse.parse(0, "1 2:5").unwrap().features, vec![(2, 5.0)]);

        let dense = RuntimeConfig {
            row_format: RowFormat::Dense,
            has_weight: true,
            ..Default::default()
        };
        let entries = dense.create_parser().parse(0, "1 0.5 3 4").unwrap();
        assert_eq!(entries.weight, Some(0.5));
        assert_eq!(entries.features, vec![(0, 3.0), (1, 4.0)]);
    }

    #[test]
    fn test_resolve_threads() {
        let c = RuntimeConfig {
            num_threads: Some(8),
            ..Default::default()
        };
        assert_eq!(c.resolve_threads(), 8);
        assert!(RuntimeConfig::default().resolve_threads() >= 1);
    }
}
