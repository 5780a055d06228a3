// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # dataset
//!
//! Storage and lazy loading of supervised examples.
//!
//! - [`DataVector`]: the feature vector contract, with [`DenseDataVector`]
//!   and [`SparseDataVector`] implementations.
//! - [`SupervisedExample`]: feature vector, label, and weight. Shallow
//!   copies share the vector, including writes to it.
//! - [`RowSource`] / [`EntryParser`]: where raw rows come from and how one
//!   row is split into fields.
//! - [`ParsingIterator`]: pulls one row at a time from a source and parses
//!   it on demand.
//! - [`RowDataset`]: the ordered container. Append, permute, sort, copy.
//!
//! # Example
//! ```
//! use dataset::{ParsingIterator, RowDataset, SparseEntryParser, VecRowSource};
//!
//! let rows = VecRowSource::new(["1 0:0.5 3:2", "0 1:1", "1 2:4"]);
//! let iterator = ParsingIterator::new(rows, SparseEntryParser::default());
//! let mut data: RowDataset = RowDataset::from_parsing_iterator(iterator).unwrap();
//! assert_eq!(data.num_examples(), 3);
//! assert_eq!(data.max_data_vector_size(), 4);
//!
//! data.sort_by_float_key(|e| e.label(), 0, 0).unwrap();
//! assert_eq!(data.example(0).unwrap().label(), 0.0);
//! ```

mod error;
mod example;
mod parser;
mod parsing_iterator;
mod row_dataset;
mod source;
mod vector;

pub use error::{DatasetError, Result};
pub use example::{ExampleBuilder, SupervisedExample, DEFAULT_WEIGHT};
pub use parser::{
    DenseEntryParser, EntryParser, RowConvention, RowEntries, SparseEntryParser,
    DEFAULT_MAX_FEATURE_INDEX,
};
pub use parsing_iterator::{Examples, ParsingIterator};
pub use row_dataset::RowDataset;
pub use source::{LineRowSource, RowSource, VecRowSource};
pub use vector::{DataVector, DenseDataVector, EntryIterator, SparseDataVector};
