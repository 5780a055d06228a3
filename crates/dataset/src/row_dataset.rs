// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! An ordered, reorderable collection of supervised examples.
//!
//! Row windows are given as `(from_row_index, size)`; a `size` of zero means
//! "through the last row".

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{DatasetError, Result};
use crate::example::SupervisedExample;
use crate::parser::EntryParser;
use crate::parsing_iterator::ParsingIterator;
use crate::source::RowSource;
use crate::vector::{DataVector, SparseDataVector};

/// Examples in row order, plus the largest feature vector size among them.
#[derive(Debug)]
pub struct RowDataset<V = SparseDataVector> {
    examples: Vec<SupervisedExample<V>>,
    max_data_vector_size: usize,
}

impl<V> Default for RowDataset<V> {
    fn default() -> Self {
        Self {
            examples: Vec::new(),
            max_data_vector_size: 0,
        }
    }
}

impl<V: DataVector> Clone for RowDataset<V> {
    /// Equivalent to a full-range [`shallow_copy`](Self::shallow_copy).
    fn clone(&self) -> Self {
        Self {
            examples: self.examples.clone(),
            max_data_vector_size: self.max_data_vector_size,
        }
    }
}

impl<V: DataVector> RowDataset<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains `iterator` into a new dataset.
    pub fn from_parsing_iterator<S, P>(iterator: ParsingIterator<S, P, V>) -> Result<Self>
    where
        S: RowSource,
        P: EntryParser,
    {
        let mut dataset = Self::new();
        dataset.load_from(iterator)?;
        Ok(dataset)
    }

    /// Appends every example `iterator` produces and returns how many were
    /// added. Stops at the first parse or source error.
    pub fn load_from<S, P>(&mut self, mut iterator: ParsingIterator<S, P, V>) -> Result<usize>
    where
        S: RowSource,
        P: EntryParser,
    {
        let before = self.examples.len();
        while iterator.is_valid() {
            self.add_example(iterator.get()?);
            iterator.advance()?;
        }
        let added = self.examples.len() - before;
        tracing::debug!(
            "loaded {added} examples (total {}, max vector size {})",
            self.examples.len(),
            self.max_data_vector_size,
        );
        Ok(added)
    }

    pub fn add_example(&mut self, example: SupervisedExample<V>) {
        self.max_data_vector_size = self
            .max_data_vector_size
            .max(example.data_vector().size());
        self.examples.push(example);
    }

    pub fn num_examples(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn max_data_vector_size(&self) -> usize {
        self.max_data_vector_size
    }

    pub fn example(&self, index: usize) -> Result<&SupervisedExample<V>> {
        self.examples
            .get(index)
            .ok_or_else(|| DatasetError::out_of_range("example", index, self.examples.len()))
    }

    pub fn examples(&self) -> &[SupervisedExample<V>] {
        &self.examples
    }

    /// Writes `value` at `feature_index` of the example at `row_index`.
    ///
    /// Shallow copies holding that example see the write. The feature index
    /// must be below the vector's size, so the maximum vector size of every
    /// sharing dataset stays valid.
    pub fn set_feature(&self, row_index: usize, feature_index: usize, value: f64) -> Result<()> {
        self.example(row_index)?.set_feature(feature_index, value)
    }

    /// Iterates over the examples in a row window.
    pub fn iter_window(
        &self,
        from_row_index: usize,
        size: usize,
    ) -> Result<std::slice::Iter<'_, SupervisedExample<V>>> {
        let range = self.window(from_row_index, size)?;
        Ok(self.examples[range].iter())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SupervisedExample<V>> {
        self.examples.iter()
    }

    /// Shuffles all examples uniformly.
    pub fn random_permute<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.examples.shuffle(rng);
    }

    /// Fills the first `count` rows with a uniformly random ordered sample of
    /// all rows (partial Fisher–Yates). The remaining rows keep whatever
    /// order the swaps leave them in.
    pub fn random_permute_prefix<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> Result<()> {
        let n = self.examples.len();
        if count > n {
            return Err(DatasetError::out_of_range("permutation count", count, n));
        }
        for i in 0..count {
            let j = rng.gen_range(i..n);
            self.examples.swap(i, j);
        }
        Ok(())
    }

    /// Sorts a row window by ascending key. Ties end up in no particular order.
    pub fn sort_by_key<K, F>(&mut self, key: F, from_row_index: usize, size: usize) -> Result<()>
    where
        K: Ord,
        F: FnMut(&SupervisedExample<V>) -> K,
    {
        let range = self.window(from_row_index, size)?;
        self.examples[range].sort_unstable_by_key(key);
        Ok(())
    }

    /// Like [`sort_by_key`](Self::sort_by_key) for floating-point keys,
    /// ordered by [`f64::total_cmp`].
    pub fn sort_by_float_key<F>(&mut self, mut key: F, from_row_index: usize, size: usize) -> Result<()>
    where
        F: FnMut(&SupervisedExample<V>) -> f64,
    {
        let range = self.window(from_row_index, size)?;
        self.examples[range].sort_unstable_by(|a, b| -> Ordering { key(a).total_cmp(&key(b)) });
        Ok(())
    }

    /// Copies a row window. The copy shares feature vector storage with `self`.
    pub fn shallow_copy(&self, from_row_index: usize, size: usize) -> Result<Self> {
        let range = self.window(from_row_index, size)?;
        Ok(self.examples[range]
            .iter()
            .map(SupervisedExample::shallow_clone)
            .collect())
    }

    /// Copies a row window, duplicating every feature vector.
    pub fn deep_copy(&self, from_row_index: usize, size: usize) -> Result<Self> {
        let range = self.window(from_row_index, size)?;
        Ok(self.examples[range]
            .iter()
            .map(SupervisedExample::deep_clone)
            .collect())
    }

    /// Removes every example.
    pub fn reset(&mut self) {
        self.examples.clear();
        self.max_data_vector_size = 0;
    }

    fn window(&self, from_row_index: usize, size: usize) -> Result<Range<usize>> {
        let n = self.examples.len();
        if from_row_index > n {
            return Err(DatasetError::out_of_range("window start", from_row_index, n));
        }
        if size == 0 {
            return Ok(from_row_index..n);
        }
        match from_row_index.checked_add(size) {
            Some(end) if end <= n => Ok(from_row_index..end),
            _ => Err(DatasetError::out_of_range(
                "window end",
                from_row_index.saturating_add(size),
                n,
            )),
        }
    }
}

impl<V: DataVector> FromIterator<SupervisedExample<V>> for RowDataset<V> {
    fn from_iter<I: IntoIterator<Item = SupervisedExample<V>>>(iter: I) -> Self {
        let mut dataset = Self::new();
        dataset.extend(iter);
        dataset
    }
}

impl<V: DataVector> Extend<SupervisedExample<V>> for RowDataset<V> {
    fn extend<I: IntoIterator<Item = SupervisedExample<V>>>(&mut self, iter: I) {
        for example in iter {
            self.add_example(example);
        }
    }
}

impl<'a, V: DataVector> IntoIterator for &'a RowDataset<V> {
    type Item = &'a SupervisedExample<V>;
    type IntoIter = std::slice::Iter<'a, SupervisedExample<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}

impl<V: DataVector> fmt::Display for RowDataset<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for example in &self.examples {
            writeln!(f, "{example}")?;
        }
        Ok(())
    }
}
