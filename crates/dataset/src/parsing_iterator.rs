// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Lazy conversion of raw rows into supervised examples.

use crate::error::{DatasetError, Result};
use crate::example::{ExampleBuilder, SupervisedExample};
use crate::parser::EntryParser;
use crate::source::RowSource;
use crate::vector::{DataVector, SparseDataVector};

/// Pairs a [`RowSource`] with an [`EntryParser`].
///
/// Each `advance` moves the source by exactly one row, and `get` parses the
/// current row without moving. Only the source's current row is held, so
/// memory use does not depend on the size of the input.
#[derive(Debug)]
pub struct ParsingIterator<S, P, V = SparseDataVector> {
    source: S,
    builder: ExampleBuilder<P, V>,
    row_index: usize,
}

impl<S: RowSource, P: EntryParser, V: DataVector> ParsingIterator<S, P, V> {
    pub fn new(source: S, parser: P) -> Self {
        Self {
            source,
            builder: ExampleBuilder::new(parser),
            row_index: 0,
        }
    }

    /// True until the source runs out of rows.
    pub fn is_valid(&self) -> bool {
        self.source.is_valid()
    }

    /// Moves to the next row. Fails once the iterator is exhausted.
    pub fn advance(&mut self) -> Result<()> {
        if !self.is_valid() {
            return Err(DatasetError::IteratorExhausted);
        }
        self.source.advance()?;
        self.row_index += 1;
        Ok(())
    }

    /// Parses the current row.
    pub fn get(&self) -> Result<SupervisedExample<V>> {
        if !self.is_valid() {
            return Err(DatasetError::IteratorExhausted);
        }
        self.builder.build(self.row_index, self.source.get()?)
    }

    /// Zero-based index of the current row among the rows seen so far.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Adapts into a standard iterator yielding one result per row.
    pub fn into_examples(self) -> Examples<S, P, V> {
        Examples {
            inner: self,
            pending: None,
            failed: false,
        }
    }
}

/// Standard-iterator view over a [`ParsingIterator`].
///
/// A row that fails to parse is yielded as an error and iteration continues
/// with the next row. A failing source yields its error once, then ends.
#[derive(Debug)]
pub struct Examples<S, P, V = SparseDataVector> {
    inner: ParsingIterator<S, P, V>,
    pending: Option<DatasetError>,
    failed: bool,
}

impl<S: RowSource, P: EntryParser, V: DataVector> Iterator for Examples<S, P, V> {
    type Item = Result<SupervisedExample<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending.take() {
            self.failed = true;
            return Some(Err(e));
        }
        if self.failed || !self.inner.is_valid() {
            return None;
        }
        let example = self.inner.get();
        if let Err(e) = self.inner.advance() {
            self.pending = Some(e);
        }
        Some(example)
    }
}

impl<S: RowSource, P: EntryParser, V: DataVector> std::iter::FusedIterator for Examples<S, P, V> {}
