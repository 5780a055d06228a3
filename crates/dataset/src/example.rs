// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supervised examples and the builder that turns parsed rows into them.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use crate::error::{DatasetError, Result};
use crate::parser::EntryParser;
use crate::vector::{DataVector, SparseDataVector};

/// Weight given to examples whose row carries none.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A feature vector with its label and weight.
///
/// The feature vector sits behind an `Arc<RwLock<_>>`. [`shallow_clone`]
/// shares it, so a [`set_feature`] through either copy is seen by both.
/// [`deep_clone`] gives the copy storage of its own.
///
/// [`shallow_clone`]: SupervisedExample::shallow_clone
/// [`deep_clone`]: SupervisedExample::deep_clone
/// [`set_feature`]: SupervisedExample::set_feature
#[derive(Debug)]
pub struct SupervisedExample<V = SparseDataVector> {
    data: Arc<RwLock<V>>,
    label: f64,
    weight: f64,
}

impl<V: DataVector> SupervisedExample<V> {
    pub fn new(data_vector: V, label: f64) -> Self {
        Self::with_weight(data_vector, label, DEFAULT_WEIGHT)
    }

    pub fn with_weight(data_vector: V, label: f64, weight: f64) -> Self {
        Self {
            data: Arc::new(RwLock::new(data_vector)),
            label,
            weight,
        }
    }

    /// Read access to the feature vector. Writers through shallow copies
    /// block while the guard is held.
    pub fn data_vector(&self) -> RwLockReadGuard<'_, V> {
        // Writers only call `DataVector::set`, which leaves the vector whole
        // even if it panics, so a poisoned lock is still readable.
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes `value` at feature `index` in the shared storage.
    ///
    /// `index` must be below the vector's size, so the write never changes the
    /// size seen by any dataset holding a shallow copy.
    pub fn set_feature(&self, index: usize, value: f64) -> Result<()> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let size = data.size();
        if index >= size {
            return Err(DatasetError::out_of_range("feature index", index, size));
        }
        data.set(index, value)
    }

    pub fn label(&self) -> f64 {
        self.label
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Copies the record, sharing the feature vector.
    pub fn shallow_clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            label: self.label,
            weight: self.weight,
        }
    }

    /// Copies the record together with its feature vector.
    pub fn deep_clone(&self) -> Self {
        let data = V::clone(&self.data_vector());
        Self::with_weight(data, self.label, self.weight)
    }

    /// True when both examples read the same feature vector storage.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<V: DataVector> Clone for SupervisedExample<V> {
    fn clone(&self) -> Self {
        self.shallow_clone()
    }
}

impl<V: DataVector> fmt::Display for SupervisedExample<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.label, self.weight, self.data_vector())
    }
}

// ── Builder ────────────────────────────────────────────────────

/// Builds examples of vector type `V` from raw rows using parser `P`.
#[derive(Debug, Clone)]
pub struct ExampleBuilder<P, V = SparseDataVector> {
    parser: P,
    _vector: PhantomData<fn() -> V>,
}

impl<P: EntryParser, V: DataVector> ExampleBuilder<P, V> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _vector: PhantomData,
        }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Parses `row` (the `row_index`-th row of its source) into an example.
    pub fn build(&self, row_index: usize, row: &str) -> Result<SupervisedExample<V>> {
        let entries = self.parser.parse(row_index, row)?;
        let data_vector = V::from_entries(entries.features)
            .map_err(|e| DatasetError::parse(row_index, e.to_string()))?;
        Ok(SupervisedExample::with_weight(
            data_vector,
            entries.label,
            entries.weight.unwrap_or(DEFAULT_WEIGHT),
        ))
    }
}
