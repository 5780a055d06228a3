// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Feature vectors carried by supervised examples.
//!
//! A vector's [`size`](DataVector::size) is one past the highest index that
//! may hold a non-zero value. Reads beyond it return zero. Writes may grow a
//! vector but never shrink it.

use std::fmt;

use crate::error::{DatasetError, Result};

/// Iterator over `(index, value)` pairs in increasing index order.
pub type EntryIterator<'a> = Box<dyn Iterator<Item = (usize, f64)> + 'a>;

/// Common contract for dense and sparse feature vectors.
pub trait DataVector: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Builds a vector from `(index, value)` entries in any order.
    /// A later entry for the same index overwrites an earlier one.
    ///
    /// Fails if an index leaves no room for a size, i.e. `usize::MAX`.
    fn from_entries(entries: Vec<(usize, f64)>) -> Result<Self>;

    fn size(&self) -> usize;

    /// Value at `index`, or zero when nothing is stored there.
    fn get(&self, index: usize) -> f64;

    /// Stored non-zero entries in increasing index order.
    fn nonzeros(&self) -> EntryIterator<'_>;

    /// Sets `index` to `value`, growing the vector if needed.
    fn set(&mut self, index: usize, value: f64) -> Result<()>;

    /// Expands into exactly `len` values, truncating or zero-padding.
    fn to_dense(&self, len: usize) -> Vec<f64> {
        let mut out = vec![0.0; len];
        for (i, v) in self.nonzeros().take_while(|&(i, _)| i < len) {
            out[i] = v;
        }
        out
    }
}

/// Sorts entries by index, keeping the last value written for each index.
fn normalize(mut entries: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    entries.sort_by_key(|&(i, _)| i);
    let mut out: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
    for (i, v) in entries {
        match out.last_mut() {
            Some(last) if last.0 == i => last.1 = v,
            _ => out.push((i, v)),
        }
    }
    out
}

/// The size needed to hold `index`.
fn size_for(index: usize) -> Result<usize> {
    index
        .checked_add(1)
        .ok_or_else(|| DatasetError::out_of_range("feature index", index, usize::MAX))
}

// ── Dense ──────────────────────────────────────────────────────

/// A contiguous vector storing every element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseDataVector {
    values: Vec<f64>,
}

impl DenseDataVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl DataVector for DenseDataVector {
    fn from_entries(entries: Vec<(usize, f64)>) -> Result<Self> {
        let entries = normalize(entries);
        let len = match entries.last() {
            Some(&(i, _)) => size_for(i)?,
            None => 0,
        };
        let mut values = vec![0.0; len];
        for (i, v) in entries {
            values[i] = v;
        }
        Ok(Self { values })
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    fn nonzeros(&self) -> EntryIterator<'_> {
        Box::new(
            self.values
                .iter()
                .copied()
                .enumerate()
                .filter(|&(_, v)| v != 0.0),
        )
    }

    fn set(&mut self, index: usize, value: f64) -> Result<()> {
        if index >= self.values.len() {
            self.values.resize(size_for(index)?, 0.0);
        }
        self.values[index] = value;
        Ok(())
    }

    fn to_dense(&self, len: usize) -> Vec<f64> {
        let mut out = vec![0.0; len];
        let n = len.min(self.values.len());
        out[..n].copy_from_slice(&self.values[..n]);
        out
    }
}

impl fmt::Display for DenseDataVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

// ── Sparse ─────────────────────────────────────────────────────

/// Index/value pairs for the non-zero elements only.
///
/// The size is tracked separately, so zeroing the last stored element keeps
/// it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseDataVector {
    /// Strictly increasing.
    indices: Vec<usize>,
    values: Vec<f64>,
    size: usize,
}

impl SparseDataVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nonzeros(&self) -> usize {
        self.indices.len()
    }
}

impl DataVector for SparseDataVector {
    fn from_entries(entries: Vec<(usize, f64)>) -> Result<Self> {
        let (indices, values): (Vec<usize>, Vec<f64>) = normalize(entries)
            .into_iter()
            .filter(|&(_, v)| v != 0.0)
            .unzip();
        let size = match indices.last() {
            Some(&i) => size_for(i)?,
            None => 0,
        };
        Ok(Self {
            indices,
            values,
            size,
        })
    }

    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    fn nonzeros(&self) -> EntryIterator<'_> {
        Box::new(self.indices.iter().copied().zip(self.values.iter().copied()))
    }

    fn set(&mut self, index: usize, value: f64) -> Result<()> {
        match self.indices.binary_search(&index) {
            Ok(pos) if value == 0.0 => {
                self.indices.remove(pos);
                self.values.remove(pos);
            }
            Ok(pos) => self.values[pos] = value,
            Err(_) if value == 0.0 => {}
            Err(pos) => {
                self.size = self.size.max(size_for(index)?);
                self.indices.insert(pos, index);
                self.values.insert(pos, value);
            }
        }
        Ok(())
    }
}

impl fmt::Display for SparseDataVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, (i, v)) in self.nonzeros().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{i}:{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_from_entries() {
        let v = DenseDataVector::from_entries(vec![(3, 1.5), (0, 2.0)]).unwrap();
        assert_eq!(v.as_slice(), &[2.0, 0.0, 0.0, 1.5]);
        assert_eq!(v.size(), 4);
        assert_eq!(v.get(10), 0.0);
    }

    #[test]
    fn test_dense_keeps_trailing_zero() {
        let v = DenseDataVector::from_entries(vec![(0, 1.0), (1, 0.0)]).unwrap();
        assert_eq!(v.size(), 2);
        assert_eq!(v.nonzeros().collect::<Vec<_>>(), vec![(0, 1.0)]);
    }

    #[test]
    fn test_sparse_drops_zeros() {
        let v = SparseDataVector::from_entries(vec![(5, 0.0), (2, 4.0)]).unwrap();
        assert_eq!(v.num_nonzeros(), 1);
        assert_eq!(v.size(), 3);
        assert_eq!(v.get(2), 4.0);
        assert_eq!(v.get(5), 0.0);
    }

    #[test]
    fn test_later_entry_wins() {
        let v = SparseDataVector::from_entries(vec![(1, 1.0), (1, 7.0)]).unwrap();
        assert_eq!(v.get(1), 7.0);
        assert_eq!(v.num_nonzeros(), 1);
    }

    #[test]
    fn test_sparse_set() {
        let mut v = SparseDataVector::new();
        v.set(4, 1.0).unwrap();
        v.set(1, 2.0).unwrap();
        assert_eq!(v.nonzeros().collect::<Vec<_>>(), vec![(1, 2.0), (4, 1.0)]);
        v.set(4, 0.0).unwrap();
        assert_eq!(v.nonzeros().collect::<Vec<_>>(), vec![(1, 2.0)]);
        assert_eq!(v.size(), 5);
    }

    #[test]
    fn test_dense_set_grows() {
        let mut v = DenseDataVector::default();
        v.set(2, 3.0).unwrap();
        assert_eq!(v.as_slice(), &[0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_highest_index_has_no_size() {
        let err = SparseDataVector::from_entries(vec![(usize::MAX, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::IndexOutOfRange { what: "feature index", index: usize::MAX, .. }
        ));
        assert!(DenseDataVector::from_entries(vec![(usize::MAX, 1.0)]).is_err());

        let mut v = SparseDataVector::new();
        assert!(v.set(usize::MAX, 1.0).is_err());
        assert_eq!(v.size(), 0);
        // a zero at the top index is dropped before any size is needed
        let zero = SparseDataVector::from_entries(vec![(usize::MAX, 0.0)]).unwrap();
        assert_eq!(zero.size(), 0);
    }

    #[test]
    fn test_to_dense_pads_and_truncates() {
        let v = SparseDataVector::from_entries(vec![(0, 1.0), (3, 2.0)]).unwrap();
        assert_eq!(v.to_dense(2), vec![1.0, 0.0]);
        assert_eq!(v.to_dense(5), vec![1.0, 0.0, 0.0, 2.0, 0.0]);

        let d = DenseDataVector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(d.to_dense(2), vec![1.0, 2.0]);
        assert_eq!(d.to_dense(4), vec![1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_display() {
        let s = SparseDataVector::from_entries(vec![(0, 1.0), (3, 2.5)]).unwrap();
        assert_eq!(s.to_string(), "0:1 3:2.5");
        let d = DenseDataVector::new(vec![1.0, 0.0, 2.5]);
        assert_eq!(d.to_string(), "1 0 2.5");
    }
}
