// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Entry parsers: one raw text row → label, optional weight, and features.
//!
//! Every row starts with the label, then the weight when the
//! [`RowConvention`] says rows carry one. The remaining tokens are features.

use std::str::FromStr;

use crate::error::{DatasetError, Result};

/// Highest feature index accepted unless a [`RowConvention`] says otherwise.
pub const DEFAULT_MAX_FEATURE_INDEX: usize = (1 << 24) - 1;

/// Fixed layout of the leading fields of a row, and the largest feature index
/// a row may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowConvention {
    /// The token after the label is the example weight.
    pub has_weight: bool,
    /// Rows naming a feature index above this fail to parse. Vectors built
    /// from a row are sized by its highest index, so this bounds allocation.
    pub max_feature_index: usize,
}

impl RowConvention {
    pub const fn new(has_weight: bool) -> Self {
        Self {
            has_weight,
            max_feature_index: DEFAULT_MAX_FEATURE_INDEX,
        }
    }

    pub const fn with_max_feature_index(self, max_feature_index: usize) -> Self {
        Self {
            max_feature_index,
            ..self
        }
    }

    fn check_feature_index(&self, row: usize, index: usize) -> Result<usize> {
        if index > self.max_feature_index {
            return Err(DatasetError::parse(
                row,
                format!(
                    "feature index {index} exceeds maximum {}",
                    self.max_feature_index
                ),
            ));
        }
        Ok(index)
    }
}

impl Default for RowConvention {
    fn default() -> Self {
        Self::new(false)
    }
}

/// The fields of one parsed row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEntries {
    pub label: f64,
    pub weight: Option<f64>,
    /// `(index, value)` pairs in row order.
    pub features: Vec<(usize, f64)>,
}

/// Turns a raw row into [`RowEntries`]. One implementation per file format.
pub trait EntryParser {
    /// `row_index` is only used to label errors.
    fn parse(&self, row_index: usize, row: &str) -> Result<RowEntries>;
}

impl<P: EntryParser + ?Sized> EntryParser for Box<P> {
    fn parse(&self, row_index: usize, row: &str) -> Result<RowEntries> {
        (**self).parse(row_index, row)
    }
}

fn number<T: FromStr>(row: usize, token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| DatasetError::parse(row, format!("invalid {what} '{token}'")))
}

/// Reads the label and optional weight off the front of `tokens`.
fn leading_fields<'a, I>(
    convention: RowConvention,
    row: usize,
    tokens: &mut I,
) -> Result<(f64, Option<f64>)>
where
    I: Iterator<Item = &'a str>,
{
    let label = tokens
        .next()
        .ok_or_else(|| DatasetError::parse(row, "missing label"))?;
    let label = number(row, label, "label")?;
    let weight = if convention.has_weight {
        let token = tokens
            .next()
            .ok_or_else(|| DatasetError::parse(row, "missing weight"))?;
        Some(number(row, token, "weight")?)
    } else {
        None
    };
    Ok((label, weight))
}

// ── Sparse ─────────────────────────────────────────────────────

/// Parses `label [weight] index:value index:value ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseEntryParser {
    convention: RowConvention,
}

impl SparseEntryParser {
    pub fn new(convention: RowConvention) -> Self {
        Self { convention }
    }
}

impl EntryParser for SparseEntryParser {
    fn parse(&self, row_index: usize, row: &str) -> Result<RowEntries> {
        let mut tokens = row.split_whitespace();
        let (label, weight) = leading_fields(self.convention, row_index, &mut tokens)?;

        let features = tokens
            .map(|token| -> Result<(usize, f64)> {
                let (index, value) = token.split_once(':').ok_or_else(|| {
                    DatasetError::parse(row_index, format!("expected index:value, got '{token}'"))
                })?;
                let index = number(row_index, index, "feature index")?;
                Ok((
                    self.convention.check_feature_index(row_index, index)?,
                    number(row_index, value, "feature value")?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RowEntries {
            label,
            weight,
            features,
        })
    }
}

// ── Dense ──────────────────────────────────────────────────────

/// Parses `label [weight] v0 v1 v2 ...`, separated by whitespace or commas.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseEntryParser {
    convention: RowConvention,
}

impl DenseEntryParser {
    pub fn new(convention: RowConvention) -> Self {
        Self { convention }
    }
}

impl EntryParser for DenseEntryParser {
    fn parse(&self, row_index: usize, row: &str) -> Result<RowEntries> {
        let mut tokens = row
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty());
        let (label, weight) = leading_fields(self.convention, row_index, &mut tokens)?;

        let features = tokens
            .enumerate()
            .map(|(i, token)| -> Result<(usize, f64)> {
                Ok((
                    self.convention.check_feature_index(row_index, i)?,
                    number(row_index, token, "feature value")?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RowEntries {
            label,
            weight,
            features,
        })
    }
}
