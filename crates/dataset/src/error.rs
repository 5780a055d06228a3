// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for example storage and row parsing.

/// Errors raised by datasets, row sources, and parsers.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// An example index, row window, or count reaches past the end of the
    /// data. `bound` is the length it was checked against.
    #[error("{what} {index} out of range (len {bound})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// A lazy sequence was read or advanced after its last element.
    #[error("iterator is exhausted")]
    IteratorExhausted,

    /// A raw row could not be interpreted by the entry parser.
    #[error("failed to parse row {row}: {detail}")]
    Parse { row: usize, detail: String },

    /// The underlying row source failed.
    #[error("row source I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, bound: usize) -> Self {
        Self::IndexOutOfRange { what, index, bound }
    }

    pub(crate) fn parse(row: usize, detail: impl Into<String>) -> Self {
        Self::Parse {
            row,
            detail: detail.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DatasetError>;
