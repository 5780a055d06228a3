// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Raw row sources.
//!
//! A source is positioned on one row at a time. Reading or advancing an
//! exhausted source fails with [`DatasetError::IteratorExhausted`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{DatasetError, Result};

/// A forward-only cursor over raw text rows.
pub trait RowSource {
    /// True while positioned on a row.
    fn is_valid(&self) -> bool;

    /// Moves to the next row.
    fn advance(&mut self) -> Result<()>;

    /// The current row.
    fn get(&self) -> Result<&str>;
}

// ── Lines ──────────────────────────────────────────────────────

/// Reads rows line by line from any buffered reader, holding only the
/// current line. Blank lines and lines starting with `#` are skipped.
#[derive(Debug)]
pub struct LineRowSource<R> {
    reader: R,
    line: String,
    valid: bool,
    line_number: usize,
}

impl<R: BufRead> LineRowSource<R> {
    /// Wraps `reader` and positions on its first row.
    pub fn new(reader: R) -> Result<Self> {
        let mut source = Self {
            reader,
            line: String::new(),
            valid: true,
            line_number: 0,
        };
        source.read_row()?;
        Ok(source)
    }

    /// One-based line number of the current row in the underlying reader.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_row(&mut self) -> Result<()> {
        loop {
            self.line.clear();
            let read = match self.reader.read_line(&mut self.line) {
                Ok(n) => n,
                Err(e) => {
                    self.valid = false;
                    return Err(e.into());
                }
            };
            if read == 0 {
                self.valid = false;
                return Ok(());
            }
            self.line_number += 1;
            let trimmed = self.line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                return Ok(());
            }
        }
    }
}

impl LineRowSource<BufReader<File>> {
    /// Opens a text file of rows.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        tracing::debug!("reading rows from {}", path.display());
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> RowSource for LineRowSource<R> {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn advance(&mut self) -> Result<()> {
        if !self.valid {
            return Err(DatasetError::IteratorExhausted);
        }
        self.read_row()
    }

    fn get(&self) -> Result<&str> {
        if !self.valid {
            return Err(DatasetError::IteratorExhausted);
        }
        Ok(self.line.trim_end_matches(['\r', '\n']))
    }
}

// ── In-memory ──────────────────────────────────────────────────

/// Rows already held in memory.
#[derive(Debug, Clone, Default)]
pub struct VecRowSource {
    rows: Vec<String>,
    position: usize,
}

impl VecRowSource {
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows.into_iter().map(Into::into).collect(),
            position: 0,
        }
    }
}

impl RowSource for VecRowSource {
    fn is_valid(&self) -> bool {
        self.position < self.rows.len()
    }

    fn advance(&mut self) -> Result<()> {
        if !self.is_valid() {
            return Err(DatasetError::IteratorExhausted);
        }
        self.position += 1;
        Ok(())
    }

    fn get(&self) -> Result<&str> {
        self.rows
            .get(self.position)
            .map(String::as_str)
            .ok_or(DatasetError::IteratorExhausted)
    }
}
