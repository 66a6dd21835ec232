// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Variable-width integer rows stored in one flat buffer.

use crate::error::{Error, Result};

/// A list of `usize` rows of varying width.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "VarrayParts"))]
pub struct Varray {
    data: Vec<usize>,
    offsets: Vec<usize>,
}

impl Default for Varray {
    fn default() -> Self {
        Self::new()
    }
}

impl Varray {
    /// An empty array.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            offsets: vec![0],
        }
    }

    /// Wraps a flat buffer and its row offsets.
    ///
    /// `offsets` starts at 0, never decreases and ends at `data.len()`.
    pub fn from_parts(data: Vec<usize>, offsets: Vec<usize>) -> Result<Self> {
        if offsets.first() != Some(&0) {
            return Err(Error::topology("row offsets must start at 0"));
        }
        if offsets.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::topology("row offsets must be non-decreasing"));
        }
        if offsets.last() != Some(&data.len()) {
            return Err(Error::topology(format!(
                "row offsets end at {:?} but the buffer holds {} values",
                offsets.last(),
                data.len()
            )));
        }
        Ok(Self { data, offsets })
    }

    /// Builds an array from rows.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[usize]>,
    {
        let mut varray = Self::new();
        for row in rows {
            varray.push_row(row.as_ref());
        }
        varray
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: &[usize]) {
        self.data.extend_from_slice(row);
        self.offsets.push(self.data.len());
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row `i`. Panics if `i >= len()`.
    #[inline]
    pub fn row(&self, i: usize) -> &[usize] {
        &self.data[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Row `i`, or `None` when out of range.
    pub fn get(&self, i: usize) -> Option<&[usize]> {
        (i < self.len()).then(|| self.row(i))
    }

    /// Width of row `i`.
    #[inline]
    pub fn width(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    /// Iterates the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// All values, row after row.
    pub fn data(&self) -> &[usize] {
        &self.data
    }

    /// Largest value, if any.
    pub fn max_value(&self) -> Option<usize> {
        self.data.iter().copied().max()
    }

    /// Inverse index: row `v` of the result lists, ascending and without
    /// repeats, the rows of `self` that contain value `v`. The result has
    /// `max(nvalues, max_value + 1)` rows.
    pub fn inverse(&self, nvalues: usize) -> Varray {
        let n = self.max_value().map_or(nvalues, |m| nvalues.max(m + 1));
        let mut lists: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, row) in self.rows().enumerate() {
            for &v in row {
                // Rows are visited in order, so only the tail can repeat.
                if lists[v].last() != Some(&i) {
                    lists[v].push(i);
                }
            }
        }
        Varray::from_rows(lists)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct VarrayParts {
    data: Vec<usize>,
    offsets: Vec<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<VarrayParts> for Varray {
    type Error = Error;

    fn try_from(parts: VarrayParts) -> Result<Self> {
        Varray::from_parts(parts.data, parts.offsets)
    }
}
