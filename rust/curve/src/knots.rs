// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Knot vectors for B-spline and NURBS curves.
//!
//! A knot vector is a non-decreasing sequence of parameter values. Values
//! usually repeat, and the multiplicity of a value controls the continuity
//! of the curve at that parameter.
//!
//! ```
//! use formex_curve::KnotVector;
//!
//! let knots = KnotVector::generate(7, 3, true, false)?;
//! assert_eq!(knots.values(), &[0.0, 0.0, 0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0]);
//! assert_eq!(knots.mult(0.0), 4);
//! # Ok::<(), formex_core::Error>(())
//! ```

use formex_core::{Error, Result};

/// Knot values closer than this are the same knot.
pub const KNOT_EPS: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "KnotParts"))]
pub struct KnotVector {
    values: Vec<f64>,
}

impl KnotVector {
    /// Fails on an empty, non-finite or decreasing sequence.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::geometry("knots", "knot vector is empty"));
        }
        if !values.iter().all(|v| v.is_finite()) {
            return Err(Error::geometry("knots", "knot values must be finite"));
        }
        if values.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::geometry("knots", "knot values must be non-decreasing"));
        }
        Ok(Self { values })
    }

    /// Knot vector from distinct values and their multiplicities.
    pub fn from_unique(unique: &[(f64, usize)]) -> Result<Self> {
        Self::new(
            unique
                .iter()
                .flat_map(|&(v, m)| std::iter::repeat(v).take(m))
                .collect(),
        )
    }

    /// A sensible knot vector for `nctrl` control points of `degree`.
    ///
    /// - Open blended: end knots 0 and 1 with multiplicity `degree + 1`,
    ///   remaining knots spread evenly in between.
    /// - Closed: all knots evenly spread over `[0, 1]` with multiplicity 1.
    /// - Open unblended: knots `0, 1, .., nparts` with internal
    ///   multiplicity `degree`, so the curve is a chain of Bezier parts.
    ///   Needs `nctrl = nparts * degree + 1`.
    pub fn generate(nctrl: usize, degree: usize, blended: bool, closed: bool) -> Result<Self> {
        if degree == 0 {
            return Err(Error::geometry("knots", "degree must be at least 1"));
        }
        if nctrl < degree + 1 {
            return Err(Error::geometry(
                "knots",
                format!("degree {} needs at least {} control points, got {}", degree, degree + 1, nctrl),
            ));
        }
        let nknots = nctrl + degree + 1;
        if closed || blended {
            let nval = if closed { nknots } else { nknots - 2 * degree };
            let unique: Vec<(f64, usize)> = (0..nval)
                .map(|i| {
                    let end = !closed && (i == 0 || i == nval - 1);
                    (i as f64 / (nval - 1) as f64, if end { degree + 1 } else { 1 })
                })
                .collect();
            Self::from_unique(&unique)
        } else {
            let nparts = (nctrl - 1) / degree;
            if nparts * degree + 1 != nctrl {
                return Err(Error::geometry(
                    "knots",
                    "unblended knots need a multiple of the degree plus one control points",
                ));
            }
            let unique: Vec<(f64, usize)> = (0..=nparts)
                .map(|i| {
                    let end = i == 0 || i == nparts;
                    (i as f64, if end { degree + 1 } else { degree })
                })
                .collect();
            Self::from_unique(&unique)
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Distinct knot values with their multiplicities.
    pub fn unique(&self) -> Vec<(f64, usize)> {
        let mut out: Vec<(f64, usize)> = Vec::new();
        for &v in &self.values {
            match out.last_mut() {
                Some((last, m)) if (v - *last).abs() <= KNOT_EPS => *m += 1,
                _ => out.push((v, 1)),
            }
        }
        out
    }

    /// Multiplicity of knot value `u`; 0 when `u` is not a knot.
    pub fn mult(&self, u: f64) -> usize {
        self.values.iter().filter(|&&v| (v - u).abs() <= KNOT_EPS).count()
    }

    /// Index `i` of the knot interval `values[i] <= u < values[i + 1]`.
    ///
    /// Repeated knots make empty intervals, so the bracket is unique. `None`
    /// when `u` lies before the first or at or after the last knot.
    pub fn span(&self, u: f64) -> Option<usize> {
        if u.is_nan() {
            return None;
        }
        let i = self.values.partition_point(|&v| v <= u);
        (i > 0 && i < self.values.len()).then(|| i - 1)
    }

    /// Whether both ends have multiplicity `degree + 1`.
    pub fn is_clamped(&self, degree: usize) -> bool {
        let unique = self.unique();
        match (unique.first(), unique.last()) {
            (Some(first), Some(last)) => first.1 == degree + 1 && last.1 == degree + 1,
            _ => false,
        }
    }

    /// Whether the distinct knot values are evenly spaced.
    pub fn is_uniform(&self) -> bool {
        let unique = self.unique();
        if unique.len() < 3 {
            return true;
        }
        let d0 = unique[1].0 - unique[0].0;
        unique
            .windows(2)
            .all(|w| ((w[1].0 - w[0].0) - d0).abs() <= KNOT_EPS.max(1e-9 * d0.abs()))
    }

    /// The mirrored knot vector, for traversing a curve backwards.
    pub fn reverse(&self) -> KnotVector {
        let (first, last) = (self.values[0], self.values[self.values.len() - 1]);
        KnotVector {
            values: self.values.iter().rev().map(|&v| first + last - v).collect(),
        }
    }

    /// Inserts `u` `times` times, keeping the sequence sorted.
    pub(crate) fn with_inserted(&self, u: f64, times: usize) -> KnotVector {
        let at = self.values.partition_point(|&v| v <= u);
        let mut values = Vec::with_capacity(self.values.len() + times);
        values.extend_from_slice(&self.values[..at]);
        values.extend(std::iter::repeat(u).take(times));
        values.extend_from_slice(&self.values[at..]);
        KnotVector { values }
    }
}

impl std::ops::Index<usize> for KnotVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct KnotParts {
    values: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<KnotParts> for KnotVector {
    type Error = Error;

    fn try_from(parts: KnotParts) -> Result<Self> {
        KnotVector::new(parts.values)
    }
}
