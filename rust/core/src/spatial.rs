// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial hash for tolerance-based point fusing.
//!
//! The grid divides space into cubic cells of side `tolerance`, so every
//! point within `tolerance` of a query lies in the 3x3x3 block of cells
//! around it.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// A spatial hash grid over representative point indices.
#[derive(Debug)]
pub struct SpatialIndex {
    cell_size: f64,
    grid: FxHashMap<(i64, i64, i64), Vec<usize>>,
}

impl SpatialIndex {
    /// Creates an empty index. `cell_size` must be positive and finite.
    pub fn new(cell_size: f64) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::geometry(
                "spatial_index",
                format!("cell size must be positive, got {}", cell_size),
            ));
        }
        Ok(Self {
            cell_size,
            grid: FxHashMap::default(),
        })
    }

    /// Registers point index `key` at position `p`.
    pub fn insert(&mut self, key: usize, p: &Point3<f64>) {
        let cell = self.cell_coords(p);
        self.grid.entry(cell).or_default().push(key);
    }

    /// Smallest registered index whose point lies within `tolerance` of `p`.
    ///
    /// `points` resolves registered indices to positions. The tolerance
    /// must not exceed the cell size.
    pub fn find_min_near(
        &self,
        points: &[Point3<f64>],
        p: &Point3<f64>,
        tolerance: f64,
    ) -> Option<usize> {
        let (cx, cy, cz) = self.cell_coords(p);
        let tol_sq = tolerance * tolerance;
        let mut best: Option<usize> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = (cx.saturating_add(dx), cy.saturating_add(dy), cz.saturating_add(dz));
                    let Some(keys) = self.grid.get(&cell) else {
                        continue;
                    };
                    for &k in keys {
                        if best.is_some_and(|b| b <= k) {
                            continue;
                        }
                        if (points[k] - p).norm_squared() <= tol_sq {
                            best = Some(k);
                        }
                    }
                }
            }
        }

        best
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    // The float to int casts saturate, so far away points share the
    // outermost cells and neighbour keys must not overflow.
    fn cell_coords(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }
}

/// Fuses points that lie within `tolerance` of each other.
///
/// Points are visited in input order. A point joins the lowest-numbered
/// representative within `tolerance`, or becomes a new representative.
/// Representatives keep their first-occurrence order, so fusing is
/// deterministic and fusing the result again changes nothing.
///
/// Returns the representatives and, per input point, its representative's
/// index. A zero tolerance merges only exactly equal points.
pub fn fuse_points(points: &[Point3<f64>], tolerance: f64) -> Result<(Vec<Point3<f64>>, Vec<usize>)> {
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(Error::geometry(
            "fuse",
            format!("tolerance must be finite and non-negative, got {}", tolerance),
        ));
    }
    let cell_size = if tolerance > 0.0 { tolerance } else { 1.0 };
    let mut index = SpatialIndex::new(cell_size)?;
    let mut unique: Vec<Point3<f64>> = Vec::new();
    let mut mapping = Vec::with_capacity(points.len());

    for p in points {
        let rep = match index.find_min_near(&unique, p, tolerance) {
            Some(rep) => rep,
            None => {
                let rep = unique.len();
                unique.push(*p);
                index.insert(rep, p);
                rep
            }
        };
        mapping.push(rep);
    }

    tracing::debug!(
        input = points.len(),
        unique = unique.len(),
        tolerance,
        "fused points"
    );
    Ok((unique, mapping))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_finds_lowest_key() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.005, 0.0, 0.0)];
        let mut index = SpatialIndex::new(0.01).unwrap();
        index.insert(1, &points[1]);
        index.insert(0, &points[0]);
        assert_eq!(index.find_min_near(&points, &Point3::new(0.004, 0.0, 0.0), 0.01), Some(0));
        assert_eq!(index.find_min_near(&points, &Point3::new(1.0, 0.0, 0.0), 0.01), None);
    }

    #[test]
    fn rejects_bad_cell_size() {
        assert!(SpatialIndex::new(0.0).is_err());
        assert!(SpatialIndex::new(f64::NAN).is_err());
    }

    #[test]
    fn fuse_merges_across_cell_boundary() {
        // 0.0999 and 0.1001 fall into different cells of size 0.01.
        let points = vec![Point3::new(0.0999, 0.0, 0.0), Point3::new(0.1001, 0.0, 0.0)];
        let (unique, mapping) = fuse_points(&points, 0.01).unwrap();
        assert_eq!(unique.len(), 1);
        assert_eq!(mapping, vec![0, 0]);
    }

    #[test]
    fn fuse_keeps_first_occurrence_order() {
        let points = vec![
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 5.0, 5.0 + 1e-9),
            Point3::new(0.0, 1e-9, 0.0),
        ];
        let (unique, mapping) = fuse_points(&points, 1e-6).unwrap();
        assert_eq!(unique, vec![points[0], points[1]]);
        assert_eq!(mapping, vec![0, 1, 0, 1]);
    }

    #[test]
    fn fuse_is_idempotent() {
        let points: Vec<_> = (0..20)
            .map(|i| Point3::new((i % 7) as f64 * 0.5, (i % 3) as f64, 0.0))
            .collect();
        let (once, _) = fuse_points(&points, 1e-3).unwrap();
        let (twice, mapping) = fuse_points(&once, 1e-3).unwrap();
        assert_eq!(once, twice);
        assert_eq!(mapping, (0..once.len()).collect::<Vec<_>>());
    }

    #[test]
    fn zero_tolerance_merges_exact_duplicates_only() {
        let points = vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(1.0, 2.0, 3.0 + 1e-12),
        ];
        let (unique, mapping) = fuse_points(&points, 0.0).unwrap();
        assert_eq!(unique.len(), 2);
        assert_eq!(mapping, vec![0, 0, 1]);
    }

    #[test]
    fn fuse_handles_coordinates_beyond_the_cell_range() {
        let points = vec![
            Point3::new(1e20, 0.0, 0.0),
            Point3::new(-1e20, 0.0, 0.0),
            Point3::new(1e20, 0.0, 0.5),
            Point3::new(1e20, 0.0, 0.0),
        ];
        let (unique, mapping) = fuse_points(&points, 1.0).unwrap();
        assert_eq!(unique.len(), 2);
        assert_eq!(mapping, vec![0, 1, 0, 0]);

        let (unique, _) = fuse_points(&points, 1e-3).unwrap();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        assert!(matches!(
            fuse_points(&[], -1.0),
            Err(Error::Geometry { op: "fuse", .. })
        ));
    }
}
