// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-based removal of duplicate points.

use formex_core::Result;

use crate::mesh::Mesh;

/// Counts reported by [`Mesh::remove_duplicate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Points merged into another point.
    pub merged_points: usize,
    /// Elements dropped because two of their nodes merged.
    pub removed_elements: usize,
    /// Points dropped because no remaining element used them.
    pub unused_points: usize,
}

impl MergeReport {
    /// Whether the operation changed anything.
    pub fn is_empty(&self) -> bool {
        self.merged_points == 0 && self.removed_elements == 0 && self.unused_points == 0
    }
}

impl Mesh {
    /// Merges points closer than `tolerance`, renumbers the elements,
    /// drops elements that became degenerate and compacts the points.
    ///
    /// Applying it a second time with the same tolerance changes nothing.
    pub fn remove_duplicate(&self, tolerance: f64) -> Result<(Mesh, MergeReport)> {
        let (unique, mapping) = self.coords().fuse(tolerance)?;
        let merged_points = self.npoints() - unique.len();

        let elems = self.elems().renumber(&mapping)?;
        let degenerate = elems.test_degenerate();
        let keep: Vec<usize> = (0..elems.nelems()).filter(|&e| !degenerate[e]).collect();
        let removed_elements = elems.nelems() - keep.len();

        let mut fused = Mesh::new(unique, elems)?;
        if let Some(prop) = self.prop() {
            fused = fused.with_prop(prop.to_vec())?;
        }
        let fused = fused.select(&keep)?;
        let npoints = fused.npoints();
        let result = fused.compact()?;

        let report = MergeReport {
            merged_points,
            removed_elements,
            unused_points: npoints - result.npoints(),
        };
        tracing::debug!(
            tolerance,
            merged_points = report.merged_points,
            removed_elements = report.removed_elements,
            unused_points = report.unused_points,
            "removed duplicate points"
        );
        Ok((result, report))
    }

    /// Drops elements whose node set repeats an earlier element's.
    pub fn remove_duplicate_elements(&self) -> Result<Mesh> {
        let duplicate = self.elems().test_duplicate();
        let keep: Vec<usize> = (0..self.nelems()).filter(|&e| !duplicate[e]).collect();
        self.select(&keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formex_core::{Connectivity, Coords, ElementType, Error};

    /// Two triangles stored with separate copies of their shared edge,
    /// plus a sliver whose nodes nearly coincide.
    fn split_triangles() -> Mesh {
        let coords = Coords::from_flat(&[
            0., 0., 0., 1., 0., 0., 1., 1., 0., // first triangle
            1., 1e-9, 0., 1., 1., 0., 0., 1., 0., // second, shares 1-2
            5., 5., 0., 5., 5. + 1e-9, 0., 6., 5., 0., // sliver
        ])
        .unwrap();
        let elems = Connectivity::from_rows(
            ElementType::Tri3,
            &[[0, 1, 2], [3, 4, 5], [6, 7, 8]],
        )
        .unwrap();
        Mesh::new(coords, elems).unwrap().with_prop(vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn merges_points_and_drops_degenerate_elements() {
        let (mesh, report) = split_triangles().remove_duplicate(1e-6).unwrap();
        assert_eq!(report.merged_points, 3);
        assert_eq!(report.removed_elements, 1);
        assert_eq!(report.unused_points, 2);
        assert_eq!(mesh.npoints(), 4);
        assert_eq!(mesh.elems().data(), &[0, 1, 2, 1, 2, 3]);
        assert_eq!(mesh.prop(), Some(&[1, 2][..]));
    }

    #[test]
    fn second_application_is_a_no_op() {
        let (once, _) = split_triangles().remove_duplicate(1e-6).unwrap();
        let (twice, report) = once.remove_duplicate(1e-6).unwrap();
        assert!(report.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn negative_tolerance_is_a_geometry_error() {
        assert!(matches!(
            split_triangles().remove_duplicate(-1.0),
            Err(Error::Geometry { .. })
        ));
    }

    #[test]
    fn duplicate_elements() {
        let coords = Coords::from_flat(&[0., 0., 0., 1., 0., 0., 0., 1., 0.]).unwrap();
        let elems = Connectivity::from_rows(ElementType::Tri3, &[[0, 1, 2], [1, 2, 0]]).unwrap();
        let mesh = Mesh::new(coords, elems).unwrap();
        assert_eq!(mesh.remove_duplicate_elements().unwrap().nelems(), 1);
    }
}
