// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric measures of mesh elements: normals, lengths, areas, volumes.

use formex_core::{Error, Result, DEGENERATE_EPS};
use nalgebra::{Point3, Vector3};

use crate::mesh::Mesh;

/// Area-weighted normal of a polygon by Newell's method.
///
/// The length of the result is twice the polygon area; the direction
/// follows the right-hand rule relative to the vertex order.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = points[i];
        let next = points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

impl Mesh {
    /// Length of every line element.
    pub fn lengths(&self) -> Result<Vec<f64>> {
        if self.level() != 1 {
            return Err(Error::topology(format!(
                "lengths need line elements, got {}",
                self.eltype()
            )));
        }
        Ok(self
            .elems()
            .rows()
            .map(|r| (self.coords()[r[1]] - self.coords()[r[0]]).norm())
            .collect())
    }

    /// Area of every surface element.
    pub fn areas(&self) -> Result<Vec<f64>> {
        self.require_surface("areas")?;
        Ok((0..self.nelems())
            .map(|e| {
                let points: Vec<_> = self.element_points(e).collect();
                newell_normal(&points).norm() / 2.0
            })
            .collect())
    }

    /// Unit normal of every surface element; zero for degenerate elements.
    pub fn normals(&self) -> Result<Vec<Vector3<f64>>> {
        self.require_surface("normals")?;
        Ok((0..self.nelems())
            .map(|e| {
                let points: Vec<_> = self.element_points(e).collect();
                let n = newell_normal(&points);
                let len = n.norm();
                if len <= DEGENERATE_EPS {
                    Vector3::zeros()
                } else {
                    n / len
                }
            })
            .collect())
    }

    /// Volume of every solid element.
    ///
    /// Sums signed tetrahedra between the element centroid and a fan
    /// triangulation of each outward face, so correctly ordered elements
    /// have positive volume and inverted ones negative volume.
    pub fn volumes(&self) -> Result<Vec<f64>> {
        if self.level() != 3 {
            return Err(Error::topology(format!(
                "volumes need solid elements, got {}",
                self.eltype()
            )));
        }
        let faces = self.eltype().faces();
        let centroids = self.centroids()?;
        Ok(self
            .elems()
            .rows()
            .enumerate()
            .map(|(e, row)| {
                let c = centroids[e];
                let mut volume = 0.0;
                for face in &faces {
                    let p0 = self.coords()[row[face[0]]] - c;
                    for w in face[1..].windows(2) {
                        let p1 = self.coords()[row[w[0]]] - c;
                        let p2 = self.coords()[row[w[1]]] - c;
                        volume += p0.dot(&p1.cross(&p2));
                    }
                }
                volume / 6.0
            })
            .collect())
    }

    fn require_surface(&self, op: &str) -> Result<()> {
        if self.level() != 2 {
            return Err(Error::topology(format!(
                "{} need surface elements, got {}",
                op,
                self.eltype()
            )));
        }
        Ok(())
    }
}
