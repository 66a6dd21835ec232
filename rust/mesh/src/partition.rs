// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partitioning of meshes into connected element groups.
//!
//! Elements are joined through the entities one level below them: nodes
//! for line meshes, edges for surfaces, faces for solids. Groups come from
//! a union-find over that adjacency and are numbered in the order of their
//! smallest element, so the result never depends on traversal order.

use formex_core::{Error, Result, DEGENERATE_EPS};
use nalgebra::Vector3;

use crate::mesh::Mesh;

/// Disjoint-set forest with path halving and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, x: usize, y: usize) {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return;
        }
        if self.rank[rx] < self.rank[ry] {
            self.parent[rx] = ry;
        } else if self.rank[rx] > self.rank[ry] {
            self.parent[ry] = rx;
        } else {
            self.parent[ry] = rx;
            self.rank[rx] += 1;
        }
    }

    /// Group number per item, numbered by first appearance.
    fn groups(&mut self) -> Vec<usize> {
        let n = self.parent.len();
        let mut label = vec![usize::MAX; n];
        let mut next = 0;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let root = self.find(i);
            if label[root] == usize::MAX {
                label[root] = next;
                next += 1;
            }
            out.push(label[root]);
        }
        out
    }
}

impl Mesh {
    /// Group number per element, joining elements that share a bounding
    /// entity.
    pub fn partition_by_connection(&self) -> Result<Vec<usize>> {
        self.partition_with(|_, _, _| true)
    }

    /// Group number per element, joining adjacent elements only when the
    /// angle between them is at most `threshold` degrees.
    ///
    /// For surfaces the angle is the one between the element normals, so
    /// neighbours must be consistently oriented to join. For lines it is
    /// the change of direction when passing through the shared node.
    /// Elements with a zero normal or zero length never join.
    pub fn partition_by_angle(&self, threshold: f64) -> Result<Vec<usize>> {
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(Error::geometry(
                "partition_by_angle",
                format!("threshold must be a non-negative angle, got {}", threshold),
            ));
        }
        match self.level() {
            1 => self.partition_with(|mesh, (a, b), node| {
                let (Some(da), Some(db)) = (
                    mesh.direction_through(a, node, true),
                    mesh.direction_through(b, node, false),
                ) else {
                    return false;
                };
                within_angle(&da, &db, threshold)
            }),
            2 => {
                let normals = self.normals()?;
                self.partition_with(|_, (a, b), _| {
                    let (na, nb) = (&normals[a], &normals[b]);
                    if na.norm() <= DEGENERATE_EPS || nb.norm() <= DEGENERATE_EPS {
                        return false;
                    }
                    within_angle(na, nb, threshold)
                })
            }
            _ => Err(Error::topology(format!(
                "partition_by_angle needs line or surface elements, got {}",
                self.eltype()
            ))),
        }
    }

    /// Runs the union-find, joining adjacent elements `(a, b)` when
    /// `join(self, (a, b), shared)` holds. For line meshes `shared` is the
    /// shared point index; otherwise it is the shared entity number.
    fn partition_with<F>(&self, join: F) -> Result<Vec<usize>>
    where
        F: Fn(&Mesh, (usize, usize), usize) -> bool,
    {
        let level = self
            .level()
            .checked_sub(1)
            .ok_or_else(|| Error::topology("point meshes cannot be partitioned"))?;
        let ents = self.elems().extract_entities(level)?;
        let owners = ents.adjacency.inverse(ents.entities.len());

        let mut uf = UnionFind::new(self.nelems());
        for (id, elems) in owners.rows().enumerate() {
            let shared = if level == 0 { ents.entities.row(id)[0] } else { id };
            for (i, &a) in elems.iter().enumerate() {
                for &b in &elems[i + 1..] {
                    if join(self, (a, b), shared) {
                        uf.union(a, b);
                    }
                }
            }
        }
        let groups = uf.groups();
        tracing::debug!(
            elements = self.nelems(),
            groups = groups.iter().max().map_or(0, |g| g + 1),
            "partitioned mesh"
        );
        Ok(groups)
    }

    /// Direction of line element `e` at `node`, oriented so that it points
    /// into the node when `incoming` and out of it otherwise. `None` when
    /// the element has zero length or does not touch the node.
    fn direction_through(&self, e: usize, node: usize, incoming: bool) -> Option<Vector3<f64>> {
        let row = self.elems().row(e);
        let other = if row[0] == node {
            row[1]
        } else if row[1] == node {
            row[0]
        } else {
            return None;
        };
        let d = self.coords()[node] - self.coords()[other];
        if d.norm() <= DEGENERATE_EPS {
            return None;
        }
        Some(if incoming { d } else { -d })
    }
}

/// Slack on angle comparisons, in degrees.
const ANGLE_EPS: f64 = 1e-9;

fn within_angle(a: &Vector3<f64>, b: &Vector3<f64>, threshold: f64) -> bool {
    let cos = a.normalize().dot(&b.normalize()).clamp(-1.0, 1.0);
    cos.acos().to_degrees() <= threshold + ANGLE_EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use formex_core::{Connectivity, Coords, ElementType};

    /// A unit strip folded along x = 1 by 90 degrees, plus a detached quad.
    fn folded_strip() -> Mesh {
        let coords = Coords::from_flat(&[
            0., 0., 0., 1., 0., 0., 1., 1., 0., 0., 1., 0., // flat part
            1., 0., 1., 1., 1., 1., // folded up part
            5., 0., 0., 6., 0., 0., 6., 1., 0., 5., 1., 0., // detached
        ])
        .unwrap();
        let elems = Connectivity::from_rows(
            ElementType::Quad4,
            &[[0, 1, 2, 3], [1, 4, 5, 2], [6, 7, 8, 9]],
        )
        .unwrap();
        Mesh::new(coords, elems).unwrap()
    }

    #[test]
    fn connection_groups_by_smallest_element() {
        let groups = folded_strip().partition_by_connection().unwrap();
        assert_eq!(groups, vec![0, 0, 1]);
    }

    #[test]
    fn sharp_fold_splits_surface() {
        let mesh = folded_strip();
        assert_eq!(mesh.partition_by_angle(45.0).unwrap(), vec![0, 1, 2]);
        assert_eq!(mesh.partition_by_angle(90.0).unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn polyline_splits_at_corners() {
        let coords = Coords::from_flat(&[
            0., 0., 0., 1., 0., 0., 2., 0.1, 0., 2., 1.1, 0.,
        ])
        .unwrap();
        let elems =
            Connectivity::from_rows(ElementType::Line2, &[[0, 1], [1, 2], [2, 3]]).unwrap();
        let mesh = Mesh::new(coords, elems).unwrap();
        assert_eq!(mesh.partition_by_angle(10.0).unwrap(), vec![0, 0, 1]);
        assert_eq!(mesh.partition_by_angle(1.0).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_solids_and_bad_thresholds() {
        let coords = Coords::from_flat(&[0., 0., 0., 1., 0., 0., 0., 1., 0., 0., 0., 1.]).unwrap();
        let tet = Connectivity::from_rows(ElementType::Tet4, &[[0, 1, 2, 3]]).unwrap();
        let mesh = Mesh::new(coords, tet).unwrap();
        assert!(matches!(mesh.partition_by_angle(30.0), Err(Error::Topology(_))));
        assert_eq!(mesh.partition_by_connection().unwrap(), vec![0]);
        assert!(folded_strip().partition_by_angle(f64::NAN).is_err());
    }
}
