// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end checks: pattern strings through formices and meshes to
//! swept solids and their borders.

use approx::assert_relative_eq;
use formex_core::{ElementType, Error, Tolerances};
use formex_mesh::{Formex, Mesh};
use nalgebra::{Point3, Vector3};

fn unit_quad() -> Mesh {
    let quad: Formex = "4:0123".parse().unwrap();
    quad.to_mesh(&Tolerances::default()).unwrap()
}

/// A 2 x 2 grid of unit quads in the XY plane with shared points.
fn quad_grid() -> Mesh {
    let quad: Formex = "4:0123".parse().unwrap();
    quad.rep(&[(2, Vector3::x()), (2, Vector3::y())])
        .unwrap()
        .to_mesh(&Tolerances::default())
        .unwrap()
}

#[test]
fn triangle_pattern_compacts_to_four_points() {
    let tris: Formex = "3:012934".parse().unwrap();
    assert_eq!(tris.nelems(), 2);
    let mesh = tris.to_mesh(&Tolerances::default()).unwrap();
    assert_eq!(mesh.eltype(), ElementType::Tri3);
    assert_eq!(mesh.npoints(), 4);
    assert_eq!(mesh.elems().row(0), &[0, 1, 2]);
    assert_eq!(mesh.elems().row(1), &[2, 3, 0]);

    let total: f64 = mesh.areas().unwrap().iter().sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    assert_eq!(mesh.borders().unwrap().nelems(), 4);
}

#[test]
fn extruded_square_has_sixteen_points_and_three_hexes() {
    let hexes = unit_quad().extrude(Vector3::z(), 3).unwrap();
    assert_eq!(hexes.eltype(), ElementType::Hex8);
    assert_eq!(hexes.npoints(), 16);
    assert_eq!(hexes.nelems(), 3);
    for row in hexes.elems().rows() {
        let mut nodes = row.to_vec();
        nodes.sort_unstable();
        nodes.dedup();
        assert_eq!(nodes.len(), 8);
    }
    let bbox = hexes.bbox().unwrap();
    assert_relative_eq!(bbox.max, Point3::new(1.0, 1.0, 3.0), epsilon = 1e-12);
}

#[test]
fn box_border_is_closed_and_outward() {
    let solid = quad_grid().extrude(Vector3::z(), 1).unwrap();
    assert_eq!(solid.npoints(), 18);
    assert_eq!(solid.nelems(), 4);
    let volume: f64 = solid.volumes().unwrap().iter().sum();
    assert_relative_eq!(volume, 4.0, epsilon = 1e-12);

    let skin = solid.borders().unwrap().compact().unwrap();
    assert_eq!(skin.eltype(), ElementType::Quad4);
    assert_eq!(skin.nelems(), 16);
    let area: f64 = skin.areas().unwrap().iter().sum();
    assert_relative_eq!(area, 16.0, epsilon = 1e-12);

    // A closed surface has no border of its own.
    assert_eq!(skin.borders().unwrap().nelems(), 0);

    // Outward normals point away from the box center.
    let center = solid.coords().center().unwrap();
    let centroids = skin.centroids().unwrap();
    for (n, c) in skin.normals().unwrap().iter().zip(centroids.iter()) {
        assert!(n.dot(&(c - center)) > 0.0);
    }

    // Six flat sides.
    let groups = skin.partition_by_angle(30.0).unwrap();
    assert_eq!(groups.iter().max().map(|g| g + 1), Some(6));
    let sides = skin.split(&groups).unwrap();
    assert_eq!(sides.len(), 6);
    assert_eq!(sides.iter().map(|s| s.nelems()).sum::<usize>(), 16);
    assert!(skin.partition_by_connection().unwrap().iter().all(|&g| g == 0));
}

#[test]
fn remove_duplicate_is_idempotent() {
    let quad = unit_quad();
    let pair = Mesh::concatenate(&[quad.clone(), quad.translate(Vector3::x()).unwrap()]).unwrap();
    assert_eq!(pair.npoints(), 8);

    let (once, report) = pair.remove_duplicate(1e-6).unwrap();
    assert_eq!(once.npoints(), 6);
    assert_eq!(report.merged_points, 2);
    assert_eq!(report.removed_elements, 0);

    let (twice, again) = once.remove_duplicate(1e-6).unwrap();
    assert!(again.is_empty());
    assert_eq!(twice, once);
}

#[test]
fn full_revolution_closes_after_fusing() {
    let line: Formex = "l:1".parse().unwrap();
    let line = line
        .translate(Vector3::x())
        .unwrap()
        .to_mesh(&Tolerances::default())
        .unwrap();
    let ring = line.revolve(Vector3::z(), 360.0, Point3::origin(), 4).unwrap();
    assert_eq!(ring.npoints(), 10);
    assert_eq!(ring.nelems(), 4);
    // Inner and outer arcs plus the two open seam edges.
    assert_eq!(ring.borders().unwrap().nelems(), 10);

    let (closed, report) = ring.fuse(&Tolerances::default()).unwrap();
    assert_eq!(report.merged_points, 2);
    assert_eq!(closed.npoints(), 8);
    assert_eq!(closed.borders().unwrap().nelems(), 8);
    let area: f64 = closed.areas().unwrap().iter().sum();
    // Four planar quads inscribed in the annulus 1 <= r <= 2.
    assert_relative_eq!(area, 2.0 * (4.0 - 1.0), epsilon = 1e-9);
}

#[test]
fn connected_lines_form_a_quad_strip() {
    let bottom: Formex = "l:11".parse().unwrap();
    let top = bottom.translate(Vector3::y()).unwrap();
    let tol = Tolerances::default();
    let a = bottom.to_mesh(&tol).unwrap();
    let b = top.to_mesh(&tol).unwrap();
    let strip = a.connect(&b, 2).unwrap();
    assert_eq!(strip.eltype(), ElementType::Quad4);
    assert_eq!(strip.nelems(), 4);
    let area: f64 = strip.areas().unwrap().iter().sum();
    assert_relative_eq!(area, 2.0, epsilon = 1e-12);

    let reversed = b.reverse();
    assert!(matches!(a.connect(&reversed, 2), Err(Error::Topology(_))));
}

#[test]
fn mesh_formex_round_trip_keeps_props() {
    let mesh = quad_grid().with_prop(vec![1, 2, 3, 4]).unwrap();
    let formex = mesh.to_formex().unwrap();
    assert_eq!(formex.nelems(), 4);
    assert_eq!(formex.eltype().unwrap(), ElementType::Quad4);
    let back = formex.to_mesh(&Tolerances::default()).unwrap();
    assert_eq!(back.npoints(), 9);
    assert_eq!(back.prop(), Some(&[1, 2, 3, 4][..]));
}
