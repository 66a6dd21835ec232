// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use formex_core::{ElementType, Error, Tolerances};
use formex_curve::{
    Arc, ArcDirection, BezierSpline, Curve, KnotVector, Line, NurbsCurve, ParametricCurve,
    PolyLine, Sampling,
};
use nalgebra::{Point3, Vector3};

fn line(a: [f64; 3], b: [f64; 3]) -> Line {
    Line::new(Point3::from(a), Point3::from(b)).unwrap()
}

#[test]
fn joined_lines_keep_outer_endpoints() {
    let tol = Tolerances::default();
    let path = Curve::from(line([0., 0., 0.], [1., 0., 0.]))
        .append(line([1., 0., 0.], [1., 1., 0.]), tol.continuity)
        .unwrap();
    let (start, end) = path.endpoints().unwrap();
    assert_eq!(start, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(end, Point3::new(1.0, 1.0, 0.0));
    assert_eq!(path.domain().end, 2.0);
}

#[test]
fn joining_across_a_gap_fails() {
    let tol = Tolerances::default();
    let err = Curve::from(line([0., 0., 0.], [1., 0., 0.]))
        .append(line([2., 0., 0.], [3., 0., 0.]), tol.continuity)
        .unwrap_err();
    assert_eq!(
        err,
        Error::Continuity {
            gap: 1.0,
            tolerance: tol.continuity
        }
    );
}

#[test]
fn clamped_nurbs_hits_first_and_last_control_point() {
    let control = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 3.0, 0.0),
        Point3::new(2.0, -1.0, 1.0),
        Point3::new(4.0, 2.0, 0.0),
        Point3::new(5.0, 0.0, -1.0),
        Point3::new(7.0, 1.0, 0.0),
    ];
    for degree in 1..=4 {
        for weights in [None, Some(vec![1.0, 0.5, 2.0, 3.0, 0.25, 1.5])] {
            let curve = NurbsCurve::clamped(control.clone(), weights, degree).unwrap();
            let (a, b) = curve.endpoints().unwrap();
            assert_relative_eq!(a, control[0], epsilon = 1e-12);
            assert_relative_eq!(b, control[5], epsilon = 1e-12);
        }
    }

    // Any clamped knot vector, here a non-uniform one.
    let knots = KnotVector::new(vec![0., 0., 0., 0.1, 0.7, 2., 2., 2.]).unwrap();
    let curve = NurbsCurve::new(control[..5].to_vec(), vec![1.0, 2.0, 1.0, 0.5, 1.0], knots, 2).unwrap();
    assert!(curve.is_clamped());
    assert!(!curve.is_uniform());
    assert_relative_eq!(curve.point_at(0.0).unwrap(), control[0], epsilon = 1e-12);
    assert_relative_eq!(curve.point_at(2.0).unwrap(), control[4], epsilon = 1e-12);
    assert!(matches!(curve.point_at(2.5), Err(Error::Domain { .. })));
    assert!(matches!(curve.point_at(f64::NAN), Err(Error::Domain { .. })));
}

#[test]
fn arc_and_nurbs_circle_agree() {
    let arc = Arc::new(Point3::new(0.0, 0.0, 1.0), 2.0, 0.0, 360.0, ArcDirection::CounterClockwise).unwrap();
    assert!(arc.is_closed());
    let nurbs = arc.to_nurbs().unwrap();
    let mesh = nurbs.to_mesh(Sampling::PerPart(8)).unwrap();
    assert_eq!(mesh.eltype(), ElementType::Line2);
    // Four knot spans, closed by construction but not periodic.
    assert_eq!(mesh.nelems(), 32);
    let length: f64 = mesh.lengths().unwrap().iter().sum();
    assert_relative_eq!(length, arc.length(), max_relative = 1e-2);

    let ring = arc.to_mesh(Sampling::Total(12)).unwrap();
    assert_eq!(ring.npoints(), 12);
    assert_eq!(ring.nelems(), 12);
    assert!(ring.borders().unwrap().nelems() == 0);
}

#[test]
fn spline_path_to_polyline() {
    let points = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(6.0, 1.0, 0.0),
    ];
    let spline = BezierSpline::through(&points, 1.0 / 3.0, false).unwrap();
    let poly = spline.to_polyline(31).unwrap();
    assert_eq!(poly.vertices().len(), 31);
    assert_relative_eq!(poly.vertices()[10], points[1], epsilon = 1e-12);
    assert_relative_eq!(poly.vertices()[30], points[3], epsilon = 1e-12);

    let even = poly.sample_by_length(5).unwrap();
    assert_eq!(even.len(), 5);
    assert_relative_eq!(even[0], points[0], epsilon = 1e-12);
    assert_relative_eq!(even[4], points[3], epsilon = 1e-12);
}

#[test]
fn composite_of_mixed_curves_meshes_every_part() {
    let tol = Tolerances::default();
    let quarter = Arc::new(Point3::new(1.0, 1.0, 0.0), 1.0, -90.0, 0.0, ArcDirection::CounterClockwise).unwrap();
    let tail = PolyLine::new(
        vec![Point3::new(2.0, 1.0, 0.0), Point3::new(2.0, 2.0, 0.0), Point3::new(3.0, 2.0, 0.0)],
        false,
    )
    .unwrap();
    let path = Curve::from(line([0., 0., 0.], [1., 0., 0.]))
        .append(quarter, tol.continuity)
        .unwrap()
        .append(tail, tol.continuity)
        .unwrap();
    assert_eq!(path.domain().end, 4.0);
    let mesh = path.to_mesh(Sampling::PerPart(2)).unwrap();
    assert_eq!(mesh.nelems(), 8);
    assert_eq!(mesh.partition_by_connection().unwrap(), vec![0; 8]);

    let tangent = path.derivative_at(2.0).unwrap();
    assert_relative_eq!(tangent, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
}
