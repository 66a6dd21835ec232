// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated affine maps.
//!
//! An [`Affine`] wraps a 4x4 homogeneous matrix whose last row is
//! `[0, 0, 0, 1]`. Angles are given in degrees throughout the crate.

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};

use crate::config::DEGENERATE_EPS;
use crate::error::{Error, Result};

/// An affine map `x -> A x + b`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine {
    matrix: Matrix4<f64>,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// The identity map.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wraps a 4x4 homogeneous matrix.
    ///
    /// Fails if any entry is not finite or if the last row is not `[0, 0, 0, 1]`.
    pub fn from_matrix4(matrix: Matrix4<f64>) -> Result<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(Error::geometry("affine", "matrix has non-finite entries"));
        }
        let last_row = [matrix[(3, 0)], matrix[(3, 1)], matrix[(3, 2)], matrix[(3, 3)]];
        if last_row != [0.0, 0.0, 0.0, 1.0] {
            return Err(Error::geometry(
                "affine",
                format!("last matrix row must be [0, 0, 0, 1], got {:?}", last_row),
            ));
        }
        Ok(Self { matrix })
    }

    /// Builds a map from the three rows of a 3x4 matrix `[A | b]`.
    pub fn from_rows3x4(rows: [[f64; 4]; 3]) -> Result<Self> {
        let mut matrix = Matrix4::identity();
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                matrix[(i, j)] = *value;
            }
        }
        Self::from_matrix4(matrix)
    }

    /// Builds a map from a linear part and a translation.
    pub fn from_parts(linear: Matrix3<f64>, translation: Vector3<f64>) -> Result<Self> {
        let mut matrix = Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&linear);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        Self::from_matrix4(matrix)
    }

    /// Translation over `v`.
    pub fn translation(v: Vector3<f64>) -> Result<Self> {
        Self::from_parts(Matrix3::identity(), v)
    }

    /// Scaling about the origin with per-axis factors.
    pub fn scaling(factors: Vector3<f64>) -> Result<Self> {
        Self::from_parts(Matrix3::from_diagonal(&factors), Vector3::zeros())
    }

    /// Rotation over `angle` degrees about `axis` through the point `around`.
    ///
    /// Positive angles rotate counter-clockwise when looking down the axis.
    pub fn rotation(angle: f64, axis: Vector3<f64>, around: Point3<f64>) -> Result<Self> {
        if !angle.is_finite() {
            return Err(Error::geometry("rotate", "angle is not finite"));
        }
        let unit_axis = Unit::try_new(axis, DEGENERATE_EPS)
            .ok_or_else(|| Error::geometry("rotate", "rotation axis has zero length"))?;
        let rotation = Rotation3::from_axis_angle(&unit_axis, angle.to_radians());
        let linear = *rotation.matrix();
        let translation = around.coords - linear * around.coords;
        Self::from_parts(linear, translation)
    }

    /// Reflection in the plane `x[axis] = pos`.
    pub fn reflection(axis: usize, pos: f64) -> Result<Self> {
        check_axis("reflect", axis)?;
        let mut factors = Vector3::repeat(1.0);
        factors[axis] = -1.0;
        let mut translation = Vector3::zeros();
        translation[axis] = 2.0 * pos;
        Self::from_parts(Matrix3::from_diagonal(&factors), translation)
    }

    /// The underlying homogeneous matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// The linear (upper-left 3x3) part.
    pub fn linear(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation part.
    pub fn translation_part(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Returns the map that applies `self` first, then `next`.
    pub fn then(&self, next: &Affine) -> Affine {
        Affine {
            matrix: next.matrix * self.matrix,
        }
    }

    /// The inverse map.
    ///
    /// Fails when the linear part is singular, i.e. its determinant is
    /// smaller than `tolerance` in absolute value.
    pub fn inverse(&self, tolerance: f64) -> Result<Affine> {
        let linear = self.linear();
        let det = linear.determinant();
        if det.abs() <= tolerance {
            return Err(Error::geometry(
                "inverse",
                format!("affine map is singular (det = {:e})", det),
            ));
        }
        let inv = linear
            .try_inverse()
            .ok_or_else(|| Error::geometry("inverse", "affine map is singular"))?;
        Self::from_parts(inv, -(inv * self.translation_part()))
    }

    /// Applies the map to a point.
    #[inline]
    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(p)
    }

    /// Applies the linear part to a direction vector.
    #[inline]
    pub fn apply_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transform_vector(v)
    }
}

pub(crate) fn check_axis(op: &'static str, axis: usize) -> Result<()> {
    if axis > 2 {
        return Err(Error::geometry(op, format!("axis must be 0, 1 or 2, got {}", axis)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_projective_matrix() {
        let mut m = Matrix4::identity();
        m[(3, 0)] = 1.0;
        assert!(matches!(
            Affine::from_matrix4(m),
            Err(Error::Geometry { op: "affine", .. })
        ));
    }

    #[test]
    fn rejects_non_finite_rows() {
        let rows = [[1.0, 0.0, 0.0, f64::NAN], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]];
        assert!(Affine::from_rows3x4(rows).is_err());
    }

    #[test]
    fn rotation_about_point() {
        let rot = Affine::rotation(90.0, Vector3::z(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let p = rot.apply(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rotation_with_zero_axis_fails() {
        let err = Affine::rotation(30.0, Vector3::zeros(), Point3::origin()).unwrap_err();
        assert!(matches!(err, Error::Geometry { op: "rotate", .. }));
    }

    #[test]
    fn inverse_round_trip() {
        let a = Affine::from_rows3x4([
            [2.0, 0.5, 0.0, 1.0],
            [0.0, 1.0, -0.3, 2.0],
            [0.1, 0.0, 3.0, -4.0],
        ])
        .unwrap();
        let inv = a.inverse(1e-12).unwrap();
        let p = Point3::new(0.3, -1.2, 5.0);
        assert_relative_eq!(inv.apply(&a.apply(&p)), p, epsilon = 1e-12);
    }

    #[test]
    fn singular_map_has_no_inverse() {
        let a = Affine::scaling(Vector3::new(1.0, 0.0, 1.0)).unwrap();
        assert!(matches!(
            a.inverse(1e-12),
            Err(Error::Geometry { op: "inverse", .. })
        ));
    }

    #[test]
    fn then_applies_in_order() {
        let t = Affine::translation(Vector3::new(1.0, 0.0, 0.0)).unwrap();
        let s = Affine::scaling(Vector3::repeat(2.0)).unwrap();
        let p = t.then(&s).apply(&Point3::origin());
        assert_relative_eq!(p, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn reflection_in_plane() {
        let r = Affine::reflection(1, 2.0).unwrap();
        assert_relative_eq!(r.apply(&Point3::new(1.0, 1.0, 1.0)), Point3::new(1.0, 3.0, 1.0));
        assert!(Affine::reflection(3, 0.0).is_err());
    }
}
