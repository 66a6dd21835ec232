// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circular arcs.

use formex_core::{Error, Result, DEGENERATE_EPS};
use nalgebra::{Point3, Vector3};

use crate::curve::ParametricCurve;
use crate::domain::ParamDomain;
use crate::nurbs::NurbsCurve;

/// Slack on angle comparisons, in degrees.
const ANGLE_EPS: f64 = 1e-9;

/// Sense of rotation from the start to the end angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArcDirection {
    CounterClockwise,
    Clockwise,
}

/// A circular arc over the parameter domain `[0, 1]`.
///
/// Angles are in degrees, measured in the plane spanned by the unit
/// vectors `x_axis` and `y_axis` from `x_axis` towards `y_axis`. The sweep
/// is signed: positive counter-clockwise, negative clockwise. A sweep of
/// 360 degrees is a full circle with a periodic domain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc {
    center: Point3<f64>,
    radius: f64,
    x_axis: Vector3<f64>,
    y_axis: Vector3<f64>,
    start_deg: f64,
    sweep_deg: f64,
}

impl Arc {
    /// An arc in the plane `z = center.z` from `start_deg` to `end_deg`.
    ///
    /// Going counter-clockwise from 0 to 270 sweeps 270 degrees; going
    /// clockwise sweeps 90. Equal angles a multiple of 360 apart give a
    /// full circle, identical angles are rejected.
    pub fn new(
        center: Point3<f64>,
        radius: f64,
        start_deg: f64,
        end_deg: f64,
        direction: ArcDirection,
    ) -> Result<Self> {
        if !(start_deg.is_finite() && end_deg.is_finite()) {
            return Err(Error::geometry("arc", "angles must be finite"));
        }
        let delta = match direction {
            ArcDirection::CounterClockwise => end_deg - start_deg,
            ArcDirection::Clockwise => start_deg - end_deg,
        };
        let mut sweep = delta.rem_euclid(360.0);
        if sweep <= ANGLE_EPS || 360.0 - sweep <= ANGLE_EPS {
            if delta.abs() <= ANGLE_EPS {
                return Err(Error::geometry("arc", "sweep angle is zero"));
            }
            sweep = 360.0;
        }
        if direction == ArcDirection::Clockwise {
            sweep = -sweep;
        }
        Self::with_frame(center, radius, Vector3::x(), Vector3::y(), start_deg, sweep)
    }

    /// A full counter-clockwise circle in the plane `z = center.z`.
    pub fn circle(center: Point3<f64>, radius: f64) -> Result<Self> {
        Self::with_frame(center, radius, Vector3::x(), Vector3::y(), 0.0, 360.0)
    }

    fn with_frame(
        center: Point3<f64>,
        radius: f64,
        x_axis: Vector3<f64>,
        y_axis: Vector3<f64>,
        start_deg: f64,
        sweep_deg: f64,
    ) -> Result<Self> {
        if !center.iter().all(|v| v.is_finite()) {
            return Err(Error::geometry("arc", "center must be finite"));
        }
        if !(radius.is_finite() && radius > DEGENERATE_EPS) {
            return Err(Error::geometry(
                "arc",
                format!("radius must be positive, got {}", radius),
            ));
        }
        Ok(Self {
            center,
            radius,
            x_axis,
            y_axis,
            start_deg,
            sweep_deg,
        })
    }

    /// The arc from `p0` through `p1` to `p2`, on their circumscribed
    /// circle. Fails when the points are collinear or coincide.
    pub fn through_points(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>) -> Result<Self> {
        let a = p1 - p0;
        let b = p2 - p0;
        let n = a.cross(&b);
        let n2 = n.norm_squared();
        if n2 <= DEGENERATE_EPS * a.norm_squared() * b.norm_squared() || n2 == 0.0 {
            return Err(Error::geometry("arc", "points are collinear"));
        }
        let center = p0 + (b * a.norm_squared() - a * b.norm_squared()).cross(&n) / (2.0 * n2);
        let radius = (p0 - center).norm();
        let x_axis = (p0 - center) / radius;
        let y_axis = n.normalize().cross(&x_axis);
        // p0, p1, p2 wind counter-clockwise around n, so p2 is reached
        // counter-clockwise from p0 after passing p1.
        let v = p2 - center;
        let sweep = v.dot(&y_axis).atan2(v.dot(&x_axis)).to_degrees().rem_euclid(360.0);
        Self::with_frame(center, radius, x_axis, y_axis, 0.0, sweep)
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unit normal of the arc plane; counter-clockwise is positive around it.
    pub fn normal(&self) -> Vector3<f64> {
        self.x_axis.cross(&self.y_axis)
    }

    pub fn start_angle(&self) -> f64 {
        self.start_deg
    }

    pub fn end_angle(&self) -> f64 {
        self.start_deg + self.sweep_deg
    }

    /// Signed sweep in degrees.
    pub fn sweep(&self) -> f64 {
        self.sweep_deg
    }

    pub fn direction(&self) -> ArcDirection {
        if self.sweep_deg < 0.0 {
            ArcDirection::Clockwise
        } else {
            ArcDirection::CounterClockwise
        }
    }

    pub fn is_full_circle(&self) -> bool {
        (self.sweep_deg.abs() - 360.0).abs() <= ANGLE_EPS
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep_deg.abs().to_radians()
    }

    /// The same arc traversed from its end to its start.
    pub fn reverse(&self) -> Arc {
        Arc {
            start_deg: self.end_angle(),
            sweep_deg: -self.sweep_deg,
            ..*self
        }
    }

    fn point_at_angle(&self, deg: f64) -> Point3<f64> {
        let (s, c) = deg.to_radians().sin_cos();
        self.center + (self.x_axis * c + self.y_axis * s) * self.radius
    }

    /// The exact rational quadratic representation.
    pub fn to_nurbs(&self) -> Result<NurbsCurve> {
        if self.sweep_deg > 0.0 {
            NurbsCurve::circle_arc(
                self.center,
                self.radius,
                self.x_axis,
                self.y_axis,
                self.start_deg,
                self.end_angle(),
            )
        } else {
            // Clockwise in (x, y) is counter-clockwise in (x, -y).
            NurbsCurve::circle_arc(
                self.center,
                self.radius,
                self.x_axis,
                -self.y_axis,
                -self.start_deg,
                -self.end_angle(),
            )
        }
    }
}

impl ParametricCurve for Arc {
    fn domain(&self) -> ParamDomain {
        ParamDomain {
            start: 0.0,
            end: 1.0,
            periodic: self.is_full_circle(),
        }
    }

    fn point_at(&self, u: f64) -> Result<Point3<f64>> {
        let t = self.domain().clamp_param(u)?;
        Ok(self.point_at_angle(self.start_deg + t * self.sweep_deg))
    }

    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>> {
        let t = self.domain().clamp_param(u)?;
        let (s, c) = (self.start_deg + t * self.sweep_deg).to_radians().sin_cos();
        Ok((self.y_axis * c - self.x_axis * s) * (self.radius * self.sweep_deg.to_radians()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn direction_selects_the_sweep() {
        let c = Point3::origin();
        let ccw = Arc::new(c, 2.0, 0.0, 270.0, ArcDirection::CounterClockwise).unwrap();
        let cw = Arc::new(c, 2.0, 0.0, 270.0, ArcDirection::Clockwise).unwrap();
        assert_relative_eq!(ccw.sweep(), 270.0);
        assert_relative_eq!(cw.sweep(), -90.0);
        assert_relative_eq!(ccw.point_at(0.5).unwrap(), Point3::new(-2.0_f64.sqrt(), 2.0_f64.sqrt(), 0.0), epsilon = 1e-12);
        assert_relative_eq!(cw.point_at(1.0).unwrap(), Point3::new(0.0, -2.0, 0.0), epsilon = 1e-12);
        assert_eq!(cw.direction(), ArcDirection::Clockwise);
    }

    #[test]
    fn full_circle_is_periodic() {
        let full = Arc::new(Point3::origin(), 1.0, 30.0, 390.0, ArcDirection::CounterClockwise).unwrap();
        assert!(full.is_full_circle());
        assert!(full.is_closed());
        assert_relative_eq!(full.length(), 2.0 * std::f64::consts::PI);
        assert!(Arc::new(Point3::origin(), 1.0, 30.0, 30.0, ArcDirection::CounterClockwise).is_err());
        assert!(Arc::new(Point3::origin(), 0.0, 0.0, 90.0, ArcDirection::CounterClockwise).is_err());
    }

    #[test]
    fn derivative_is_tangent_with_sweep_speed() {
        let arc = Arc::new(Point3::origin(), 1.0, 0.0, 90.0, ArcDirection::CounterClockwise).unwrap();
        let d = arc.derivative_at(0.0).unwrap();
        assert_relative_eq!(d, Vector3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0), epsilon = 1e-12);
        let back = arc.reverse().derivative_at(1.0).unwrap();
        assert_relative_eq!(back, -d, epsilon = 1e-12);
    }

    #[test]
    fn circumscribed_arc() {
        let p0 = Point3::new(1.0, 0.0, 5.0);
        let p1 = Point3::new(0.0, 1.0, 5.0);
        let p2 = Point3::new(-1.0, 0.0, 5.0);
        let arc = Arc::through_points(p0, p1, p2).unwrap();
        assert_relative_eq!(arc.center(), Point3::new(0.0, 0.0, 5.0), epsilon = 1e-12);
        assert_relative_eq!(arc.radius(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.sweep(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(arc.point_at(0.5).unwrap(), p1, epsilon = 1e-12);
        assert_relative_eq!(arc.point_at(1.0).unwrap(), p2, epsilon = 1e-12);

        let collinear = Arc::through_points(p0, Point3::new(2.0, 0.0, 5.0), Point3::new(3.0, 0.0, 5.0));
        assert!(matches!(collinear, Err(Error::Geometry { .. })));
    }

    #[test]
    fn nurbs_form_stays_on_the_circle() {
        for arc in [
            Arc::new(Point3::new(1.0, 2.0, 0.0), 3.0, 10.0, 200.0, ArcDirection::CounterClockwise).unwrap(),
            Arc::new(Point3::new(1.0, 2.0, 0.0), 3.0, 10.0, 200.0, ArcDirection::Clockwise).unwrap(),
        ] {
            let nurbs = arc.to_nurbs().unwrap();
            let (a, b) = nurbs.endpoints().unwrap();
            let (ea, eb) = arc.endpoints().unwrap();
            assert_relative_eq!(a, ea, epsilon = 1e-9);
            assert_relative_eq!(b, eb, epsilon = 1e-9);
            for p in nurbs.sample(17).unwrap().iter() {
                assert_relative_eq!((p - arc.center()).norm(), 3.0, epsilon = 1e-9);
            }
        }
    }
}
