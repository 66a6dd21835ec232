// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The common curve interface and the closed set of curve kinds.
//!
//! Every curve is a pure map from a [`ParamDomain`] to 3D points. Sampling
//! produces concrete point lists or Line2 meshes; nothing is evaluated
//! lazily and no curve holds mutable state.

use formex_core::{Connectivity, Coords, ElementType, Error, Result};
use formex_mesh::Mesh;
use nalgebra::{Point3, Vector3};

use crate::arc::Arc;
use crate::bezier::BezierSpline;
use crate::composite::CompositeCurve;
use crate::domain::ParamDomain;
use crate::nurbs::NurbsCurve;
use crate::polyline::{Line, PolyLine};

/// How a curve is divided into straight segments by
/// [`ParametricCurve::to_mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampling {
    /// `n` equal parameter steps in every natural part of the curve
    /// (polyline segment, Bezier part, knot span, sub-curve).
    PerPart(usize),
    /// `n` equal parameter steps over the whole domain.
    Total(usize),
    /// Parts are halved until the curve stays within `tolerance` of every
    /// chord, or `max_depth` halvings were made.
    Adaptive { tolerance: f64, max_depth: usize },
}

/// A parametric curve in 3D.
pub trait ParametricCurve {
    fn domain(&self) -> ParamDomain;

    /// The point at parameter `u`.
    fn point_at(&self, u: f64) -> Result<Point3<f64>>;

    /// The first derivative with respect to the parameter at `u`. At the
    /// junction of two parts the derivative of the later part is returned.
    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>>;

    /// Parameter values where the curve's natural parts meet, including
    /// both domain ends.
    fn breaks(&self) -> Vec<f64> {
        let d = self.domain();
        vec![d.start, d.end]
    }

    fn is_closed(&self) -> bool {
        self.domain().periodic
    }

    /// The start and end point.
    fn endpoints(&self) -> Result<(Point3<f64>, Point3<f64>)> {
        let d = self.domain();
        Ok((self.point_at(d.start)?, self.point_at(d.end)?))
    }

    /// The points at the given parameter values, in order.
    fn sample_at(&self, params: &[f64]) -> Result<Coords> {
        let points = params
            .iter()
            .map(|&u| self.point_at(u))
            .collect::<Result<Vec<_>>>()?;
        Coords::new(points)
    }

    /// `n >= 2` points at equally spaced parameter values including both
    /// ends. Closed curves leave out the end, which repeats the start.
    fn sample(&self, n: usize) -> Result<Coords> {
        if n < 2 {
            return Err(Error::geometry("sample", "need at least two samples"));
        }
        let d = self.domain();
        let div = (if self.is_closed() { n } else { n - 1 }) as f64;
        let params: Vec<f64> = (0..n).map(|i| d.lerp(i as f64 / div)).collect();
        self.sample_at(&params)
    }

    /// The polyline through [`ParametricCurve::sample`] points, closed
    /// when the curve is.
    fn to_polyline(&self, n: usize) -> Result<PolyLine> {
        PolyLine::new(self.sample(n)?.into_points(), self.is_closed())
    }

    /// Ascending parameter values, including both domain ends, at which
    /// the curve is sampled for `sampling`.
    fn sampling_params(&self, sampling: Sampling) -> Result<Vec<f64>> {
        let breaks = self.breaks();
        let mut params = vec![breaks[0]];
        match sampling {
            Sampling::Total(n) | Sampling::PerPart(n) if n == 0 => {
                return Err(Error::geometry("sampling", "need at least one division"));
            }
            Sampling::Total(n) => {
                let d = self.domain();
                params.extend((1..=n).map(|i| d.lerp(i as f64 / n as f64)));
            }
            Sampling::PerPart(n) => {
                for w in breaks.windows(2) {
                    params.extend((1..=n).map(|i| w[0] + (w[1] - w[0]) * i as f64 / n as f64));
                }
            }
            Sampling::Adaptive {
                tolerance,
                max_depth,
            } => {
                if !(tolerance.is_finite() && tolerance > 0.0) {
                    return Err(Error::geometry(
                        "sampling",
                        format!("adaptive tolerance must be positive, got {}", tolerance),
                    ));
                }
                for w in breaks.windows(2) {
                    refine(self, w[0], w[1], tolerance, max_depth, &mut params)?;
                }
            }
        }
        Ok(params)
    }

    /// A Line2 mesh through the sampled points. Closed curves share the
    /// start point between the first and the last segment.
    fn to_mesh(&self, sampling: Sampling) -> Result<Mesh> {
        let mut params = self.sampling_params(sampling)?;
        let closed = self.is_closed();
        if closed {
            params.pop();
        }
        let coords = self.sample_at(&params)?;
        let n = coords.len();
        let min_points = if closed { 3 } else { 2 };
        if n < min_points {
            return Err(Error::geometry("to_mesh", "too few samples for a line mesh"));
        }
        let nseg = if closed { n } else { n - 1 };
        let data = (0..nseg).flat_map(|i| [i, (i + 1) % n]).collect();
        tracing::debug!(points = n, segments = nseg, closed, "sampled curve");
        Mesh::new(coords, Connectivity::new(ElementType::Line2, data)?)
    }
}

/// Appends the parameters subdividing `(a, b]` to `out`.
fn refine<C>(curve: &C, a: f64, b: f64, tol: f64, depth: usize, out: &mut Vec<f64>) -> Result<()>
where
    C: ParametricCurve + ?Sized,
{
    let pa = curve.point_at(a)?;
    let pb = curve.point_at(b)?;
    let mut flat = true;
    for t in [0.25, 0.5, 0.75] {
        if chord_distance(&curve.point_at(a + t * (b - a))?, &pa, &pb) > tol {
            flat = false;
            break;
        }
    }
    if flat || depth == 0 {
        out.push(b);
        return Ok(());
    }
    let mid = 0.5 * (a + b);
    refine(curve, a, mid, tol, depth - 1, out)?;
    refine(curve, mid, b, tol, depth - 1, out)
}

/// Distance from `p` to the segment `a`-`b`.
fn chord_distance(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Any of the supported curve kinds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    PolyLine(PolyLine),
    Line(Line),
    Arc(Arc),
    Bezier(BezierSpline),
    Nurbs(NurbsCurve),
    Composite(CompositeCurve),
}

impl Curve {
    /// Joins `other` to the end of this curve.
    ///
    /// Fails with [`Error::Continuity`] when the end of this curve is more
    /// than `tolerance` away from the start of `other`.
    pub fn append(self, other: impl Into<Curve>, tolerance: f64) -> Result<Curve> {
        let composite = match self {
            Curve::Composite(c) => c,
            curve => CompositeCurve::new(curve),
        };
        Ok(Curve::Composite(composite.append(other.into(), tolerance)?))
    }
}

impl ParametricCurve for Curve {
    fn domain(&self) -> ParamDomain {
        match self {
            Curve::PolyLine(c) => c.domain(),
            Curve::Line(c) => c.domain(),
            Curve::Arc(c) => c.domain(),
            Curve::Bezier(c) => c.domain(),
            Curve::Nurbs(c) => c.domain(),
            Curve::Composite(c) => c.domain(),
        }
    }

    fn point_at(&self, u: f64) -> Result<Point3<f64>> {
        match self {
            Curve::PolyLine(c) => c.point_at(u),
            Curve::Line(c) => c.point_at(u),
            Curve::Arc(c) => c.point_at(u),
            Curve::Bezier(c) => c.point_at(u),
            Curve::Nurbs(c) => c.point_at(u),
            Curve::Composite(c) => c.point_at(u),
        }
    }

    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>> {
        match self {
            Curve::PolyLine(c) => c.derivative_at(u),
            Curve::Line(c) => c.derivative_at(u),
            Curve::Arc(c) => c.derivative_at(u),
            Curve::Bezier(c) => c.derivative_at(u),
            Curve::Nurbs(c) => c.derivative_at(u),
            Curve::Composite(c) => c.derivative_at(u),
        }
    }

    fn breaks(&self) -> Vec<f64> {
        match self {
            Curve::PolyLine(c) => c.breaks(),
            Curve::Line(c) => c.breaks(),
            Curve::Arc(c) => c.breaks(),
            Curve::Bezier(c) => c.breaks(),
            Curve::Nurbs(c) => c.breaks(),
            Curve::Composite(c) => c.breaks(),
        }
    }
}

impl From<PolyLine> for Curve {
    fn from(c: PolyLine) -> Self {
        Curve::PolyLine(c)
    }
}

impl From<Line> for Curve {
    fn from(c: Line) -> Self {
        Curve::Line(c)
    }
}

impl From<Arc> for Curve {
    fn from(c: Arc) -> Self {
        Curve::Arc(c)
    }
}

impl From<BezierSpline> for Curve {
    fn from(c: BezierSpline) -> Self {
        Curve::Bezier(c)
    }
}

impl From<NurbsCurve> for Curve {
    fn from(c: NurbsCurve) -> Self {
        Curve::Nurbs(c)
    }
}

impl From<CompositeCurve> for Curve {
    fn from(c: CompositeCurve) -> Self {
        Curve::Composite(c)
    }
}
