// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Piecewise Bezier curves.

use formex_core::{Error, Result, DEGENERATE_EPS};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

use crate::curve::ParametricCurve;
use crate::domain::ParamDomain;
use crate::knots::KnotVector;
use crate::nurbs::NurbsCurve;

/// Control points of one Bezier part.
pub type Part = SmallVec<[Point3<f64>; 4]>;

/// All intermediate point sets of the de Casteljau construction at `t`.
///
/// The first set is `control`, every next set is one point shorter, and
/// the last set holds the single curve point.
pub fn de_casteljau(control: &[Point3<f64>], t: f64) -> Result<Vec<Vec<Point3<f64>>>> {
    if control.is_empty() {
        return Err(Error::geometry("de_casteljau", "no control points"));
    }
    let mut levels = vec![control.to_vec()];
    while let Some(last) = levels.last().filter(|l| l.len() > 1) {
        let next = last.windows(2).map(|w| w[0] + (w[1] - w[0]) * t).collect();
        levels.push(next);
    }
    Ok(levels)
}

/// Splits a Bezier curve at `t` into the control points of its two
/// halves, both of the same degree.
pub fn split_bezier(
    control: &[Point3<f64>],
    t: f64,
) -> Result<(Vec<Point3<f64>>, Vec<Point3<f64>>)> {
    let levels = de_casteljau(control, t)?;
    let left = levels.iter().map(|l| l[0]).collect();
    let right = levels.iter().rev().map(|l| l[l.len() - 1]).collect();
    Ok((left, right))
}

fn bezier_point(control: &[Point3<f64>], t: f64) -> Point3<f64> {
    let mut pts: Part = control.iter().copied().collect();
    for len in (1..pts.len()).rev() {
        for i in 0..len {
            pts[i] = pts[i] + (pts[i + 1] - pts[i]) * t;
        }
    }
    pts[0]
}

/// Derivative of a Bezier curve: the degree-lowered curve of the control
/// point differences, times the degree.
fn bezier_derivative(control: &[Point3<f64>], t: f64) -> Vector3<f64> {
    let d = control.len() - 1;
    let mut diffs: SmallVec<[Vector3<f64>; 4]> = control.windows(2).map(|w| w[1] - w[0]).collect();
    for len in (1..diffs.len()).rev() {
        for i in 0..len {
            diffs[i] = diffs[i] + (diffs[i + 1] - diffs[i]) * t;
        }
    }
    diffs[0] * d as f64
}

/// A chain of Bezier parts of the same degree sharing their end points.
///
/// An open spline of `nparts` parts has `nparts * degree + 1` control
/// points; a closed one has `nparts * degree`, its last part ending at the
/// first control point. The parameter runs from 0 to `nparts`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezierSpline {
    control: Vec<Point3<f64>>,
    degree: usize,
    closed: bool,
}

impl BezierSpline {
    pub fn new(control: Vec<Point3<f64>>, degree: usize, closed: bool) -> Result<Self> {
        if degree == 0 {
            return Err(Error::geometry("bezier", "degree must be at least 1"));
        }
        let n = control.len();
        let fits = if closed {
            n >= 2 && n % degree == 0
        } else {
            n > degree && (n - 1) % degree == 0
        };
        if !fits {
            return Err(Error::geometry(
                "bezier",
                format!(
                    "{} control points do not form {} parts of degree {}",
                    n,
                    if closed { "closed" } else { "open" },
                    degree
                ),
            ));
        }
        if !control.iter().all(|p| p.iter().all(|v| v.is_finite())) {
            return Err(Error::geometry("bezier", "control points must be finite"));
        }
        Ok(Self {
            control,
            degree,
            closed,
        })
    }

    /// A smooth cubic spline through `points`.
    ///
    /// The tangent direction at a point averages the directions of the
    /// adjacent chords; inner control points sit `curl` times the chord
    /// length away from the end points along those tangents. A `curl` of
    /// 1/3 reproduces straight lines with uniform speed.
    pub fn through(points: &[Point3<f64>], curl: f64, closed: bool) -> Result<Self> {
        let n = points.len();
        let min = if closed { 3 } else { 2 };
        if n < min {
            return Err(Error::geometry(
                "bezier",
                format!("need at least {} points, got {}", min, n),
            ));
        }
        if !curl.is_finite() {
            return Err(Error::geometry("bezier", "curl must be finite"));
        }
        let nseg = if closed { n } else { n - 1 };
        let chords: Vec<Vector3<f64>> = (0..nseg).map(|i| points[(i + 1) % n] - points[i]).collect();
        let lengths: Vec<f64> = chords.iter().map(|c| c.norm()).collect();
        if lengths.iter().any(|&l| l <= DEGENERATE_EPS) {
            return Err(Error::geometry("bezier", "consecutive points coincide"));
        }
        let dirs: Vec<Vector3<f64>> = chords.iter().zip(&lengths).map(|(c, l)| c / *l).collect();

        let tangents: Vec<Vector3<f64>> = (0..n)
            .map(|i| {
                let incoming = if i > 0 {
                    Some(dirs[i - 1])
                } else if closed {
                    Some(dirs[nseg - 1])
                } else {
                    None
                };
                let outgoing = dirs.get(i).copied();
                match (incoming, outgoing) {
                    (Some(a), Some(b)) => {
                        let avg = a + b;
                        if avg.norm() <= DEGENERATE_EPS {
                            b
                        } else {
                            avg.normalize()
                        }
                    }
                    (Some(a), None) => a,
                    (None, Some(b)) => b,
                    (None, None) => Vector3::zeros(),
                }
            })
            .collect();

        let mut control = Vec::with_capacity(3 * nseg + 1);
        for i in 0..nseg {
            let j = (i + 1) % n;
            let reach = lengths[i] * curl;
            control.push(points[i]);
            control.push(points[i] + tangents[i] * reach);
            control.push(points[j] - tangents[j] * reach);
        }
        if !closed {
            control.push(points[n - 1]);
        }
        Self::new(control, 3, closed)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control
    }

    pub fn nparts(&self) -> usize {
        if self.closed {
            self.control.len() / self.degree
        } else {
            (self.control.len() - 1) / self.degree
        }
    }

    /// Control points of part `i`.
    pub fn part(&self, i: usize) -> Part {
        let n = self.control.len();
        (0..=self.degree)
            .map(|k| self.control[(i * self.degree + k) % n])
            .collect()
    }

    pub fn parts(&self) -> Vec<Part> {
        (0..self.nparts()).map(|i| self.part(i)).collect()
    }

    fn locate(&self, u: f64) -> Result<(usize, f64)> {
        let u = self.domain().clamp_param(u)?;
        let i = (u.floor() as usize).min(self.nparts() - 1);
        Ok((i, u - i as f64))
    }

    pub fn reverse(&self) -> BezierSpline {
        let mut control = self.control.clone();
        if self.closed {
            // Keep the first control point as the start.
            control[1..].reverse();
        } else {
            control.reverse();
        }
        BezierSpline {
            control,
            degree: self.degree,
            closed: self.closed,
        }
    }

    /// The same curve as a non-rational NURBS with knots `0, 1, .., nparts`
    /// of multiplicity `degree`. A closed spline becomes an open NURBS
    /// whose ends coincide.
    pub fn to_nurbs(&self) -> Result<NurbsCurve> {
        let mut control = self.control.clone();
        if self.closed {
            control.push(self.control[0]);
        }
        let n = control.len();
        let knots = KnotVector::generate(n, self.degree, false, false)?;
        NurbsCurve::new(control, vec![1.0; n], knots, self.degree)
    }
}

impl ParametricCurve for BezierSpline {
    fn domain(&self) -> ParamDomain {
        ParamDomain {
            start: 0.0,
            end: self.nparts() as f64,
            periodic: self.closed,
        }
    }

    fn point_at(&self, u: f64) -> Result<Point3<f64>> {
        let (i, t) = self.locate(u)?;
        Ok(bezier_point(&self.part(i), t))
    }

    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>> {
        let (i, t) = self.locate(u)?;
        Ok(bezier_derivative(&self.part(i), t))
    }

    fn breaks(&self) -> Vec<f64> {
        (0..=self.nparts()).map(|i| i as f64).collect()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
