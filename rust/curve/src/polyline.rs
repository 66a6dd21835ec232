// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Piecewise-linear curves.

use formex_core::{Coords, Error, Result, DEGENERATE_EPS};
use nalgebra::{Point3, Vector3};

use crate::curve::ParametricCurve;
use crate::domain::ParamDomain;

fn check_finite(op: &'static str, points: &[Point3<f64>]) -> Result<()> {
    if points.iter().all(|p| p.iter().all(|v| v.is_finite())) {
        Ok(())
    } else {
        Err(Error::geometry(op, "points must be finite"))
    }
}

/// A chain of straight segments through a list of vertices.
///
/// The parameter runs from 0 to the number of segments; segment `i` covers
/// `[i, i + 1]`. A closed polyline adds the segment from the last vertex
/// back to the first and has a periodic domain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PolyLineParts"))]
pub struct PolyLine {
    points: Vec<Point3<f64>>,
    closed: bool,
}

impl PolyLine {
    /// Needs two vertices, or three when closed.
    pub fn new(points: Vec<Point3<f64>>, closed: bool) -> Result<Self> {
        let min = if closed { 3 } else { 2 };
        if points.len() < min {
            return Err(Error::geometry(
                "polyline",
                format!("need at least {} points, got {}", min, points.len()),
            ));
        }
        check_finite("polyline", &points)?;
        Ok(Self { points, closed })
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn nsegments(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    fn segment(&self, i: usize) -> (Point3<f64>, Point3<f64>) {
        (self.points[i], self.points[(i + 1) % self.points.len()])
    }

    /// Segment index and local parameter in `[0, 1]` for `u`.
    fn locate(&self, u: f64) -> Result<(usize, f64)> {
        let u = self.domain().clamp_param(u)?;
        let i = (u.floor() as usize).min(self.nsegments() - 1);
        Ok((i, u - i as f64))
    }

    /// Length of every segment.
    pub fn lengths(&self) -> Vec<f64> {
        (0..self.nsegments())
            .map(|i| {
                let (a, b) = self.segment(i);
                (b - a).norm()
            })
            .collect()
    }

    pub fn length(&self) -> f64 {
        self.lengths().iter().sum()
    }

    /// `n` points equally spaced along the polyline by arc length,
    /// including both ends. Closed polylines leave out the end point.
    pub fn sample_by_length(&self, n: usize) -> Result<Coords> {
        if n < 2 {
            return Err(Error::geometry("sample_by_length", "need at least two samples"));
        }
        let lengths = self.lengths();
        let total: f64 = lengths.iter().sum();
        if total <= DEGENERATE_EPS {
            return Err(Error::geometry("sample_by_length", "polyline has zero length"));
        }
        let div = (if self.closed { n } else { n - 1 }) as f64;

        let mut points = Vec::with_capacity(n);
        let mut seg = 0;
        let mut walked = 0.0;
        for k in 0..n {
            let target = total * k as f64 / div;
            while seg + 1 < lengths.len() && walked + lengths[seg] < target {
                walked += lengths[seg];
                seg += 1;
            }
            let (a, b) = self.segment(seg);
            let t = if lengths[seg] > 0.0 {
                ((target - walked) / lengths[seg]).clamp(0.0, 1.0)
            } else {
                0.0
            };
            points.push(a + (b - a) * t);
        }
        Coords::new(points)
    }

    /// The same polyline traversed backwards.
    pub fn reverse(&self) -> PolyLine {
        let mut points = self.points.clone();
        points.reverse();
        PolyLine {
            points,
            closed: self.closed,
        }
    }
}

impl ParametricCurve for PolyLine {
    fn domain(&self) -> ParamDomain {
        ParamDomain {
            start: 0.0,
            end: self.nsegments() as f64,
            periodic: self.closed,
        }
    }

    fn point_at(&self, u: f64) -> Result<Point3<f64>> {
        let (i, t) = self.locate(u)?;
        let (a, b) = self.segment(i);
        Ok(a + (b - a) * t)
    }

    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>> {
        let (i, _) = self.locate(u)?;
        let (a, b) = self.segment(i);
        Ok(b - a)
    }

    fn breaks(&self) -> Vec<f64> {
        (0..=self.nsegments()).map(|i| i as f64).collect()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A straight segment from `start` to `end` over `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LineParts"))]
pub struct Line {
    start: Point3<f64>,
    end: Point3<f64>,
}

impl Line {
    /// Fails on coincident end points.
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Result<Self> {
        check_finite("line", &[start, end])?;
        if (end - start).norm() <= DEGENERATE_EPS {
            return Err(Error::geometry("line", "end points coincide"));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Point3<f64> {
        self.start
    }

    pub fn end(&self) -> Point3<f64> {
        self.end
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn reverse(&self) -> Line {
        Line {
            start: self.end,
            end: self.start,
        }
    }
}

impl ParametricCurve for Line {
    fn domain(&self) -> ParamDomain {
        ParamDomain::unit()
    }

    fn point_at(&self, u: f64) -> Result<Point3<f64>> {
        let t = self.domain().clamp_param(u)?;
        Ok(self.start + (self.end - self.start) * t)
    }

    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>> {
        self.domain().clamp_param(u)?;
        Ok(self.end - self.start)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PolyLineParts {
    points: Vec<Point3<f64>>,
    closed: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<PolyLineParts> for PolyLine {
    type Error = Error;

    fn try_from(parts: PolyLineParts) -> Result<Self> {
        PolyLine::new(parts.points, parts.closed)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LineParts {
    start: Point3<f64>,
    end: Point3<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<LineParts> for Line {
    type Error = Error;

    fn try_from(parts: LineParts) -> Result<Self> {
        Line::new(parts.start, parts.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_shape() -> PolyLine {
        PolyLine::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(3.0, 0.0, 0.0),
                Point3::new(3.0, 1.0, 0.0),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn evaluates_per_segment() {
        let pl = l_shape();
        assert_eq!(pl.domain().end, 2.0);
        assert_relative_eq!(pl.point_at(0.5).unwrap(), Point3::new(1.5, 0.0, 0.0));
        assert_relative_eq!(pl.point_at(1.5).unwrap(), Point3::new(3.0, 0.5, 0.0));
        assert_relative_eq!(pl.point_at(2.0).unwrap(), Point3::new(3.0, 1.0, 0.0));
        // Right-continuous at the vertex.
        assert_relative_eq!(pl.derivative_at(1.0).unwrap(), Vector3::new(0.0, 1.0, 0.0));
        assert!(matches!(pl.point_at(2.5), Err(Error::Domain { .. })));
    }

    #[test]
    fn closed_polyline_wraps() {
        let pl = PolyLine::new(l_shape().vertices().to_vec(), true).unwrap();
        assert_eq!(pl.nsegments(), 3);
        assert_relative_eq!(pl.point_at(2.5).unwrap(), Point3::new(1.5, 0.5, 0.0));
        assert_relative_eq!(pl.point_at(3.0).unwrap(), Point3::new(0.0, 0.0, 0.0));
        let (a, b) = pl.endpoints().unwrap();
        assert_relative_eq!(a, b);
        assert_relative_eq!(pl.length(), 4.0 + 10f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn samples_by_arc_length() {
        let pts = l_shape().sample_by_length(5).unwrap();
        assert_relative_eq!(pts[1], Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(pts[3], Point3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(pts[4], Point3::new(3.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn reverse_swaps_ends() {
        let (a, b) = l_shape().reverse().endpoints().unwrap();
        assert_relative_eq!(a, Point3::new(3.0, 1.0, 0.0));
        assert_relative_eq!(b, Point3::origin());
    }

    #[test]
    fn degenerate_inputs_fail() {
        assert!(PolyLine::new(vec![Point3::origin()], false).is_err());
        assert!(PolyLine::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)], true).is_err());
        assert!(Line::new(Point3::origin(), Point3::origin()).is_err());
        assert!(Line::new(Point3::origin(), Point3::new(f64::NAN, 0.0, 0.0)).is_err());
    }

    #[test]
    fn line_ends_are_read_through_accessors() {
        let line = Line::new(Point3::origin(), Point3::new(0.0, 2.0, 0.0)).unwrap();
        assert_eq!(line.start(), Point3::origin());
        assert_eq!(line.end(), Point3::new(0.0, 2.0, 0.0));
        let back = line.reverse();
        assert_eq!(back.start(), line.end());
        assert_eq!(back.end(), line.start());
    }

    #[test]
    fn coincidence_uses_the_degenerate_floor() {
        let short = Point3::new(DEGENERATE_EPS / 10.0, 0.0, 0.0);
        assert!(matches!(
            Line::new(Point3::origin(), short),
            Err(Error::Geometry { op: "line", .. })
        ));
        let tiny = Line::new(Point3::origin(), Point3::new(DEGENERATE_EPS * 10.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(tiny.length(), DEGENERATE_EPS * 10.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_line_keeps_distinct_ends() {
        let line = Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let mut value = serde_json::to_value(line).unwrap();
        assert_eq!(serde_json::from_value::<Line>(value.clone()).unwrap(), line);
        value["end"] = value["start"].clone();
        assert!(serde_json::from_value::<Line>(value).is_err());
    }
}
