// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curves joined end to start.

use formex_core::{Error, Result};
use nalgebra::{Point3, Vector3};

use crate::curve::{Curve, ParametricCurve};
use crate::domain::ParamDomain;

/// An ordered chain of curves, each starting where the previous one ends.
///
/// Every part keeps its own parametrization. The composite domain starts
/// at 0 and lays the part domains end to end: part `i` covers
/// `[offsets[i], offsets[i + 1]]`. At a junction the later part owns the
/// parameter; the last part owns the end of the domain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeCurve {
    parts: Vec<Curve>,
    offsets: Vec<f64>,
}

impl CompositeCurve {
    /// A chain holding only `first`. A composite `first` is flattened.
    pub fn new(first: Curve) -> Self {
        match first {
            Curve::Composite(c) => c,
            curve => {
                let len = curve.domain().length();
                Self {
                    parts: vec![curve],
                    offsets: vec![0.0, len],
                }
            }
        }
    }

    /// Joins `curves` in order, with [`CompositeCurve::append`] semantics.
    pub fn from_parts(curves: Vec<Curve>, tolerance: f64) -> Result<Self> {
        let mut iter = curves.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::geometry("composite", "no curves to join"))?;
        iter.try_fold(Self::new(first), |chain, c| chain.append(c, tolerance))
    }

    /// Adds `curve` at the end of the chain.
    ///
    /// Fails with [`Error::Continuity`] when the chain's end point is more
    /// than `tolerance` away from the start of `curve`. Composite curves
    /// are added part by part.
    pub fn append(mut self, curve: Curve, tolerance: f64) -> Result<Self> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(Error::geometry(
                "append",
                format!("tolerance must be non-negative, got {}", tolerance),
            ));
        }
        let (_, end) = self.endpoints()?;
        let (start, _) = curve.endpoints()?;
        let gap = (start - end).norm();
        if gap > tolerance {
            return Err(Error::Continuity { gap, tolerance });
        }
        let added = match curve {
            Curve::Composite(c) => c.parts,
            curve => vec![curve],
        };
        for part in added {
            let last = self.offsets[self.offsets.len() - 1];
            self.offsets.push(last + part.domain().length());
            self.parts.push(part);
        }
        tracing::trace!(parts = self.parts.len(), gap, "appended curve");
        Ok(self)
    }

    pub fn parts(&self) -> &[Curve] {
        &self.parts
    }

    pub fn nparts(&self) -> usize {
        self.parts.len()
    }

    /// Cumulative start parameter of every part, followed by the end of
    /// the domain.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// The part owning `u` and the parameter in that part's own domain.
    pub fn locate(&self, u: f64) -> Result<(usize, f64)> {
        let u = self.domain().clamp_param(u)?;
        let i = self.offsets[1..self.parts.len()].partition_point(|&o| o <= u);
        let local = self.parts[i].domain().start + (u - self.offsets[i]);
        Ok((i, local.min(self.parts[i].domain().end)))
    }
}

impl ParametricCurve for CompositeCurve {
    fn domain(&self) -> ParamDomain {
        ParamDomain {
            start: 0.0,
            end: self.offsets[self.offsets.len() - 1],
            periodic: false,
        }
    }

    fn point_at(&self, u: f64) -> Result<Point3<f64>> {
        let (i, local) = self.locate(u)?;
        self.parts[i].point_at(local)
    }

    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>> {
        let (i, local) = self.locate(u)?;
        self.parts[i].derivative_at(local)
    }

    /// Part junctions plus the breaks inside every part.
    fn breaks(&self) -> Vec<f64> {
        let mut out = vec![0.0];
        for (part, &offset) in self.parts.iter().zip(&self.offsets) {
            let start = part.domain().start;
            out.extend(part.breaks().into_iter().skip(1).map(|b| offset + (b - start)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::{Arc, ArcDirection};
    use crate::polyline::Line;
    use approx::assert_relative_eq;

    fn line(a: [f64; 3], b: [f64; 3]) -> Curve {
        Line::new(Point3::from(a), Point3::from(b)).unwrap().into()
    }

    #[test]
    fn parameters_run_through_the_parts() {
        let arc = Arc::new(Point3::new(1.0, 1.0, 0.0), 1.0, -90.0, 0.0, ArcDirection::CounterClockwise).unwrap();
        let chain = CompositeCurve::from_parts(
            vec![line([0., 0., 0.], [1., 0., 0.]), arc.into(), line([2., 1., 0.], [2., 3., 0.])],
            1e-9,
        )
        .unwrap();
        assert_eq!(chain.nparts(), 3);
        assert_eq!(chain.offsets(), &[0.0, 1.0, 2.0, 3.0]);
        assert_relative_eq!(chain.point_at(1.5).unwrap(), Point3::new(1.0 + 0.5_f64.sqrt(), 1.0 - 0.5_f64.sqrt(), 0.0), epsilon = 1e-12);
        assert_relative_eq!(chain.point_at(3.0).unwrap(), Point3::new(2.0, 3.0, 0.0), epsilon = 1e-12);
        // The later part owns the junction.
        assert_eq!(chain.locate(2.0).unwrap(), (2, 0.0));
        assert_relative_eq!(chain.derivative_at(2.0).unwrap(), Vector3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
        assert_eq!(chain.breaks(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn gaps_are_rejected() {
        let chain = CompositeCurve::new(line([0., 0., 0.], [1., 0., 0.]));
        let err = chain.append(line([1.5, 0., 0.], [2., 0., 0.]), 1e-6).unwrap_err();
        match err {
            Error::Continuity { gap, tolerance } => {
                assert_relative_eq!(gap, 0.5);
                assert_eq!(tolerance, 1e-6);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn appending_a_chain_flattens_it() {
        let a = CompositeCurve::new(line([0., 0., 0.], [1., 0., 0.]));
        let b = CompositeCurve::from_parts(
            vec![line([1., 0., 0.], [1., 1., 0.]), line([1., 1., 0.], [0., 1., 0.])],
            0.0,
        )
        .unwrap();
        let joined = a.append(b.into(), 0.0).unwrap();
        assert_eq!(joined.nparts(), 3);
        assert!(joined.parts().iter().all(|p| matches!(p, Curve::Line(_))));
    }
}
