// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! NURBS curves.
//!
//! A NURBS curve of degree `p` with `n` control points `P_i`, weights `w_i`
//! and knot vector `U` (`n + p + 1` values) is
//!
//! ```text
//! C(u) = sum(N_i,p(u) * w_i * P_i) / sum(N_i,p(u) * w_i)
//! ```
//!
//! with the B-spline basis `N_i,p` from the Cox-de Boor recursion. The
//! domain is `[U[p], U[n]]`. Evaluation works on homogeneous points
//! `(w x, w y, w z, w)`; derivatives apply the quotient rule on top.

use formex_core::{Error, Result, DEGENERATE_EPS};
use nalgebra::{Point3, Vector3, Vector4};
use smallvec::SmallVec;

use crate::curve::ParametricCurve;
use crate::domain::ParamDomain;
use crate::knots::{KnotVector, KNOT_EPS};

/// Basis function values for one knot span.
type Basis = SmallVec<[f64; 8]>;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "NurbsParts"))]
pub struct NurbsCurve {
    control: Vec<Point3<f64>>,
    weights: Vec<f64>,
    knots: KnotVector,
    degree: usize,
    closed: bool,
}

impl NurbsCurve {
    /// Validates `knots.len() == control.len() + degree + 1`, strictly
    /// positive finite weights and a non-empty domain.
    pub fn new(
        control: Vec<Point3<f64>>,
        weights: Vec<f64>,
        knots: KnotVector,
        degree: usize,
    ) -> Result<Self> {
        let n = control.len();
        if degree == 0 {
            return Err(Error::geometry("nurbs", "degree must be at least 1"));
        }
        if n < degree + 1 {
            return Err(Error::geometry(
                "nurbs",
                format!("degree {} needs at least {} control points, got {}", degree, degree + 1, n),
            ));
        }
        if !control.iter().all(|p| p.iter().all(|v| v.is_finite())) {
            return Err(Error::geometry("nurbs", "control points must be finite"));
        }
        if weights.len() != n {
            return Err(Error::geometry(
                "nurbs",
                format!("{} weights for {} control points", weights.len(), n),
            ));
        }
        if !weights.iter().all(|w| w.is_finite() && *w > 0.0) {
            return Err(Error::geometry("nurbs", "weights must be positive"));
        }
        if knots.len() != n + degree + 1 {
            return Err(Error::geometry(
                "nurbs",
                format!(
                    "{} control points of degree {} need {} knots, got {}",
                    n,
                    degree,
                    n + degree + 1,
                    knots.len()
                ),
            ));
        }
        if knots[n] - knots[degree] <= KNOT_EPS {
            return Err(Error::geometry("nurbs", "knot vector has an empty domain"));
        }
        Ok(Self {
            control,
            weights,
            knots,
            degree,
            closed: false,
        })
    }

    /// A curve through its first and last control point, with a generated
    /// blended knot vector. `None` weights are all 1.
    pub fn clamped(
        control: Vec<Point3<f64>>,
        weights: Option<Vec<f64>>,
        degree: usize,
    ) -> Result<Self> {
        let n = control.len();
        let knots = KnotVector::generate(n, degree, true, false)?;
        Self::new(control, weights.unwrap_or_else(|| vec![1.0; n]), knots, degree)
    }

    /// A closed curve: the first `degree` control points are repeated at
    /// the end and the knots are uniform, giving a periodic domain.
    pub fn closed(
        control: Vec<Point3<f64>>,
        weights: Option<Vec<f64>>,
        degree: usize,
    ) -> Result<Self> {
        let n = control.len();
        if degree == 0 || n < degree + 1 {
            return Err(Error::geometry(
                "nurbs",
                format!("closed curve of degree {} needs more than {} control points", degree, n),
            ));
        }
        let weights = weights.unwrap_or_else(|| vec![1.0; n]);
        if weights.len() != n {
            return Err(Error::geometry(
                "nurbs",
                format!("{} weights for {} control points", weights.len(), n),
            ));
        }
        let mut control = control;
        let mut weights = weights;
        for i in 0..degree {
            control.push(control[i]);
            weights.push(weights[i]);
        }
        let knots = KnotVector::generate(control.len(), degree, true, true)?;
        let mut curve = Self::new(control, weights, knots, degree)?;
        curve.closed = true;
        Ok(curve)
    }

    /// A circle or circular arc as an exact rational quadratic curve.
    ///
    /// `x_axis` and `y_axis` span the plane; angles are in degrees from
    /// `x_axis` towards `y_axis`. An end angle below the start is taken one
    /// turn further. The arc is split in at most 90 degree pieces.
    pub fn circle_arc(
        center: Point3<f64>,
        radius: f64,
        x_axis: Vector3<f64>,
        y_axis: Vector3<f64>,
        start_deg: f64,
        end_deg: f64,
    ) -> Result<Self> {
        if !(radius.is_finite() && radius > DEGENERATE_EPS) {
            return Err(Error::geometry("circle_arc", "radius must be positive"));
        }
        if x_axis.norm() <= DEGENERATE_EPS || y_axis.norm() <= DEGENERATE_EPS {
            return Err(Error::geometry("circle_arc", "plane axes have zero length"));
        }
        if !(start_deg.is_finite() && end_deg.is_finite()) {
            return Err(Error::geometry("circle_arc", "angles must be finite"));
        }
        let end_deg = if end_deg < start_deg { end_deg + 360.0 } else { end_deg };
        let theta = end_deg - start_deg;
        if theta <= DEGENERATE_EPS || theta > 360.0 + DEGENERATE_EPS {
            return Err(Error::geometry(
                "circle_arc",
                format!("sweep must lie in (0, 360], got {}", theta),
            ));
        }
        let (x, y) = (x_axis.normalize(), y_axis.normalize());
        let narcs = ((theta / 90.0).ceil() as usize).max(1);
        let dtheta = (theta / narcs as f64).to_radians();
        let w1 = (dtheta / 2.0).cos();
        let at = |angle: f64, r: f64| {
            let (s, c) = angle.sin_cos();
            center + (x * c + y * s) * r
        };

        let start = start_deg.to_radians();
        let mut control = Vec::with_capacity(2 * narcs + 1);
        let mut weights = Vec::with_capacity(2 * narcs + 1);
        control.push(at(start, radius));
        weights.push(1.0);
        for i in 0..narcs {
            let a = start + i as f64 * dtheta;
            // Tangents at both ends of the piece meet on the bisector.
            control.push(at(a + dtheta / 2.0, radius / w1));
            weights.push(w1);
            control.push(at(a + dtheta, radius));
            weights.push(1.0);
        }

        let mut unique = vec![(0.0, 3)];
        unique.extend((1..narcs).map(|i| (i as f64 / narcs as f64, 2)));
        unique.push((1.0, 3));
        Self::new(control, weights, KnotVector::from_unique(&unique)?, 2)
    }

    pub fn control_points(&self) -> &[Point3<f64>] {
        &self.control
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn order(&self) -> usize {
        self.degree + 1
    }

    pub fn nctrl(&self) -> usize {
        self.control.len()
    }

    pub fn is_clamped(&self) -> bool {
        self.knots.is_clamped(self.degree)
    }

    pub fn is_uniform(&self) -> bool {
        self.knots.is_uniform()
    }

    /// Whether the weights differ; constant weights give a polynomial curve.
    pub fn is_rational(&self) -> bool {
        let w0 = self.weights[0];
        self.weights.iter().any(|w| (w - w0).abs() > 1e-12 * w0)
    }

    /// The same curve traversed backwards.
    pub fn reverse(&self) -> NurbsCurve {
        NurbsCurve {
            control: self.control.iter().rev().copied().collect(),
            weights: self.weights.iter().rev().copied().collect(),
            knots: self.knots.reverse(),
            degree: self.degree,
            closed: self.closed,
        }
    }

    fn homogeneous(&self, i: usize) -> Vector4<f64> {
        let (p, w) = (&self.control[i], self.weights[i]);
        Vector4::new(p.x * w, p.y * w, p.z * w, w)
    }

    /// Index `i` of the knot span `[U[i], U[i+1])` holding `u`. The end of
    /// the domain belongs to the last non-empty span.
    fn find_span(&self, u: f64) -> usize {
        let (p, n, k) = (self.degree, self.nctrl(), &self.knots);
        if u >= k[n] {
            let mut i = n - 1;
            while i > p && k[i] >= k[i + 1] {
                i -= 1;
            }
            return i;
        }
        if u <= k[p] {
            let mut i = p;
            while i + 1 < n && k[i + 1] <= u {
                i += 1;
            }
            return i;
        }
        self.knots.span(u).map_or(p, |i| i.clamp(p, n - 1))
    }

    /// The `p + 1` non-zero basis functions `N_{span-p..=span}` at `u`.
    fn basis_funs(&self, span: usize, u: f64) -> Basis {
        let p = self.degree;
        let k = &self.knots;
        let mut n: Basis = SmallVec::from_elem(0.0, p + 1);
        let mut left: Basis = SmallVec::from_elem(0.0, p + 1);
        let mut right: Basis = SmallVec::from_elem(0.0, p + 1);
        n[0] = 1.0;
        for j in 1..=p {
            left[j] = u - k[span + 1 - j];
            right[j] = k[span + j] - u;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = n[r] / (right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }
        n
    }

    /// Basis functions and their derivatives up to order `nd` at `u`:
    /// `ders[k][j]` is the `k`-th derivative of `N_{span-p+j}`.
    fn ders_basis_funs(&self, span: usize, u: f64, nd: usize) -> Vec<Basis> {
        let p = self.degree;
        let k = &self.knots;
        let mut ndu = vec![SmallVec::<[f64; 8]>::from_elem(0.0, p + 1); p + 1];
        let mut left: Basis = SmallVec::from_elem(0.0, p + 1);
        let mut right: Basis = SmallVec::from_elem(0.0, p + 1);
        ndu[0][0] = 1.0;
        for j in 1..=p {
            left[j] = u - k[span + 1 - j];
            right[j] = k[span + j] - u;
            let mut saved = 0.0;
            for r in 0..j {
                // Lower triangle holds knot differences.
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut ders = vec![Basis::from_elem(0.0, p + 1); nd + 1];
        for j in 0..=p {
            ders[0][j] = ndu[j][p];
        }
        let top = nd.min(p);
        let mut a = [Basis::from_elem(0.0, p + 1), Basis::from_elem(0.0, p + 1)];
        for r in 0..=p {
            let (mut s1, mut s2) = (0, 1);
            a[0][0] = 1.0;
            for kk in 1..=top {
                let mut d = 0.0;
                let rk = r as isize - kk as isize;
                let pk = p - kk;
                if r >= kk {
                    let rk = rk as usize;
                    a[s2][0] = a[s1][0] / ndu[pk + 1][rk];
                    d = a[s2][0] * ndu[rk][pk];
                }
                let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
                let j2 = if r as isize - 1 <= pk as isize { kk - 1 } else { p - r };
                for j in j1..=j2 {
                    let idx = (rk + j as isize) as usize;
                    a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][idx];
                    d += a[s2][j] * ndu[idx][pk];
                }
                if r <= pk {
                    a[s2][kk] = -a[s1][kk - 1] / ndu[pk + 1][r];
                    d += a[s2][kk] * ndu[r][pk];
                }
                ders[kk][r] = d;
                std::mem::swap(&mut s1, &mut s2);
            }
        }
        let mut factor = p as f64;
        for kk in 1..=top {
            for j in 0..=p {
                ders[kk][j] *= factor;
            }
            factor *= (p - kk) as f64;
        }
        ders
    }

    /// The span index and the `degree + 1` non-zero basis function values
    /// at `u`. The values are non-negative and sum to 1.
    pub fn basis(&self, u: f64) -> Result<(usize, Vec<f64>)> {
        let u = self.domain().clamp_param(u)?;
        let span = self.find_span(u);
        Ok((span, self.basis_funs(span, u).to_vec()))
    }

    /// The point and its derivatives up to order `order` at `u`.
    ///
    /// Entry 0 holds the point as a vector from the origin, entry `k` the
    /// `k`-th derivative.
    pub fn derivatives(&self, u: f64, order: usize) -> Result<Vec<Vector3<f64>>> {
        let u = self.domain().clamp_param(u)?;
        let p = self.degree;
        let span = self.find_span(u);
        let ders = self.ders_basis_funs(span, u, order);

        // Derivatives of the homogeneous curve.
        let aw: Vec<Vector4<f64>> = ders
            .iter()
            .map(|row| {
                (0..=p).fold(Vector4::zeros(), |acc, j| acc + self.homogeneous(span - p + j) * row[j])
            })
            .collect();

        let mut ck: Vec<Vector3<f64>> = Vec::with_capacity(order + 1);
        for k in 0..=order {
            let mut v = aw[k].xyz();
            for i in 1..=k {
                v -= ck[k - i] * (binomial(k, i) * aw[i].w);
            }
            ck.push(v / aw[0].w);
        }
        Ok(ck)
    }

    /// Curvature `|C' x C''| / |C'|^3` at `u`.
    pub fn curvature(&self, u: f64) -> Result<f64> {
        let d = self.derivatives(u, 2)?;
        let speed = d[1].norm();
        if speed <= DEGENERATE_EPS {
            return Err(Error::geometry("curvature", "curve has zero speed"));
        }
        Ok(d[1].cross(&d[2]).norm() / speed.powi(3))
    }

    /// Inserts knot `u` `times` times without changing the curve.
    ///
    /// `u` must lie strictly inside the domain and its multiplicity may
    /// not exceed the degree afterwards.
    pub fn insert_knot(&self, u: f64, times: usize) -> Result<NurbsCurve> {
        let dom = self.domain();
        if !(u > dom.start && u < dom.end) {
            return Err(Error::Domain {
                value: u,
                start: dom.start,
                end: dom.end,
            });
        }
        if times == 0 {
            return Ok(self.clone());
        }
        let p = self.degree;
        let s = self.knots.mult(u);
        if s + times > p {
            return Err(Error::geometry(
                "insert_knot",
                format!(
                    "knot {} has multiplicity {}; inserting {} more exceeds degree {}",
                    u, s, times, p
                ),
            ));
        }
        let k = self.find_span(u);
        let n = self.nctrl();
        let uk = &self.knots;

        let mut qw = vec![Vector4::zeros(); n + times];
        for i in 0..=k - p {
            qw[i] = self.homogeneous(i);
        }
        for i in k - s..n {
            qw[i + times] = self.homogeneous(i);
        }
        let mut rw: Vec<Vector4<f64>> = (0..=p - s).map(|i| self.homogeneous(k - p + i)).collect();
        for j in 1..=times {
            let l = k - p + j;
            for i in 0..=p - j - s {
                let alpha = (u - uk[l + i]) / (uk[i + k + 1] - uk[l + i]);
                rw[i] = rw[i + 1] * alpha + rw[i] * (1.0 - alpha);
            }
            qw[l] = rw[0];
            qw[k + times - j - s] = rw[p - j - s];
        }
        let l = k - p + times;
        for i in l + 1..k - s {
            qw[i] = rw[i - l];
        }

        let control = qw.iter().map(|h| Point3::from(h.xyz() / h.w)).collect();
        let weights = qw.iter().map(|h| h.w).collect();
        tracing::debug!(knot = u, times, multiplicity = s + times, "inserted knot");
        Ok(NurbsCurve {
            control,
            weights,
            knots: self.knots.with_inserted(u, times),
            degree: p,
            closed: self.closed,
        })
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

impl ParametricCurve for NurbsCurve {
    fn domain(&self) -> ParamDomain {
        ParamDomain {
            start: self.knots[self.degree],
            end: self.knots[self.nctrl()],
            periodic: self.closed,
        }
    }

    fn point_at(&self, u: f64) -> Result<Point3<f64>> {
        let u = self.domain().clamp_param(u)?;
        let p = self.degree;
        let span = self.find_span(u);
        let basis = self.basis_funs(span, u);
        let cw = (0..=p).fold(Vector4::zeros(), |acc, j| {
            acc + self.homogeneous(span - p + j) * basis[j]
        });
        Ok(Point3::from(cw.xyz() / cw.w))
    }

    fn derivative_at(&self, u: f64) -> Result<Vector3<f64>> {
        Ok(self.derivatives(u, 1)?[1])
    }

    /// The distinct knots inside the domain.
    fn breaks(&self) -> Vec<f64> {
        let d = self.domain();
        let mut out = vec![d.start];
        out.extend(
            self.knots
                .unique()
                .into_iter()
                .map(|(v, _)| v)
                .filter(|&v| v > d.start + KNOT_EPS && v < d.end - KNOT_EPS),
        );
        out.push(d.end);
        out
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct NurbsParts {
    control: Vec<Point3<f64>>,
    weights: Vec<f64>,
    knots: KnotVector,
    degree: usize,
    closed: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<NurbsParts> for NurbsCurve {
    type Error = Error;

    fn try_from(parts: NurbsParts) -> Result<Self> {
        let mut curve = NurbsCurve::new(parts.control, parts.weights, parts.knots, parts.degree)?;
        if parts.closed {
            let (n, p) = (curve.nctrl(), curve.degree);
            let wrapped = (0..p).all(|i| {
                curve.control[i] == curve.control[n - p + i]
                    && curve.weights[i] == curve.weights[n - p + i]
            });
            if !wrapped {
                return Err(Error::geometry(
                    "nurbs",
                    "closed curve does not repeat its first control points",
                ));
            }
            curve.closed = true;
        }
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic() -> NurbsCurve {
        NurbsCurve::clamped(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(3.0, 2.0, 1.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(6.0, 1.0, 2.0),
            ],
            Some(vec![1.0, 2.0, 0.5, 1.0, 1.0]),
            3,
        )
        .unwrap()
    }

    #[test]
    fn basis_is_a_partition_of_unity() {
        let c = cubic();
        for u in [0.0, 0.2, 0.5, 0.77, 1.0] {
            let (_, basis) = c.basis(u).unwrap();
            assert_eq!(basis.len(), 4);
            assert!(basis.iter().all(|&b| b >= -1e-15));
            assert_relative_eq!(basis.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn clamped_curve_interpolates_end_points() {
        let c = cubic();
        let (a, b) = c.endpoints().unwrap();
        assert_relative_eq!(a, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(b, Point3::new(6.0, 1.0, 2.0), epsilon = 1e-12);
        assert!(c.is_clamped());
        assert!(c.is_rational());
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let c = cubic();
        let h = 1e-6;
        for u in [0.1, 0.45, 0.8] {
            let d = c.derivative_at(u).unwrap();
            let fd = (c.point_at(u + h).unwrap() - c.point_at(u - h).unwrap()) / (2.0 * h);
            assert_relative_eq!(d, fd, epsilon = 1e-5);
        }
        let d2 = c.derivatives(0.3, 2).unwrap();
        let fd2 = (c.derivatives(0.3 + h, 1).unwrap()[1] - c.derivatives(0.3 - h, 1).unwrap()[1]) / (2.0 * h);
        assert_relative_eq!(d2[2], fd2, epsilon = 1e-4);
    }

    #[test]
    fn circle_has_constant_curvature() {
        let circle = NurbsCurve::circle_arc(
            Point3::new(1.0, 1.0, 0.0),
            2.0,
            Vector3::x(),
            Vector3::y(),
            0.0,
            360.0,
        )
        .unwrap();
        assert_eq!(circle.nctrl(), 9);
        assert_eq!(circle.knots().len(), 12);
        for u in [0.0, 0.1, 0.3, 0.55, 0.9] {
            let p = circle.point_at(u).unwrap();
            assert_relative_eq!((p - Point3::new(1.0, 1.0, 0.0)).norm(), 2.0, epsilon = 1e-12);
            assert_relative_eq!(circle.curvature(u).unwrap(), 0.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn knot_insertion_keeps_the_shape() {
        let c = cubic();
        let refined = c.insert_knot(0.3, 2).unwrap();
        assert_eq!(refined.nctrl(), c.nctrl() + 2);
        assert_eq!(refined.knots().mult(0.3), 2);
        for u in [0.0, 0.15, 0.3, 0.62, 1.0] {
            assert_relative_eq!(refined.point_at(u).unwrap(), c.point_at(u).unwrap(), epsilon = 1e-12);
        }
        assert!(c.insert_knot(0.3, 4).is_err());
        assert!(matches!(c.insert_knot(1.0, 1), Err(Error::Domain { .. })));
    }

    #[test]
    fn reverse_runs_backwards() {
        let c = cubic();
        let r = c.reverse();
        for u in [0.0, 0.25, 0.6] {
            assert_relative_eq!(r.point_at(1.0 - u).unwrap(), c.point_at(u).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn closed_curve_is_periodic() {
        let square = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let c = NurbsCurve::closed(square, None, 2).unwrap();
        assert!(c.is_closed());
        let d = c.domain();
        let (a, b) = (c.point_at(d.start).unwrap(), c.point_at(d.end - 1e-12).unwrap());
        assert_relative_eq!(a, b, epsilon = 1e-9);
        assert!(!c.is_rational());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_revalidates() {
        let square = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let c = NurbsCurve::closed(square, None, 2).unwrap();
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(serde_json::from_value::<NurbsCurve>(value.clone()).unwrap(), c);

        let mut negative = value.clone();
        negative["weights"][1] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<NurbsCurve>(negative).is_err());

        let mut unwrapped = value.clone();
        unwrapped["weights"][0] = serde_json::json!(2.0);
        assert!(serde_json::from_value::<NurbsCurve>(unwrapped).is_err());

        let mut decreasing = value;
        decreasing["knots"]["values"][0] = serde_json::json!(5.0);
        assert!(serde_json::from_value::<NurbsCurve>(decreasing).is_err());
    }

    #[test]
    fn invalid_definitions_fail() {
        let pts = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 0.0)];
        let knots = KnotVector::new(vec![0., 0., 0., 1., 1., 1.]).unwrap();
        assert!(NurbsCurve::new(pts.clone(), vec![1.0, 0.0, 1.0], knots.clone(), 2).is_err());
        assert!(NurbsCurve::new(pts.clone(), vec![1.0; 3], knots.clone(), 3).is_err());
        assert!(NurbsCurve::new(pts, vec![1.0; 3], knots, 2).is_ok());
    }
}
