// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate store: ordered 3D point sets with bulk transformations.
//!
//! A [`Coords`] value is immutable by convention. Every transformation
//! returns a new point set and leaves its input untouched, so point indices
//! stay stable within one pipeline stage.

use nalgebra::{Matrix3, Point2, Point3, SymmetricEigen, Vector3};

use crate::config::DEGENERATE_EPS;
use crate::error::{Error, Result};
use crate::spatial;
use crate::transform::{check_axis, Affine};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths of the box.
    #[inline]
    pub fn sizes(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Length of the box diagonal.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.sizes().norm()
    }
}

/// Second moment of a (weighted) point distribution about its centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertia {
    /// Mass-weighted centroid.
    pub center: Point3<f64>,
    /// Inertia tensor `sum m (|r|^2 I - r r^T)` with `r = x - center`.
    pub tensor: Matrix3<f64>,
    /// Total mass.
    pub mass: f64,
}

/// Principal moments and axes of an [`Inertia`] tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalAxes {
    /// Principal moments, ascending.
    pub moments: Vector3<f64>,
    /// Unit principal directions, one per column, matching `moments`.
    pub axes: Matrix3<f64>,
}

impl Inertia {
    /// Principal moments and directions, sorted by ascending moment.
    pub fn principal(&self) -> PrincipalAxes {
        let eigen = SymmetricEigen::new(self.tensor);
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        let mut moments = Vector3::zeros();
        let mut axes = Matrix3::zeros();
        for (k, &i) in order.iter().enumerate() {
            moments[k] = eigen.eigenvalues[i];
            axes.set_column(k, &eigen.eigenvectors.column(i));
        }
        PrincipalAxes { moments, axes }
    }
}

/// An ordered sequence of points in 3-space.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "CoordsParts"))]
pub struct Coords {
    points: Vec<Point3<f64>>,
}

impl Coords {
    /// Creates a point set, rejecting non-finite coordinates.
    pub fn new(points: Vec<Point3<f64>>) -> Result<Self> {
        check_finite("coords", &points)?;
        Ok(Self { points })
    }

    /// Creates a point set from a flat `[x0, y0, z0, x1, ...]` slice.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        if values.len() % 3 != 0 {
            return Err(Error::geometry(
                "coords",
                format!("flat coordinate array length {} is not a multiple of 3", values.len()),
            ));
        }
        Self::new(
            values
                .chunks_exact(3)
                .map(|c| Point3::new(c[0], c[1], c[2]))
                .collect(),
        )
    }

    /// Creates a point set from 2D points, placing them in the plane z = 0.
    pub fn from_2d(points: &[Point2<f64>]) -> Result<Self> {
        Self::new(points.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&Point3<f64>> {
        self.points.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }

    /// Flat `[x0, y0, z0, x1, ...]` copy of the coordinates.
    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Applies `f` to every point; results must be finite.
    pub fn map<F>(&self, f: F) -> Result<Coords>
    where
        F: Fn(&Point3<f64>) -> Point3<f64>,
    {
        let points: Vec<_> = self.points.iter().map(f).collect();
        check_finite("map", &points)?;
        Ok(Coords { points })
    }

    /// Applies a validated affine map. Fails when a mapped point
    /// overflows to a non-finite value.
    pub fn affine(&self, map: &Affine) -> Result<Coords> {
        let points: Vec<_> = self.points.iter().map(|p| map.apply(p)).collect();
        check_finite("affine", &points)?;
        Ok(Coords { points })
    }

    /// Translates all points over `v`.
    pub fn translate(&self, v: Vector3<f64>) -> Result<Coords> {
        self.affine(&Affine::translation(v)?)
    }

    /// Translates all points over `step` along a global axis.
    pub fn translate_axis(&self, axis: usize, step: f64) -> Result<Coords> {
        check_axis("translate", axis)?;
        let mut v = Vector3::zeros();
        v[axis] = step;
        self.translate(v)
    }

    /// Scales about the origin with per-axis factors.
    pub fn scale(&self, factors: Vector3<f64>) -> Result<Coords> {
        self.affine(&Affine::scaling(factors)?)
    }

    /// Scales about the origin with one factor for all axes.
    pub fn scale_uniform(&self, factor: f64) -> Result<Coords> {
        self.scale(Vector3::repeat(factor))
    }

    /// Scales about `center` with per-axis factors.
    pub fn scale_about(&self, center: Point3<f64>, factors: Vector3<f64>) -> Result<Coords> {
        let map = Affine::translation(-center.coords)?
            .then(&Affine::scaling(factors)?)
            .then(&Affine::translation(center.coords)?);
        self.affine(&map)
    }

    /// Rotates over `angle` degrees about `axis` through `around`.
    pub fn rotate(&self, angle: f64, axis: Vector3<f64>, around: Point3<f64>) -> Result<Coords> {
        self.affine(&Affine::rotation(angle, axis, around)?)
    }

    /// Mirrors the points in the plane `x[axis] = pos`.
    pub fn reflect(&self, axis: usize, pos: f64) -> Result<Coords> {
        self.affine(&Affine::reflection(axis, pos)?)
    }

    /// Interprets coordinates as cylindrical `(r, theta, z)` and maps them
    /// to cartesian. `dir` gives the axes holding r, theta (degrees) and z;
    /// `scale` multiplies them before the conversion.
    pub fn cylindrical(&self, dir: [usize; 3], scale: [f64; 3]) -> Result<Coords> {
        check_permutation("cylindrical", dir)?;
        self.map(|p| {
            let r = p[dir[0]] * scale[0];
            let theta = (p[dir[1]] * scale[1]).to_radians();
            let z = p[dir[2]] * scale[2];
            Point3::new(r * theta.cos(), r * theta.sin(), z)
        })
    }

    /// Converts cartesian coordinates to cylindrical `(r, theta, z)`,
    /// storing them in the axes given by `dir`. Theta is in degrees.
    pub fn to_cylindrical(&self, dir: [usize; 3]) -> Result<Coords> {
        check_permutation("to_cylindrical", dir)?;
        self.map(|p| {
            let mut out = Point3::origin();
            out[dir[0]] = p.x.hypot(p.y);
            out[dir[1]] = p.y.atan2(p.x).to_degrees();
            out[dir[2]] = p.z;
            out
        })
    }

    /// Interprets coordinates as spherical `(longitude, latitude, radius)`
    /// (angles in degrees) and maps them to cartesian.
    pub fn spherical(&self, dir: [usize; 3], scale: [f64; 3]) -> Result<Coords> {
        check_permutation("spherical", dir)?;
        self.map(|p| {
            let theta = (p[dir[0]] * scale[0]).to_radians();
            let phi = (p[dir[1]] * scale[1]).to_radians();
            let r = p[dir[2]] * scale[2];
            Point3::new(
                r * phi.cos() * theta.cos(),
                r * phi.cos() * theta.sin(),
                r * phi.sin(),
            )
        })
    }

    /// Converts cartesian coordinates to spherical `(longitude, latitude, radius)`.
    pub fn to_spherical(&self, dir: [usize; 3]) -> Result<Coords> {
        check_permutation("to_spherical", dir)?;
        self.map(|p| {
            let r = p.coords.norm();
            let theta = p.y.atan2(p.x).to_degrees();
            let phi = if r > 0.0 {
                (p.z / r).clamp(-1.0, 1.0).asin().to_degrees()
            } else {
                0.0
            };
            let mut out = Point3::origin();
            out[dir[0]] = theta;
            out[dir[1]] = phi;
            out[dir[2]] = r;
            out
        })
    }

    /// Axis-aligned bounding box.
    pub fn bbox(&self) -> Result<BoundingBox> {
        let first = self
            .points
            .first()
            .ok_or_else(|| Error::geometry("bbox", "empty point set"))?;
        let (min, max) = self
            .points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        Ok(BoundingBox { min, max })
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Result<Point3<f64>> {
        Ok(self.bbox()?.center())
    }

    /// Bounding box edge lengths.
    pub fn sizes(&self) -> Result<Vector3<f64>> {
        Ok(self.bbox()?.sizes())
    }

    /// Length of the bounding box diagonal; zero for an empty set.
    pub fn dsize(&self) -> f64 {
        self.bbox().map(|b| b.diagonal()).unwrap_or(0.0)
    }

    /// Mean of all points.
    pub fn average(&self) -> Result<Point3<f64>> {
        if self.points.is_empty() {
            return Err(Error::geometry("average", "empty point set"));
        }
        let sum = self
            .points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Ok(Point3::from(sum / self.points.len() as f64))
    }

    /// Alias of [`Coords::average`].
    pub fn centroid(&self) -> Result<Point3<f64>> {
        self.average()
    }

    /// The point set translated so that its centroid is at the origin.
    pub fn centered(&self) -> Result<Coords> {
        let c = self.average()?;
        self.translate(-c.coords)
    }

    /// Inertia tensor of the points, optionally weighted by `masses`.
    pub fn inertia(&self, masses: Option<&[f64]>) -> Result<Inertia> {
        if self.points.is_empty() {
            return Err(Error::geometry("inertia", "empty point set"));
        }
        let weights: Vec<f64> = match masses {
            Some(m) => {
                if m.len() != self.points.len() {
                    return Err(Error::geometry(
                        "inertia",
                        format!("{} masses for {} points", m.len(), self.points.len()),
                    ));
                }
                if m.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(Error::geometry("inertia", "masses must be finite and non-negative"));
                }
                m.to_vec()
            }
            None => vec![1.0; self.points.len()],
        };
        let mass: f64 = weights.iter().sum();
        if mass <= DEGENERATE_EPS {
            return Err(Error::geometry("inertia", "total mass is zero"));
        }
        let center = Point3::from(
            self.points
                .iter()
                .zip(&weights)
                .fold(Vector3::zeros(), |acc, (p, w)| acc + p.coords * *w)
                / mass,
        );
        let mut tensor = Matrix3::zeros();
        for (p, w) in self.points.iter().zip(&weights) {
            let r = p - center;
            tensor += (Matrix3::identity() * r.norm_squared() - r * r.transpose()) * *w;
        }
        Ok(Inertia {
            center,
            tensor,
            mass,
        })
    }

    /// Signed distances of all points from the plane through `p` with normal `n`.
    pub fn distance_from_plane(&self, p: Point3<f64>, n: Vector3<f64>) -> Result<Vec<f64>> {
        let norm = n.norm();
        if norm <= DEGENERATE_EPS {
            return Err(Error::geometry("distance_from_plane", "plane normal has zero length"));
        }
        let n = n / norm;
        Ok(self.points.iter().map(|x| (x - p).dot(&n)).collect())
    }

    /// Distances of all points from `p`.
    pub fn distance_from_point(&self, p: Point3<f64>) -> Vec<f64> {
        self.points.iter().map(|x| (x - p).norm()).collect()
    }

    /// Points at the given indices, in the given order.
    pub fn select(&self, indices: &[usize]) -> Result<Coords> {
        let points = indices
            .iter()
            .map(|&i| {
                self.points.get(i).copied().ok_or_else(|| {
                    Error::geometry("select", format!("index {} out of range ({} points)", i, self.len()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Coords { points })
    }

    /// Concatenates point sets in order.
    pub fn concatenate(parts: &[Coords]) -> Coords {
        let total = parts.iter().map(Coords::len).sum();
        let mut points = Vec::with_capacity(total);
        for part in parts {
            points.extend_from_slice(&part.points);
        }
        Coords { points }
    }

    /// `n` copies of the point set, copy `k` translated over `k * step`.
    pub fn replicate(&self, n: usize, step: Vector3<f64>) -> Result<Coords> {
        if step.iter().any(|v| !v.is_finite()) {
            return Err(Error::geometry("replicate", "step is not finite"));
        }
        let mut points = Vec::with_capacity(n * self.len());
        for k in 0..n {
            let shift = step * k as f64;
            points.extend(self.points.iter().map(|p| p + shift));
        }
        Ok(Coords { points })
    }

    /// Linear interpolations `self + t (other - self)` for every `t` in
    /// `div`, concatenated in `div` order.
    pub fn interpolate(&self, other: &Coords, div: &[f64]) -> Result<Coords> {
        if self.len() != other.len() {
            return Err(Error::geometry(
                "interpolate",
                format!("point counts differ: {} vs {}", self.len(), other.len()),
            ));
        }
        if div.iter().any(|t| !t.is_finite()) {
            return Err(Error::geometry("interpolate", "non-finite interpolation value"));
        }
        let mut points = Vec::with_capacity(div.len() * self.len());
        for &t in div {
            points.extend(
                self.points
                    .iter()
                    .zip(&other.points)
                    .map(|(a, b)| a + (b - a) * t),
            );
        }
        Ok(Coords { points })
    }

    /// Fuses points closer than `tolerance`.
    ///
    /// Returns the unique points and, for every input point, the index of
    /// its representative. See [`spatial::fuse_points`] for the tie-break.
    pub fn fuse(&self, tolerance: f64) -> Result<(Coords, Vec<usize>)> {
        let (points, index) = spatial::fuse_points(&self.points, tolerance)?;
        Ok((Coords { points }, index))
    }
}

impl From<Coords> for Vec<Point3<f64>> {
    fn from(c: Coords) -> Self {
        c.points
    }
}

impl std::ops::Index<usize> for Coords {
    type Output = Point3<f64>;

    fn index(&self, i: usize) -> &Point3<f64> {
        &self.points[i]
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CoordsParts {
    points: Vec<Point3<f64>>,
}

#[cfg(feature = "serde")]
impl TryFrom<CoordsParts> for Coords {
    type Error = Error;

    fn try_from(parts: CoordsParts) -> Result<Self> {
        Coords::new(parts.points)
    }
}

fn check_finite(op: &'static str, points: &[Point3<f64>]) -> Result<()> {
    if let Some(i) = points.iter().position(|p| p.iter().any(|v| !v.is_finite())) {
        return Err(Error::geometry(op, format!("point {} has non-finite coordinates", i)));
    }
    Ok(())
}

fn check_permutation(op: &'static str, dir: [usize; 3]) -> Result<()> {
    let mut seen = [false; 3];
    for &d in &dir {
        if d > 2 || seen[d] {
            return Err(Error::geometry(op, format!("{:?} is not a permutation of the axes", dir)));
        }
        seen[d] = true;
    }
    Ok(())
}
