// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Formices: element lists with their own point coordinates.
//!
//! A [`Formex`] stores every element as a tuple of raw points, without
//! shared point numbering. It is the natural output of pattern input and
//! replication, and is compacted into a [`Mesh`] by fusing coincident
//! points.

use std::str::FromStr;

use formex_core::{
    Affine, BoundingBox, Connectivity, Coords, ElementType, Error, Result, Tolerances,
};
use nalgebra::{Point3, Vector3};

use crate::mesh::Mesh;
use crate::pattern;

/// A list of elements of equal plexitude, each with its own points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formex {
    coords: Coords,
    nplex: usize,
    prop: Option<Vec<i32>>,
    eltype: Option<ElementType>,
}

impl Formex {
    /// Creates a formex from a flat point list holding `nplex` points per
    /// element.
    pub fn from_points(coords: Vec<Point3<f64>>, nplex: usize) -> Result<Self> {
        if nplex == 0 {
            return Err(Error::topology("formex elements need at least one point"));
        }
        if coords.len() % nplex != 0 {
            return Err(Error::topology(format!(
                "{} points do not form whole elements of plexitude {}",
                coords.len(),
                nplex
            )));
        }
        let coords = Coords::new(coords)?;
        Ok(Self {
            coords,
            nplex,
            prop: None,
            eltype: None,
        })
    }

    /// Creates a formex from per-element point lists of equal length.
    pub fn from_elements<E: AsRef<[Point3<f64>]>>(elements: &[E]) -> Result<Self> {
        let nplex = elements.first().map_or(1, |e| e.as_ref().len());
        if let Some(i) = elements.iter().position(|e| e.as_ref().len() != nplex) {
            return Err(Error::topology(format!(
                "element {} has {} points, expected {}",
                i,
                elements[i].as_ref().len(),
                nplex
            )));
        }
        let coords = elements
            .iter()
            .flat_map(|e| e.as_ref().iter().copied())
            .collect();
        Self::from_points(coords, nplex)
    }

    /// A formex of single-point elements.
    pub fn points(coords: &Coords) -> Self {
        Self {
            coords: coords.clone(),
            nplex: 1,
            prop: None,
            eltype: None,
        }
    }

    /// Attaches one property number per element.
    pub fn with_prop(mut self, prop: Vec<i32>) -> Result<Self> {
        if prop.len() != self.nelems() {
            return Err(Error::topology(format!(
                "{} property values for {} elements",
                prop.len(),
                self.nelems()
            )));
        }
        self.prop = Some(prop);
        Ok(self)
    }

    /// Sets an explicit element type, which must match the plexitude.
    pub fn with_eltype(mut self, eltype: ElementType) -> Result<Self> {
        if eltype.nplex() != self.nplex {
            return Err(Error::topology(format!(
                "element type {} does not fit plexitude {}",
                eltype, self.nplex
            )));
        }
        self.eltype = Some(eltype);
        Ok(self)
    }

    #[inline]
    pub fn nplex(&self) -> usize {
        self.nplex
    }

    #[inline]
    pub fn nelems(&self) -> usize {
        self.coords.len() / self.nplex
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// All points, element after element.
    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    /// Points of element `i`. Panics if `i >= nelems()`.
    pub fn element(&self, i: usize) -> &[Point3<f64>] {
        &self.coords.points()[i * self.nplex..(i + 1) * self.nplex]
    }

    pub fn elements(&self) -> std::slice::ChunksExact<'_, Point3<f64>> {
        self.coords.points().chunks_exact(self.nplex)
    }

    pub fn prop(&self) -> Option<&[i32]> {
        self.prop.as_deref()
    }

    /// The explicit element type, or the default one for the plexitude.
    pub fn eltype(&self) -> Result<ElementType> {
        match self.eltype {
            Some(t) => Ok(t),
            None => ElementType::default_for_plex(self.nplex),
        }
    }

    fn with_coords(&self, coords: Coords) -> Formex {
        Formex {
            coords,
            nplex: self.nplex,
            prop: self.prop.clone(),
            eltype: self.eltype,
        }
    }

    /// Applies a coordinate transformation to all points.
    pub fn map_coords<F>(&self, f: F) -> Result<Formex>
    where
        F: FnOnce(&Coords) -> Result<Coords>,
    {
        let coords = f(&self.coords)?;
        if coords.len() != self.coords.len() {
            return Err(Error::topology("coordinate map changed the point count"));
        }
        Ok(self.with_coords(coords))
    }

    pub fn translate(&self, v: Vector3<f64>) -> Result<Formex> {
        self.map_coords(|c| c.translate(v))
    }

    pub fn scale(&self, factors: Vector3<f64>) -> Result<Formex> {
        self.map_coords(|c| c.scale(factors))
    }

    pub fn rotate(&self, angle: f64, axis: Vector3<f64>, around: Point3<f64>) -> Result<Formex> {
        self.map_coords(|c| c.rotate(angle, axis, around))
    }

    pub fn reflect(&self, axis: usize, pos: f64) -> Result<Formex> {
        self.map_coords(|c| c.reflect(axis, pos))
    }

    pub fn affine(&self, map: &Affine) -> Result<Formex> {
        self.map_coords(|c| c.affine(map))
    }

    pub fn bbox(&self) -> Result<BoundingBox> {
        self.coords.bbox()
    }

    /// `n` copies, copy `k` translated over `k * step`. The first copy is
    /// the original.
    pub fn replicate(&self, n: usize, step: Vector3<f64>) -> Result<Formex> {
        let coords = self.coords.replicate(n, step)?;
        let mut out = self.with_coords(coords);
        out.prop = self.prop.as_ref().map(|p| p.repeat(n));
        Ok(out)
    }

    /// Successive replications, one per `(n, step)` pair.
    pub fn rep(&self, steps: &[(usize, Vector3<f64>)]) -> Result<Formex> {
        steps
            .iter()
            .try_fold(self.clone(), |f, &(n, step)| f.replicate(n, step))
    }

    /// `n` copies, copy `k` rotated over `k * angle` degrees around `axis`
    /// through `around`.
    pub fn rosette(
        &self,
        n: usize,
        angle: f64,
        axis: Vector3<f64>,
        around: Point3<f64>,
    ) -> Result<Formex> {
        let copies = (0..n)
            .map(|k| self.rotate(angle * k as f64, axis, around))
            .collect::<Result<Vec<_>>>()?;
        Formex::concatenate(&copies)
    }

    /// Reflects in the plane `x[axis] = pos`, keeping the original in
    /// front of the reflection when `keep_orig` is set.
    pub fn mirror(&self, axis: usize, pos: f64, keep_orig: bool) -> Result<Formex> {
        let reflected = self.reflect(axis, pos)?;
        if keep_orig {
            Formex::concatenate(&[self.clone(), reflected])
        } else {
            Ok(reflected)
        }
    }

    /// Reverses the point order inside every element.
    pub fn reverse(&self) -> Result<Formex> {
        let order: Vec<usize> = (0..self.nelems())
            .flat_map(|e| (0..self.nplex).rev().map(move |k| e * self.nplex + k))
            .collect();
        Ok(self.with_coords(self.coords.select(&order)?))
    }

    /// Joins formices of equal plexitude.
    pub fn concatenate(parts: &[Formex]) -> Result<Formex> {
        let first = parts
            .first()
            .ok_or_else(|| Error::topology("nothing to concatenate"))?;
        if let Some(p) = parts.iter().find(|p| p.nplex != first.nplex) {
            return Err(Error::topology(format!(
                "cannot concatenate formices of plexitude {} and {}",
                first.nplex, p.nplex
            )));
        }
        let prop = parts.iter().any(|p| p.prop.is_some()).then(|| {
            parts
                .iter()
                .flat_map(|p| match &p.prop {
                    Some(prop) => prop.clone(),
                    None => vec![0; p.nelems()],
                })
                .collect()
        });
        Ok(Formex {
            coords: Coords::concatenate(&parts.iter().map(|p| p.coords.clone()).collect::<Vec<_>>()),
            nplex: first.nplex,
            prop,
            eltype: first.eltype,
        })
    }

    /// Mean point of every element.
    pub fn centroids(&self) -> Result<Coords> {
        let n = self.nplex as f64;
        Coords::new(
            self.elements()
                .map(|e| Point3::from(e.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n))
                .collect(),
        )
    }

    /// Fuses points closer than `tolerance` into shared points.
    pub fn fuse(&self, tolerance: f64) -> Result<(Coords, Connectivity)> {
        let (unique, mapping) = self.coords.fuse(tolerance)?;
        let elems = Connectivity::new(self.eltype()?, mapping)?;
        Ok((unique, elems))
    }

    /// Compacts the formex into a mesh, merging points within the merge
    /// tolerance for the model size.
    pub fn to_mesh(self, tolerances: &Tolerances) -> Result<Mesh> {
        let tolerance = tolerances.merge_tolerance(self.coords.dsize());
        let (coords, elems) = self.fuse(tolerance)?;
        let mesh = Mesh::new(coords, elems)?;
        match self.prop {
            Some(prop) => mesh.with_prop(prop),
            None => Ok(mesh),
        }
    }
}

impl FromStr for Formex {
    type Err = Error;

    /// Parses `"<nplex>:<pattern>"` into elements of `nplex` successive
    /// pattern points, or `"l:<pattern>"` (or a bare pattern) into a chain
    /// of line segments.
    fn from_str(s: &str) -> Result<Self> {
        let (leader, data, offset) = match s.split_once(':') {
            Some((leader, data)) => (leader, data, leader.chars().count() + 1),
            None => ("l", s, 0),
        };
        if leader == "l" {
            let segments = pattern::line_pattern(data).map_err(|e| shift_pos(e, offset))?;
            return Formex::from_points(segments, 2);
        }
        let nplex: usize = leader
            .parse()
            .map_err(|_| Error::topology(format!("invalid formex string leader '{}'", leader)))?;
        let groups = pattern::xpattern(data, nplex).map_err(|e| shift_pos(e, offset))?;
        Formex::from_points(groups.into_iter().flatten().collect(), nplex)
    }
}

/// Reports pattern errors at their position in the full formex string.
fn shift_pos(err: Error, offset: usize) -> Error {
    match err {
        Error::PatternSyntax { ch, pos } => Error::PatternSyntax {
            ch,
            pos: pos + offset,
        },
        other => other,
    }
}

/// Connects corresponding points of several formices.
///
/// Element `i` of the result holds, for every input `j`, point `nodid[j]`
/// of element `i + bias[j]` of `parts[j]`; so the plexitude equals the
/// number of inputs. Without `looping` the result has as many elements as
/// the shortest biased input; with it, inputs wrap around and the longest
/// input sets the count. `nodid` and `bias` default to zeros.
pub fn connect(
    parts: &[&Formex],
    nodid: Option<&[usize]>,
    bias: Option<&[usize]>,
    looping: bool,
) -> Result<Formex> {
    let m = parts.len();
    if m == 0 {
        return Err(Error::topology("connect needs at least one formex"));
    }
    let zeros = vec![0; m];
    let nodid = nodid.unwrap_or(&zeros);
    let bias = bias.unwrap_or(&zeros);
    if nodid.len() != m || bias.len() != m {
        return Err(Error::topology(format!(
            "connect got {} formices but {} node ids and {} biases",
            m,
            nodid.len(),
            bias.len()
        )));
    }
    for (j, part) in parts.iter().enumerate() {
        if nodid[j] >= part.nplex() {
            return Err(Error::topology(format!(
                "node id {} out of range for plexitude {}",
                nodid[j],
                part.nplex()
            )));
        }
        if part.nelems() == 0 {
            return Err(Error::topology("cannot connect an empty formex"));
        }
    }
    let n = if looping {
        parts.iter().map(|p| p.nelems()).max().unwrap_or(0)
    } else {
        parts
            .iter()
            .zip(bias)
            .map(|(p, &b)| p.nelems().saturating_sub(b))
            .min()
            .unwrap_or(0)
    };
    let mut coords = Vec::with_capacity(n * m);
    for i in 0..n {
        for (j, part) in parts.iter().enumerate() {
            let e = (i + bias[j]) % part.nelems();
            coords.push(part.element(e)[nodid[j]]);
        }
    }
    Formex::from_points(coords, m)
}

/// Interpolations `f + t (g - f)` for every `t` in `div`, concatenated in
/// `div` order. Both formices need the same shape.
pub fn interpolate(f: &Formex, g: &Formex, div: &[f64]) -> Result<Formex> {
    if f.nplex() != g.nplex() || f.nelems() != g.nelems() {
        return Err(Error::topology(format!(
            "cannot interpolate a {}x{} and a {}x{} formex",
            f.nelems(),
            f.nplex(),
            g.nelems(),
            g.nplex()
        )));
    }
    let coords = f.coords.interpolate(&g.coords, div)?;
    let mut out = f.with_coords(coords);
    out.prop = f.prop.as_ref().map(|p| p.repeat(div.len()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn parses_plexitude_leader() {
        let f: Formex = "4:0123".parse().unwrap();
        assert_eq!(f.nplex(), 4);
        assert_eq!(f.element(0), &[p(0., 0., 0.), p(1., 0., 0.), p(1., 1., 0.), p(0., 1., 0.)]);
        assert_eq!(f.eltype().unwrap(), ElementType::Quad4);
    }

    #[test]
    fn parses_line_chain() {
        let f: Formex = "l:1234".parse().unwrap();
        assert_eq!(f.nelems(), 4);
        assert_eq!(f.element(3), &[p(0., 1., 0.), p(0., 0., 0.)]);
    }

    #[test]
    fn pattern_error_position_includes_leader() {
        let err = "3:01x".parse::<Formex>().unwrap_err();
        assert_eq!(err, Error::PatternSyntax { ch: 'x', pos: 4 });
        assert!("q:012".parse::<Formex>().is_err());
    }

    #[test]
    fn replicate_and_rosette() {
        let f: Formex = "l:1".parse().unwrap();
        let r = f.replicate(3, Vector3::y()).unwrap();
        assert_eq!(r.nelems(), 3);
        assert_eq!(r.element(2)[0], p(0., 2., 0.));
        let star = f.rosette(4, 90.0, Vector3::z(), Point3::origin()).unwrap();
        assert_eq!(star.nelems(), 4);
        assert_relative_eq!(star.element(2)[1], p(-1., 0., 0.), epsilon = 1e-12);
    }

    #[test]
    fn mirror_keeps_original_first() {
        let f: Formex = "l:1".parse().unwrap();
        let m = f.mirror(0, 0.0, true).unwrap();
        assert_eq!(m.nelems(), 2);
        assert_eq!(m.element(1)[1], p(-1., 0., 0.));
        assert_eq!(f.mirror(0, 0.0, false).unwrap().nelems(), 1);
    }

    #[test]
    fn connect_with_bias_and_loop() {
        let pts: Formex = "1:1111".parse().unwrap();
        let lines = connect(&[&pts, &pts], None, Some(&[0, 1][..]), false).unwrap();
        assert_eq!(lines.nelems(), 3);
        assert_eq!(lines.element(0), &[p(1., 0., 0.), p(2., 0., 0.)]);
        let closed = connect(&[&pts, &pts], None, Some(&[0, 1][..]), true).unwrap();
        assert_eq!(closed.nelems(), 4);
        assert_eq!(closed.element(3), &[p(4., 0., 0.), p(1., 0., 0.)]);
        assert!(connect(&[&pts], Some(&[1][..]), None, false).is_err());
    }

    #[test]
    fn interpolate_between_formices() {
        let f: Formex = "l:1".parse().unwrap();
        let g = f.translate(Vector3::z()).unwrap();
        let h = interpolate(&f, &g, &[0.0, 0.5, 1.0]).unwrap();
        assert_eq!(h.nelems(), 3);
        assert_eq!(h.element(1)[1], p(1., 0., 0.5));
    }

    #[test]
    fn to_mesh_fuses_shared_points() {
        let f: Formex = "3:012934".parse().unwrap();
        let mesh = f.to_mesh(&Tolerances::default()).unwrap();
        assert_eq!(mesh.npoints(), 4);
        assert_eq!(mesh.elems().data(), &[0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn reverse_and_centroids() {
        let f: Formex = "2:0102".parse().unwrap();
        assert_eq!(f.reverse().unwrap().element(0), &[p(1., 0., 0.), p(0., 0., 0.)]);
        assert_eq!(f.centroids().unwrap()[1], p(0., 0.5, 0.));
    }
}
