// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sweeping meshes into higher-dimensional meshes.
//!
//! All sweeps build a stack of point layers with identical topology and
//! join each pair of consecutive layers with elements of the extruded type
//! (points become lines, lines quads, triangles wedges, quads hexes).
//! Point layers are stored one after another and elements layer by layer.

use formex_core::{Connectivity, Coords, Error, Result, DEGENERATE_EPS};
use nalgebra::{Point3, Vector3};

use crate::mesh::Mesh;

/// `n + 1` parameter values spanning `[0, 1]`.
///
/// With `bias = 0` the values are equally spaced. A positive bias packs
/// them towards 1, a negative one towards 0. `|bias|` must stay below 1 to
/// keep the values strictly increasing.
pub fn seed(n: usize, bias: f64) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(Error::geometry("seed", "need at least one division"));
    }
    if !(bias.is_finite() && bias.abs() < 1.0) {
        return Err(Error::geometry(
            "seed",
            format!("bias must lie in (-1, 1), got {}", bias),
        ));
    }
    Ok((0..=n)
        .map(|i| {
            let t = i as f64 / n as f64;
            t + bias * t * (1.0 - t)
        })
        .collect())
}

impl Mesh {
    /// Connects this mesh to `other` with `div` layers of elements.
    ///
    /// Both meshes need the same element type, point count and element
    /// table. The intermediate point layers are linear interpolations.
    pub fn connect(&self, other: &Mesh, div: usize) -> Result<Mesh> {
        self.connect_seeds(other, &seed(div, 0.0)?)
    }

    /// Like [`Mesh::connect`], with explicit interpolation parameters.
    ///
    /// `seeds` must hold at least two strictly increasing finite values;
    /// 0 is this mesh and 1 is `other`.
    pub fn connect_seeds(&self, other: &Mesh, seeds: &[f64]) -> Result<Mesh> {
        if self.eltype() != other.eltype() {
            return Err(Error::topology(format!(
                "cannot connect {} and {} meshes",
                self.eltype(),
                other.eltype()
            )));
        }
        if self.npoints() != other.npoints() || self.nelems() != other.nelems() {
            return Err(Error::topology(format!(
                "cannot connect a mesh of {} points and {} elements to one of {} points and {} elements",
                self.npoints(),
                self.nelems(),
                other.npoints(),
                other.nelems()
            )));
        }
        if self.elems() != other.elems() {
            return Err(Error::topology("connected meshes need identical element tables"));
        }
        if seeds.len() < 2 || seeds.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::geometry(
                "connect",
                "seeds must hold at least two strictly increasing values",
            ));
        }
        let layers = seeds
            .iter()
            .map(|&t| self.coords().interpolate(other.coords(), &[t]))
            .collect::<Result<Vec<_>>>()?;
        self.stack_layers(&layers)
    }

    /// Extrudes the mesh `steps` times over `direction`.
    ///
    /// A quad mesh of 4 points extruded 3 steps gives 16 points and 3 hexes.
    pub fn extrude(&self, direction: Vector3<f64>, steps: usize) -> Result<Mesh> {
        if steps == 0 {
            return Err(Error::geometry("extrude", "need at least one step"));
        }
        if !direction.iter().all(|v| v.is_finite()) || direction.norm() <= DEGENERATE_EPS {
            return Err(Error::geometry("extrude", "direction has zero length"));
        }
        let layers = (0..=steps)
            .map(|k| self.coords().translate(direction * k as f64))
            .collect::<Result<Vec<_>>>()?;
        self.stack_layers(&layers)
    }

    /// Revolves the mesh over a total of `angle` degrees around `axis`
    /// through `around`, in `steps` equal steps.
    ///
    /// A full revolution keeps the last layer separate from the first; use
    /// [`Mesh::remove_duplicate`] to close the seam.
    pub fn revolve(
        &self,
        axis: Vector3<f64>,
        angle: f64,
        around: Point3<f64>,
        steps: usize,
    ) -> Result<Mesh> {
        if steps == 0 {
            return Err(Error::geometry("revolve", "need at least one step"));
        }
        if !angle.is_finite() || angle.abs() <= DEGENERATE_EPS {
            return Err(Error::geometry("revolve", "revolution angle is zero"));
        }
        if axis.norm() <= DEGENERATE_EPS {
            return Err(Error::geometry("revolve", "revolution axis has zero length"));
        }
        let step = angle / steps as f64;
        let layers = (0..=steps)
            .map(|k| self.coords().rotate(step * k as f64, axis, around))
            .collect::<Result<Vec<_>>>()?;
        self.stack_layers(&layers)
    }

    /// Joins consecutive point layers, each shaped like `self.coords()`.
    fn stack_layers(&self, layers: &[Coords]) -> Result<Mesh> {
        let eltype = self.eltype().extruded()?;
        let order = self.eltype().connect_order()?;
        let npoints = self.npoints();
        let nsteps = layers.len().saturating_sub(1);

        let mut data = Vec::with_capacity(nsteps * self.nelems() * eltype.nplex());
        for layer in 0..nsteps {
            for row in self.elems().rows() {
                data.extend(
                    order
                        .iter()
                        .map(|&(side, local)| (layer + side) * npoints + row[local]),
                );
            }
        }
        let coords = Coords::concatenate(layers);
        let mesh = Mesh::new(coords, Connectivity::new(eltype, data)?)?;

        tracing::debug!(
            from = %self.eltype(),
            to = %eltype,
            layers = layers.len(),
            elements = mesh.nelems(),
            "swept mesh"
        );
        match self.prop() {
            Some(prop) => mesh.with_prop(prop.repeat(nsteps)),
            None => Ok(mesh),
        }
    }
}
