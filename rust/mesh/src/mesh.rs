// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structure

use formex_core::{
    Affine, BoundingBox, Connectivity, Coords, ElementType, Error, Result, Tolerances,
};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

use crate::formex::Formex;

/// A point set with an element table over it.
///
/// The coordinates and the element table always travel together: every
/// element index is checked against the point count on construction and
/// the fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "MeshParts"))]
pub struct Mesh {
    coords: Coords,
    elems: Connectivity,
    prop: Option<Vec<i32>>,
}

impl Mesh {
    /// Assembles a mesh, checking that all element indices exist.
    pub fn new(coords: Coords, elems: Connectivity) -> Result<Self> {
        elems.check_max(coords.len())?;
        Ok(Self {
            coords,
            elems,
            prop: None,
        })
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

    /// Sets the same property number on all elements.
    pub fn with_uniform_prop(mut self, value: i32) -> Self {
        self.prop = Some(vec![value; self.nelems()]);
        self
    }

    /// Drops the property numbers.
    pub fn without_prop(mut self) -> Self {
        self.prop = None;
        self
    }

    #[inline]
    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    #[inline]
    pub fn elems(&self) -> &Connectivity {
        &self.elems
    }

    #[inline]
    pub fn prop(&self) -> Option<&[i32]> {
        self.prop.as_deref()
    }

    #[inline]
    pub fn eltype(&self) -> ElementType {
        self.elems.eltype()
    }

    #[inline]
    pub fn npoints(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn nelems(&self) -> usize {
        self.elems.nelems()
    }

    #[inline]
    pub fn nplex(&self) -> usize {
        self.elems.nplex()
    }

    /// Topological dimension of the elements.
    #[inline]
    pub fn level(&self) -> usize {
        self.eltype().ndim()
    }

    pub fn into_parts(self) -> (Coords, Connectivity, Option<Vec<i32>>) {
        (self.coords, self.elems, self.prop)
    }

    /// Coordinates of the nodes of element `e`.
    pub fn element_points(&self, e: usize) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.elems.row(e).iter().map(move |&i| self.coords[i])
    }

    /// Replaces the coordinates through `f`, keeping the topology.
    ///
    /// Fails if `f` changes the number of points.
    pub fn map_coords<F>(&self, f: F) -> Result<Mesh>
    where
        F: FnOnce(&Coords) -> Result<Coords>,
    {
        let coords = f(&self.coords)?;
        if coords.len() != self.npoints() {
            return Err(Error::topology(format!(
                "coordinate map changed the point count from {} to {}",
                self.npoints(),
                coords.len()
            )));
        }
        Ok(Mesh {
            coords,
            elems: self.elems.clone(),
            prop: self.prop.clone(),
        })
    }

    pub fn translate(&self, v: Vector3<f64>) -> Result<Mesh> {
        self.map_coords(|c| c.translate(v))
    }

    pub fn scale(&self, factors: Vector3<f64>) -> Result<Mesh> {
        self.map_coords(|c| c.scale(factors))
    }

    pub fn rotate(&self, angle: f64, axis: Vector3<f64>, around: Point3<f64>) -> Result<Mesh> {
        self.map_coords(|c| c.rotate(angle, axis, around))
    }

    pub fn reflect(&self, axis: usize, pos: f64) -> Result<Mesh> {
        self.map_coords(|c| c.reflect(axis, pos))
    }

    pub fn affine(&self, map: &Affine) -> Result<Mesh> {
        self.map_coords(|c| c.affine(map))
    }

    pub fn bbox(&self) -> Result<BoundingBox> {
        self.coords.bbox()
    }

    /// Drops points not used by any element.
    ///
    /// The kept points retain their relative order.
    pub fn compact(&self) -> Result<Mesh> {
        let used = self.elems.used_nodes();
        if used.len() == self.npoints() {
            return Ok(self.clone());
        }
        let mut map = vec![0usize; self.npoints()];
        for (new, &old) in used.iter().enumerate() {
            map[old] = new;
        }
        Ok(Mesh {
            coords: self.coords.select(&used)?,
            elems: self.elems.renumber(&map)?,
            prop: self.prop.clone(),
        })
    }

    /// The elements at the given positions; all points are kept.
    pub fn select(&self, elements: &[usize]) -> Result<Mesh> {
        let elems = self.elems.select(elements)?;
        let prop = self
            .prop
            .as_ref()
            .map(|p| elements.iter().map(|&e| p[e]).collect());
        Ok(Mesh {
            coords: self.coords.clone(),
            elems,
            prop,
        })
    }

    /// Splits the mesh by a group number per element, e.g. the output of
    /// a partition. Group `g` ends up at position `g`; points are compacted.
    pub fn split(&self, groups: &[usize]) -> Result<Vec<Mesh>> {
        if groups.len() != self.nelems() {
            return Err(Error::topology(format!(
                "{} group numbers for {} elements",
                groups.len(),
                self.nelems()
            )));
        }
        let ngroups = groups.iter().max().map_or(0, |g| g + 1);
        let mut members = vec![Vec::new(); ngroups];
        for (e, &g) in groups.iter().enumerate() {
            members[g].push(e);
        }
        members
            .iter()
            .map(|m| self.select(m)?.compact())
            .collect()
    }

    /// Joins meshes of the same element type, renumbering their points.
    ///
    /// Property numbers are kept when any part has them; parts without
    /// them contribute zeros.
    pub fn concatenate(parts: &[Mesh]) -> Result<Mesh> {
        let first = parts
            .first()
            .ok_or_else(|| Error::topology("nothing to concatenate"))?;
        let mut tables = Vec::with_capacity(parts.len());
        let mut offset = 0;
        for part in parts {
            if part.eltype() != first.eltype() {
                return Err(Error::topology(format!(
                    "cannot concatenate {} and {} meshes",
                    first.eltype(),
                    part.eltype()
                )));
            }
            tables.push(part.elems.shifted(offset));
            offset += part.npoints();
        }
        let coords = Coords::concatenate(&parts.iter().map(|p| p.coords.clone()).collect::<Vec<_>>());
        let elems = Connectivity::concatenate(&tables)?;
        let prop = parts.iter().any(|p| p.prop.is_some()).then(|| {
            parts
                .iter()
                .flat_map(|p| match &p.prop {
                    Some(prop) => prop.clone(),
                    None => vec![0; p.nelems()],
                })
                .collect()
        });
        Ok(Mesh {
            coords,
            elems,
            prop,
        })
    }

    /// Reverses the node order of every element.
    pub fn reverse(&self) -> Mesh {
        Mesh {
            coords: self.coords.clone(),
            elems: self.elems.reverse(),
            prop: self.prop.clone(),
        }
    }

    /// Per element, the mean of the nodes at the given local positions.
    pub fn avg_nodes(&self, local: &[usize]) -> Result<Coords> {
        if local.is_empty() || local.iter().any(|&k| k >= self.nplex()) {
            return Err(Error::topology(format!(
                "local node selection {:?} invalid for {} elements",
                local,
                self.eltype()
            )));
        }
        let n = local.len() as f64;
        let points = self
            .elems
            .rows()
            .map(|row| {
                let sum = local
                    .iter()
                    .fold(Vector3::zeros(), |acc, &k| acc + self.coords[row[k]].coords);
                Point3::from(sum / n)
            })
            .collect();
        Coords::new(points)
    }

    /// Per element, the mean of all its nodes.
    pub fn centroids(&self) -> Result<Coords> {
        let all: Vec<usize> = (0..self.nplex()).collect();
        self.avg_nodes(&all)
    }

    /// Mesh of the unique edges, over the same points.
    pub fn edges_mesh(&self) -> Result<Mesh> {
        let elems = self.elems.edges()?.to_connectivity()?;
        Mesh::new(self.coords.clone(), elems)
    }

    /// Mesh of the unique faces, over the same points.
    pub fn faces_mesh(&self) -> Result<Mesh> {
        let elems = self.elems.faces()?.to_connectivity()?;
        Mesh::new(self.coords.clone(), elems)
    }

    /// Mesh of the border entities: those of one level below the elements
    /// that belong to exactly one element. They keep the local order they
    /// have in their element, so solid borders face outward.
    pub fn borders(&self) -> Result<Mesh> {
        let level = self
            .level()
            .checked_sub(1)
            .ok_or_else(|| Error::topology("point meshes have no border"))?;
        let ents = self.elems.extract_entities(level)?;
        let counts = ents.occurrences();
        let local = self.eltype().entities(level)?;
        let mut rows: Vec<SmallVec<[usize; 4]>> = Vec::new();
        for (e, ids) in ents.adjacency.rows().enumerate() {
            let row = self.elems.row(e);
            for (j, &id) in ids.iter().enumerate() {
                if counts[id] == 1 {
                    rows.push(local[j].iter().map(|&k| row[k]).collect());
                }
            }
        }
        let nplex = match rows.first() {
            Some(r) => r.len(),
            None => local.first().map_or(1, |l| l.len()),
        };
        if rows.iter().any(|r| r.len() != nplex) {
            return Err(Error::topology(format!(
                "border of {} elements has mixed entity sizes",
                self.eltype()
            )));
        }
        let eltype = match level {
            0 => ElementType::Point1,
            1 => ElementType::Line2,
            _ => ElementType::default_for_plex(nplex)?,
        };
        Mesh::new(self.coords.clone(), Connectivity::from_rows(eltype, &rows)?)
    }

    /// Expands the mesh into a formex with one point tuple per element.
    pub fn to_formex(&self) -> Result<Formex> {
        let points = self.elems.data().iter().map(|&i| self.coords[i]).collect();
        let formex = Formex::from_points(points, self.nplex())?.with_eltype(self.eltype())?;
        match &self.prop {
            Some(prop) => formex.with_prop(prop.clone()),
            None => Ok(formex),
        }
    }

    /// Merges points closer than the merge tolerance for this model size.
    pub fn fuse(&self, tolerances: &Tolerances) -> Result<(Mesh, crate::dedup::MergeReport)> {
        self.remove_duplicate(tolerances.merge_tolerance(self.coords.dsize()))
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct MeshParts {
    coords: Coords,
    elems: Connectivity,
    prop: Option<Vec<i32>>,
}

#[cfg(feature = "serde")]
impl TryFrom<MeshParts> for Mesh {
    type Error = Error;

    fn try_from(parts: MeshParts) -> Result<Self> {
        let mesh = Mesh::new(parts.coords, parts.elems)?;
        match parts.prop {
            Some(prop) => mesh.with_prop(prop),
            None => Ok(mesh),
        }
    }
}
