// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element tables and derived topology.
//!
//! A [`Connectivity`] stores `nelems` rows of `nplex` point indices in one
//! flat buffer. Lower-level entities (edges, faces) are derived with a
//! sort-based deduplication over canonical keys, so results never depend
//! on hash iteration order.

use smallvec::SmallVec;

use crate::elements::ElementType;
use crate::error::{Error, Result};
use crate::varray::Varray;

/// Sorted node indices identifying an entity regardless of orientation.
type EntityKey = SmallVec<[usize; 4]>;

/// A fixed-plexitude element table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ConnectivityParts"))]
pub struct Connectivity {
    eltype: ElementType,
    data: Vec<usize>,
}

/// Unique entities of one level and their relation to the elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entities {
    /// Level of the entities (0 nodes, 1 edges, 2 faces, 3 cells).
    pub level: usize,
    /// Unique entities, ordered by ascending sorted node key.
    pub entities: Varray,
    /// Row `e` holds, for every local entity of element `e`, its index in
    /// `entities`.
    pub adjacency: Varray,
}

impl Entities {
    /// The entity table as a fixed-plexitude [`Connectivity`].
    ///
    /// Fails when entities have different sizes, as with the faces of a
    /// wedge.
    pub fn to_connectivity(&self) -> Result<Connectivity> {
        let nplex = match self.entities.rows().next() {
            Some(first) => first.len(),
            None => return Connectivity::new(self.entity_type(1)?, Vec::new()),
        };
        if self.entities.rows().any(|r| r.len() != nplex) {
            return Err(Error::topology(format!(
                "level {} entities have mixed sizes",
                self.level
            )));
        }
        Connectivity::new(self.entity_type(nplex)?, self.entities.data().to_vec())
    }

    fn entity_type(&self, nplex: usize) -> Result<ElementType> {
        match self.level {
            0 => Ok(ElementType::Point1),
            1 => Ok(ElementType::Line2),
            _ => ElementType::default_for_plex(nplex.max(3)),
        }
    }

    /// Number of times each entity occurs among the elements.
    pub fn occurrences(&self) -> Vec<usize> {
        let mut counts = vec![0; self.entities.len()];
        for &id in self.adjacency.data() {
            counts[id] += 1;
        }
        counts
    }
}

impl Connectivity {
    /// Wraps a flat index buffer.
    pub fn new(eltype: ElementType, data: Vec<usize>) -> Result<Self> {
        eltype.validate()?;
        let nplex = eltype.nplex();
        if data.len() % nplex != 0 {
            return Err(Error::topology(format!(
                "{} indices do not form whole {} elements",
                data.len(),
                eltype
            )));
        }
        Ok(Self { eltype, data })
    }

    /// Builds a table from rows; every row must have the type's plexitude.
    pub fn from_rows<R: AsRef<[usize]>>(eltype: ElementType, rows: &[R]) -> Result<Self> {
        eltype.validate()?;
        let nplex = eltype.nplex();
        let mut data = Vec::with_capacity(rows.len() * nplex);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != nplex {
                return Err(Error::topology(format!(
                    "element {} has {} nodes, {} needs {}",
                    i,
                    row.len(),
                    eltype,
                    nplex
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { eltype, data })
    }

    /// Checks that every index is below `npoints`.
    pub fn check_max(&self, npoints: usize) -> Result<()> {
        if let Some(pos) = self.data.iter().position(|&i| i >= npoints) {
            return Err(Error::IndexOutOfRange {
                element: pos / self.nplex(),
                index: self.data[pos],
                npoints,
            });
        }
        Ok(())
    }

    /// Returns the table after checking that every index is below `npoints`.
    pub fn with_max(self, npoints: usize) -> Result<Self> {
        self.check_max(npoints)?;
        Ok(self)
    }

    #[inline]
    pub fn eltype(&self) -> ElementType {
        self.eltype
    }

    #[inline]
    pub fn nplex(&self) -> usize {
        self.eltype.nplex()
    }

    #[inline]
    pub fn nelems(&self) -> usize {
        self.data.len() / self.nplex()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row `i`. Panics if `i >= nelems()`.
    #[inline]
    pub fn row(&self, i: usize) -> &[usize] {
        let n = self.nplex();
        &self.data[i * n..(i + 1) * n]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, usize> {
        self.data.chunks_exact(self.nplex())
    }

    /// The flat index buffer.
    pub fn data(&self) -> &[usize] {
        &self.data
    }

    pub fn max_index(&self) -> Option<usize> {
        self.data.iter().copied().max()
    }

    /// Sorted unique point indices referenced by the table.
    pub fn used_nodes(&self) -> Vec<usize> {
        let mut nodes = self.data.clone();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Derives the unique entities of `level` bounding the elements.
    ///
    /// Each entity instance is keyed by its sorted node indices; instances
    /// with equal keys are the same entity. The stored representative is
    /// the first occurrence, rotated to start at its smallest index when
    /// entities of this level are oriented and fully sorted otherwise.
    pub fn extract_entities(&self, level: usize) -> Result<Entities> {
        let local = self.eltype.entities(level)?;
        let oriented = self.eltype.is_oriented(level);
        let nloc = local.len();

        let mut keys: Vec<EntityKey> = Vec::with_capacity(self.nelems() * nloc);
        for row in self.rows() {
            for entity in &local {
                let mut key: EntityKey = entity.iter().map(|&k| row[k]).collect();
                key.sort_unstable();
                keys.push(key);
            }
        }

        // Stable sort keeps first occurrences at the front of each group.
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

        let mut entities = Varray::new();
        let mut ids = vec![0usize; keys.len()];
        let mut current: Option<&EntityKey> = None;
        for &inst in &order {
            if current != Some(&keys[inst]) {
                current = Some(&keys[inst]);
                let (e, j) = (inst / nloc, inst % nloc);
                let row = self.row(e);
                let nodes: EntityKey = local[j].iter().map(|&k| row[k]).collect();
                if oriented {
                    entities.push_row(&rotate_to_min(&nodes));
                } else {
                    entities.push_row(&keys[inst]);
                }
            }
            ids[inst] = entities.len() - 1;
        }
        let adjacency = Varray::from_rows(ids.chunks(nloc.max(1)).take(self.nelems()));

        tracing::debug!(
            eltype = %self.eltype,
            level,
            elements = self.nelems(),
            entities = entities.len(),
            "extracted entities"
        );
        Ok(Entities {
            level,
            entities,
            adjacency,
        })
    }

    /// Unique edges.
    pub fn edges(&self) -> Result<Entities> {
        self.extract_entities(1)
    }

    /// Unique faces.
    pub fn faces(&self) -> Result<Entities> {
        self.extract_entities(2)
    }

    /// For every point, the ascending list of elements referencing it.
    pub fn inverse(&self) -> Varray {
        Varray::from_rows(self.rows()).inverse(0)
    }

    /// For every element, the ascending list of other elements sharing at
    /// least one entity of `level` with it. Level 0 means sharing a node.
    pub fn element_adjacency(&self, level: usize) -> Result<Varray> {
        let (incidence, nitems) = if level == 0 {
            (Varray::from_rows(self.rows()), self.max_index().map_or(0, |m| m + 1))
        } else {
            let ents = self.extract_entities(level)?;
            let n = ents.entities.len();
            (ents.adjacency, n)
        };
        let owners = incidence.inverse(nitems);
        let mut adjacency = Varray::new();
        for (e, items) in incidence.rows().enumerate() {
            let mut neighbours: Vec<usize> = items
                .iter()
                .flat_map(|&it| owners.row(it).iter().copied())
                .filter(|&other| other != e)
                .collect();
            neighbours.sort_unstable();
            neighbours.dedup();
            adjacency.push_row(&neighbours);
        }
        Ok(adjacency)
    }

    /// Marks elements that reference the same point more than once.
    pub fn test_degenerate(&self) -> Vec<bool> {
        self.rows()
            .map(|row| {
                let mut sorted: EntityKey = row.iter().copied().collect();
                sorted.sort_unstable();
                sorted.windows(2).any(|w| w[0] == w[1])
            })
            .collect()
    }

    /// The table without degenerate elements.
    pub fn remove_degenerate(&self) -> Connectivity {
        self.filter_by(&self.test_degenerate())
    }

    /// Marks elements whose node set equals that of an earlier element.
    pub fn test_duplicate(&self) -> Vec<bool> {
        let keys: Vec<EntityKey> = self
            .rows()
            .map(|row| {
                let mut key: EntityKey = row.iter().copied().collect();
                key.sort_unstable();
                key
            })
            .collect();
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        let mut duplicate = vec![false; keys.len()];
        for w in order.windows(2) {
            if keys[w[0]] == keys[w[1]] {
                duplicate[w[1]] = true;
            }
        }
        duplicate
    }

    /// The table without duplicate elements; first occurrences are kept.
    pub fn remove_duplicate(&self) -> Connectivity {
        self.filter_by(&self.test_duplicate())
    }

    /// Reverses the node order of every element.
    pub fn reverse(&self) -> Connectivity {
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.rows() {
            data.extend(row.iter().rev());
        }
        Connectivity {
            eltype: self.eltype,
            data,
        }
    }

    /// Replaces every index `i` by `map[i]`.
    pub fn renumber(&self, map: &[usize]) -> Result<Connectivity> {
        self.check_max(map.len())?;
        Ok(Connectivity {
            eltype: self.eltype,
            data: self.data.iter().map(|&i| map[i]).collect(),
        })
    }

    /// Adds `offset` to every index.
    pub fn shifted(&self, offset: usize) -> Connectivity {
        Connectivity {
            eltype: self.eltype,
            data: self.data.iter().map(|&i| i + offset).collect(),
        }
    }

    /// Elements at the given positions, in the given order.
    pub fn select(&self, elements: &[usize]) -> Result<Connectivity> {
        let nelems = self.nelems();
        let mut data = Vec::with_capacity(elements.len() * self.nplex());
        for &e in elements {
            if e >= nelems {
                return Err(Error::topology(format!(
                    "element {} selected from a table of {}",
                    e, nelems
                )));
            }
            data.extend_from_slice(self.row(e));
        }
        Ok(Connectivity {
            eltype: self.eltype,
            data,
        })
    }

    /// Stacks tables of the same element type. Indices are not shifted.
    pub fn concatenate(parts: &[Connectivity]) -> Result<Connectivity> {
        let first = parts
            .first()
            .ok_or_else(|| Error::topology("nothing to concatenate"))?;
        let mut data = Vec::with_capacity(parts.iter().map(|p| p.data.len()).sum());
        for part in parts {
            if part.eltype != first.eltype {
                return Err(Error::topology(format!(
                    "cannot concatenate {} and {} elements",
                    first.eltype, part.eltype
                )));
            }
            data.extend_from_slice(&part.data);
        }
        Ok(Connectivity {
            eltype: first.eltype,
            data,
        })
    }

    fn filter_by(&self, drop: &[bool]) -> Connectivity {
        let data = self
            .rows()
            .zip(drop)
            .filter(|(_, d)| !**d)
            .flat_map(|(row, _)| row.iter().copied())
            .collect();
        Connectivity {
            eltype: self.eltype,
            data,
        }
    }
}

/// Rotates an oriented loop so that it starts at its smallest index.
fn rotate_to_min(nodes: &[usize]) -> EntityKey {
    let start = nodes
        .iter()
        .enumerate()
        .min_by_key(|&(_, v)| *v)
        .map_or(0, |(i, _)| i);
    nodes[start..].iter().chain(&nodes[..start]).copied().collect()
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ConnectivityParts {
    eltype: ElementType,
    data: Vec<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<ConnectivityParts> for Connectivity {
    type Error = Error;

    fn try_from(parts: ConnectivityParts) -> Result<Self> {
        Connectivity::new(parts.eltype, parts.data)
    }
}
