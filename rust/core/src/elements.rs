// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element type catalogue.
//!
//! Every element table carries an explicit [`ElementType`]. The local edge
//! and face tables below define how lower-level entities are derived from
//! an element's nodes. Faces of solid elements are listed with outward
//! winding (counter-clockwise seen from outside).

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Local node indices of one entity of an element.
pub type LocalEntity = SmallVec<[usize; 4]>;

/// The element types known to the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    /// Single node.
    Point1,
    /// Straight two-node segment.
    Line2,
    /// Linear triangle.
    Tri3,
    /// Bilinear quadrilateral.
    Quad4,
    /// Linear tetrahedron.
    Tet4,
    /// Triangular prism; nodes 0..3 bottom, 3..6 top.
    Wedge6,
    /// Trilinear hexahedron; nodes 0..4 bottom, 4..8 top.
    Hex8,
    /// Planar polygon with the given number of nodes (at least 3).
    Polygon(usize),
}

const TRI3_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];
const QUAD4_EDGES: [[usize; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];
const TET4_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
const WEDGE6_EDGES: [[usize; 2]; 9] = [
    [0, 1],
    [1, 2],
    [2, 0],
    [3, 4],
    [4, 5],
    [5, 3],
    [0, 3],
    [1, 4],
    [2, 5],
];
const HEX8_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

const TET4_FACES: [&[usize]; 4] = [&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[0, 3, 2]];
const WEDGE6_FACES: [&[usize]; 5] = [
    &[0, 2, 1],
    &[3, 4, 5],
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[2, 0, 3, 5],
];
const HEX8_FACES: [&[usize]; 6] = [
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];

impl ElementType {
    /// Number of nodes per element.
    pub fn nplex(&self) -> usize {
        match self {
            ElementType::Point1 => 1,
            ElementType::Line2 => 2,
            ElementType::Tri3 => 3,
            ElementType::Quad4 => 4,
            ElementType::Tet4 => 4,
            ElementType::Wedge6 => 6,
            ElementType::Hex8 => 8,
            ElementType::Polygon(n) => *n,
        }
    }

    /// Topological dimension of the element.
    pub fn ndim(&self) -> usize {
        match self {
            ElementType::Point1 => 0,
            ElementType::Line2 => 1,
            ElementType::Tri3 | ElementType::Quad4 | ElementType::Polygon(_) => 2,
            ElementType::Tet4 | ElementType::Wedge6 | ElementType::Hex8 => 3,
        }
    }

    /// Default element type for a plexitude.
    pub fn default_for_plex(nplex: usize) -> Result<Self> {
        match nplex {
            0 => Err(Error::topology("elements need at least one node")),
            1 => Ok(ElementType::Point1),
            2 => Ok(ElementType::Line2),
            3 => Ok(ElementType::Tri3),
            4 => Ok(ElementType::Quad4),
            n => Ok(ElementType::Polygon(n)),
        }
    }

    /// Checks that a polygon has at least three nodes.
    pub fn validate(&self) -> Result<()> {
        match self {
            ElementType::Polygon(n) if *n < 3 => Err(Error::topology(format!(
                "a polygon needs at least 3 nodes, got {}",
                n
            ))),
            _ => Ok(()),
        }
    }

    /// Lower-case name, e.g. `"tri3"` or `"polygon6"`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Parses a name produced by [`ElementType::name`].
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse()
    }

    /// Local edge table.
    pub fn edges(&self) -> Vec<LocalEntity> {
        let pairs: &[[usize; 2]] = match self {
            ElementType::Point1 => &[],
            ElementType::Line2 => &[[0, 1]],
            ElementType::Tri3 => &TRI3_EDGES,
            ElementType::Quad4 => &QUAD4_EDGES,
            ElementType::Tet4 => &TET4_EDGES,
            ElementType::Wedge6 => &WEDGE6_EDGES,
            ElementType::Hex8 => &HEX8_EDGES,
            ElementType::Polygon(n) => {
                return (0..*n)
                    .map(|i| LocalEntity::from_slice(&[i, (i + 1) % n]))
                    .collect()
            }
        };
        pairs.iter().map(|p| LocalEntity::from_slice(p)).collect()
    }

    /// Local face table. Surface elements are their own single face.
    pub fn faces(&self) -> Vec<LocalEntity> {
        let faces: &[&[usize]] = match self {
            ElementType::Point1 | ElementType::Line2 => &[],
            ElementType::Tri3 | ElementType::Quad4 | ElementType::Polygon(_) => {
                return vec![(0..self.nplex()).collect()]
            }
            ElementType::Tet4 => &TET4_FACES,
            ElementType::Wedge6 => &WEDGE6_FACES,
            ElementType::Hex8 => &HEX8_FACES,
        };
        faces.iter().map(|f| LocalEntity::from_slice(f)).collect()
    }

    /// Local entities of the given level: 0 nodes, 1 edges, 2 faces,
    /// 3 the solid itself.
    pub fn entities(&self, level: usize) -> Result<Vec<LocalEntity>> {
        if level > self.ndim() {
            return Err(Error::topology(format!(
                "{} elements have no level {} entities",
                self, level
            )));
        }
        Ok(match level {
            0 => (0..self.nplex()).map(|i| LocalEntity::from_slice(&[i])).collect(),
            1 => self.edges(),
            2 => self.faces(),
            _ => vec![(0..self.nplex()).collect()],
        })
    }

    /// Whether entities of `level` carry an orientation that must be kept
    /// when deduplicating. Edges and nodes do not; faces do.
    pub fn is_oriented(&self, level: usize) -> bool {
        level >= 2
    }

    /// Element type obtained by sweeping this one through one layer.
    pub fn extruded(&self) -> Result<ElementType> {
        match self {
            ElementType::Point1 => Ok(ElementType::Line2),
            ElementType::Line2 => Ok(ElementType::Quad4),
            ElementType::Tri3 => Ok(ElementType::Wedge6),
            ElementType::Quad4 => Ok(ElementType::Hex8),
            other => Err(Error::topology(format!("{} elements cannot be extruded", other))),
        }
    }

    /// Node order of the extruded element, as `(layer, local node)` pairs
    /// where layer 0 is the start and layer 1 the end of the sweep.
    pub fn connect_order(&self) -> Result<&'static [(usize, usize)]> {
        match self {
            ElementType::Point1 => Ok(&[(0, 0), (1, 0)]),
            ElementType::Line2 => Ok(&[(0, 0), (0, 1), (1, 1), (1, 0)]),
            ElementType::Tri3 => Ok(&[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]),
            ElementType::Quad4 => Ok(&[
                (0, 0),
                (0, 1),
                (0, 2),
                (0, 3),
                (1, 0),
                (1, 1),
                (1, 2),
                (1, 3),
            ]),
            other => Err(Error::topology(format!("{} elements cannot be connected", other))),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Point1 => f.write_str("point1"),
            ElementType::Line2 => f.write_str("line2"),
            ElementType::Tri3 => f.write_str("tri3"),
            ElementType::Quad4 => f.write_str("quad4"),
            ElementType::Tet4 => f.write_str("tet4"),
            ElementType::Wedge6 => f.write_str("wedge6"),
            ElementType::Hex8 => f.write_str("hex8"),
            ElementType::Polygon(n) => write!(f, "polygon{}", n),
        }
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let eltype = match s.to_ascii_lowercase().as_str() {
            "point1" => ElementType::Point1,
            "line2" => ElementType::Line2,
            "tri3" => ElementType::Tri3,
            "quad4" => ElementType::Quad4,
            "tet4" => ElementType::Tet4,
            "wedge6" => ElementType::Wedge6,
            "hex8" => ElementType::Hex8,
            other => {
                let n = other
                    .strip_prefix("polygon")
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| Error::topology(format!("unknown element type '{}'", s)))?;
                ElementType::Polygon(n)
            }
        };
        eltype.validate()?;
        Ok(eltype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ElementType; 8] = [
        ElementType::Point1,
        ElementType::Line2,
        ElementType::Tri3,
        ElementType::Quad4,
        ElementType::Tet4,
        ElementType::Wedge6,
        ElementType::Hex8,
        ElementType::Polygon(5),
    ];

    #[test]
    fn names_round_trip() {
        for eltype in ALL {
            assert_eq!(ElementType::from_name(&eltype.name()).unwrap(), eltype);
        }
        assert!(ElementType::from_name("polygon2").is_err());
        assert!(ElementType::from_name("hex20").is_err());
    }

    #[test]
    fn local_tables_stay_in_range() {
        for eltype in ALL {
            for level in 0..=eltype.ndim() {
                for entity in eltype.entities(level).unwrap() {
                    assert!(entity.iter().all(|&i| i < eltype.nplex()), "{} level {}", eltype, level);
                }
            }
        }
    }

    #[test]
    fn every_hex_edge_bounds_two_faces() {
        let faces = ElementType::Hex8.faces();
        for edge in ElementType::Hex8.edges() {
            let count = faces
                .iter()
                .filter(|f| f.contains(&edge[0]) && f.contains(&edge[1]))
                .count();
            assert_eq!(count, 2);
        }
    }

    #[test]
    fn default_types_by_plexitude() {
        assert_eq!(ElementType::default_for_plex(2).unwrap(), ElementType::Line2);
        assert_eq!(ElementType::default_for_plex(4).unwrap(), ElementType::Quad4);
        assert_eq!(ElementType::default_for_plex(7).unwrap(), ElementType::Polygon(7));
        assert!(ElementType::default_for_plex(0).is_err());
    }

    #[test]
    fn extrusion_chain() {
        assert_eq!(ElementType::Line2.extruded().unwrap(), ElementType::Quad4);
        assert_eq!(ElementType::Quad4.extruded().unwrap(), ElementType::Hex8);
        assert!(ElementType::Hex8.extruded().is_err());
        let order = ElementType::Tri3.connect_order().unwrap();
        assert_eq!(order.len(), ElementType::Wedge6.nplex());
    }

    #[test]
    fn level_above_dimension_is_rejected() {
        assert!(matches!(ElementType::Tri3.entities(3), Err(Error::Topology(_))));
    }
}
