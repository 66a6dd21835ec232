// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # formex core
//!
//! Point coordinates, affine maps and element connectivity: the data model
//! shared by the mesh and curve crates.
//!
//! ## Overview
//!
//! - **Coordinates**: [`Coords`] holds an ordered 3D point set with pure
//!   bulk transformations (translate, rotate, affine, cylindrical and
//!   spherical maps) and queries (bounding box, centroid, inertia).
//! - **Elements**: [`ElementType`] is a closed catalogue of element shapes
//!   with their local edge and face tables.
//! - **Connectivity**: [`Connectivity`] derives unique edges and faces and
//!   their adjacency with sort-based deduplication.
//! - **Fusing**: [`spatial::fuse_points`] merges coincident points through
//!   a tolerance grid.
//!
//! ## Quick Start
//!
//! ```rust
//! use formex_core::{Connectivity, Coords, ElementType};
//! use nalgebra::{Point3, Vector3};
//!
//! let coords = Coords::from_flat(&[0., 0., 0., 1., 0., 0., 1., 1., 0., 0., 1., 0.])?;
//! let rotated = coords.rotate(90.0, Vector3::z(), Point3::origin())?;
//! assert_eq!(rotated.len(), 4);
//!
//! let quad = Connectivity::from_rows(ElementType::Quad4, &[[0, 1, 2, 3]])?;
//! assert_eq!(quad.edges()?.entities.len(), 4);
//! # Ok::<(), formex_core::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization of the data types

pub mod config;
pub mod connectivity;
pub mod coords;
pub mod elements;
pub mod error;
pub mod spatial;
pub mod transform;
pub mod varray;

pub use config::{Tolerances, DEGENERATE_EPS};
pub use connectivity::{Connectivity, Entities};
pub use coords::{BoundingBox, Coords, Inertia, PrincipalAxes};
pub use elements::{ElementType, LocalEntity};
pub use error::{Error, Result};
pub use spatial::{fuse_points, SpatialIndex};
pub use transform::Affine;
pub use varray::Varray;

// Re-export the math types that appear in the public API.
pub use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
