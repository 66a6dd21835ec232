// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # formex mesh
//!
//! Meshes and formices built on the formex core data model.
//!
//! - [`Mesh`]: points plus an element table, with duplicate point removal,
//!   angle-based partitioning, connection, extrusion and revolution.
//! - [`Formex`]: elements with their own points, created from lattice
//!   pattern strings or by replication, compacted into a [`Mesh`].
//! - [`pattern`]: the lattice walk grammar and the named shapes.
//!
//! ## Quick Start
//!
//! ```rust
//! use formex_core::Tolerances;
//! use formex_mesh::Formex;
//! use nalgebra::Vector3;
//!
//! // Two triangles forming a unit square, compacted into a mesh.
//! let tris: Formex = "3:012934".parse()?;
//! let mesh = tris.to_mesh(&Tolerances::default())?;
//! assert_eq!(mesh.npoints(), 4);
//!
//! // Extrude into two layers of wedges.
//! let wedges = mesh.extrude(Vector3::z(), 2)?;
//! assert_eq!(wedges.nelems(), 4);
//! # Ok::<(), formex_core::Error>(())
//! ```

pub mod dedup;
pub mod formex;
pub mod geometry;
pub mod mesh;
pub mod partition;
pub mod pattern;
pub mod sweep;

pub use dedup::MergeReport;
pub use formex::{connect, interpolate, Formex};
pub use geometry::newell_normal;
pub use mesh::Mesh;
pub use pattern::{line_pattern, pattern, shape, xpattern};
pub use sweep::seed;

pub use formex_core::{Error, Result};
