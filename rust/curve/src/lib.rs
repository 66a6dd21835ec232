// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # formex curve
//!
//! Parametric curves: polylines, lines, circular arcs, piecewise Bezier
//! splines, NURBS and chains of those.
//!
//! ## Overview
//!
//! - **Evaluation**: every curve implements [`ParametricCurve`], a pure
//!   map from a [`ParamDomain`] to points and first derivatives.
//!   Parameters outside a non-periodic domain are a
//!   [`Error::Domain`](formex_core::Error::Domain).
//! - **Sampling**: [`ParametricCurve::sample`] and
//!   [`ParametricCurve::to_mesh`] turn curves into point lists and Line2
//!   meshes, uniformly or adaptively.
//! - **NURBS**: [`NurbsCurve`] evaluates rational B-splines through the
//!   Cox-de Boor basis, with derivatives, curvature and knot insertion.
//! - **Joining**: [`Curve::append`] chains curves whose ends meet within a
//!   tolerance into a [`CompositeCurve`].
//!
//! ## Quick Start
//!
//! ```rust
//! use formex_core::Tolerances;
//! use formex_curve::{Curve, Line, ParametricCurve, Sampling};
//! use nalgebra::Point3;
//!
//! let tol = Tolerances::default();
//! let a = Line::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0))?;
//! let b = Line::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0))?;
//! let path = Curve::from(a).append(b, tol.continuity)?;
//!
//! let (start, end) = path.endpoints()?;
//! assert_eq!(end, Point3::new(1.0, 1.0, 0.0));
//! assert_eq!(start, Point3::origin());
//!
//! let mesh = path.to_mesh(Sampling::PerPart(4))?;
//! assert_eq!(mesh.nelems(), 8);
//! # Ok::<(), formex_core::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization of the curve types

pub mod arc;
pub mod bezier;
pub mod composite;
pub mod curve;
pub mod domain;
pub mod knots;
pub mod nurbs;
pub mod polyline;

pub use arc::{Arc, ArcDirection};
pub use bezier::{de_casteljau, split_bezier, BezierSpline};
pub use composite::CompositeCurve;
pub use curve::{Curve, ParametricCurve, Sampling};
pub use domain::ParamDomain;
pub use knots::KnotVector;
pub use nurbs::NurbsCurve;
pub use polyline::{Line, PolyLine};

pub use formex_core::{Error, Result};
