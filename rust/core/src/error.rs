// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types shared by every formex crate.

/// Result type alias for formex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or transforming geometry.
///
/// Errors are reported synchronously by the call that detects them. No
/// operation retries or silently repairs malformed input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed transform, non-finite input or degenerate configuration.
    #[error("geometry error in {op}: {reason}")]
    Geometry {
        /// The operation that rejected its input.
        op: &'static str,
        /// Human readable description of the problem.
        reason: String,
    },

    /// Connectivity mismatch between meshes or topological entities.
    #[error("topology error: {0}")]
    Topology(String),

    /// An element refers to a point that does not exist.
    #[error("element {element} refers to point {index}, but only {npoints} points exist")]
    IndexOutOfRange {
        /// Index of the offending element.
        element: usize,
        /// The out-of-range point index.
        index: usize,
        /// Number of points in the associated point set.
        npoints: usize,
    },

    /// Unknown character in a lattice pattern string.
    #[error("invalid character {ch:?} at position {pos} in pattern")]
    PatternSyntax {
        /// The offending character.
        ch: char,
        /// Zero-based character position in the pattern string.
        pos: usize,
    },

    /// Curve parameter outside of the curve's parameter domain.
    #[error("parameter {value} outside of curve domain [{start}, {end}]")]
    Domain {
        /// The requested parameter value.
        value: f64,
        /// Lower bound of the domain.
        start: f64,
        /// Upper bound of the domain.
        end: f64,
    },

    /// Two curves cannot be joined because their junction points differ.
    #[error("curves are not continuous: gap {gap} exceeds tolerance {tolerance}")]
    Continuity {
        /// Distance between the end of the first and the start of the second curve.
        gap: f64,
        /// The tolerance that was exceeded.
        tolerance: f64,
    },
}

impl Error {
    /// Creates a [`Error::Geometry`] for operation `op`.
    pub fn geometry(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Geometry {
            op,
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::Topology`].
    pub fn topology(reason: impl Into<String>) -> Self {
        Error::Topology(reason.into())
    }
}
