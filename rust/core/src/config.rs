// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Numeric tolerances threaded through tolerance-sensitive operations.
//!
//! There is no process-wide default state: callers construct a
//! [`Tolerances`] value (usually via [`Tolerances::default`] or
//! [`Tolerances::from_env`]) and pass it to the operations that need it.

/// Threshold below which vector lengths and determinants count as zero.
///
/// This is a fixed numeric floor, not a modelling tolerance, so it is not
/// part of [`Tolerances`].
pub const DEGENERATE_EPS: f64 = 1e-12;

/// Tolerances used for point fusing and curve joining.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    /// Relative tolerance for point fusing, scaled by the model size.
    pub rtol: f64,
    /// Absolute floor for all coincidence tests.
    pub atol: f64,
    /// Maximum gap between joined curve ends.
    pub continuity: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
            continuity: 1e-6,
        }
    }
}

impl Tolerances {
    /// Load tolerances from environment variables.
    ///
    /// Reads `FORMEX_RTOL`, `FORMEX_ATOL` and `FORMEX_CONTINUITY_TOL`.
    /// Unset, unparseable, negative or non-finite values fall back to the
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rtol: env_tolerance("FORMEX_RTOL").unwrap_or(defaults.rtol),
            atol: env_tolerance("FORMEX_ATOL").unwrap_or(defaults.atol),
            continuity: env_tolerance("FORMEX_CONTINUITY_TOL").unwrap_or(defaults.continuity),
        }
    }

    /// Absolute merge distance for a model whose bounding box diagonal is `model_size`.
    #[inline]
    pub fn merge_tolerance(&self, model_size: f64) -> f64 {
        (self.rtol * model_size).max(self.atol)
    }
}

fn env_tolerance(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
