// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter domains of curves.

use formex_core::{Error, Result};

/// Relative slack on the domain bounds, absorbing rounding in computed
/// parameter values.
const DOMAIN_EPS: f64 = 1e-10;

/// Closed parameter interval `[start, end]`, optionally periodic.
///
/// On a periodic domain parameters wrap around, so `end` denotes the same
/// point as `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamDomain {
    pub start: f64,
    pub end: f64,
    pub periodic: bool,
}

impl ParamDomain {
    /// A domain with `start < end`, both finite.
    pub fn new(start: f64, end: f64, periodic: bool) -> Result<Self> {
        if !(start.is_finite() && end.is_finite() && start < end) {
            return Err(Error::geometry(
                "domain",
                format!("invalid parameter interval [{}, {}]", start, end),
            ));
        }
        Ok(Self {
            start,
            end,
            periodic,
        })
    }

    /// The unit interval `[0, 1]`.
    pub fn unit() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
            periodic: false,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn contains(&self, u: f64) -> bool {
        self.start <= u && u <= self.end
    }

    /// The parameter at fraction `t` of the domain; `t = 1` gives `end`
    /// exactly.
    #[inline]
    pub fn lerp(&self, t: f64) -> f64 {
        if t >= 1.0 {
            self.end
        } else {
            self.start + t * self.length()
        }
    }

    /// Brings `u` into the domain.
    ///
    /// Periodic domains wrap `u` into `[start, end)`. Other domains accept
    /// values within rounding distance of the bounds and clamp them; values
    /// further out, and NaN, are a [`Error::Domain`].
    pub fn clamp_param(&self, u: f64) -> Result<f64> {
        let out_of_domain = Error::Domain {
            value: u,
            start: self.start,
            end: self.end,
        };
        if !u.is_finite() {
            return Err(out_of_domain);
        }
        if self.periodic {
            return Ok(self.start + (u - self.start).rem_euclid(self.length()));
        }
        let slack = DOMAIN_EPS * self.length().max(1.0);
        if u < self.start - slack || u > self.end + slack {
            return Err(out_of_domain);
        }
        Ok(u.clamp(self.start, self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_domain_rejects_outside_values() {
        let d = ParamDomain::new(0.0, 2.0, false).unwrap();
        assert_eq!(d.clamp_param(2.0).unwrap(), 2.0);
        assert_eq!(d.clamp_param(2.0 + 1e-12).unwrap(), 2.0);
        assert_eq!(
            d.clamp_param(2.5).unwrap_err(),
            Error::Domain {
                value: 2.5,
                start: 0.0,
                end: 2.0
            }
        );
        assert!(d.clamp_param(f64::NAN).is_err());
    }

    #[test]
    fn periodic_domain_wraps() {
        let d = ParamDomain::new(0.0, 4.0, true).unwrap();
        assert_eq!(d.clamp_param(4.0).unwrap(), 0.0);
        assert_eq!(d.clamp_param(5.5).unwrap(), 1.5);
        assert_eq!(d.clamp_param(-1.0).unwrap(), 3.0);
    }

    #[test]
    fn empty_interval_is_invalid() {
        assert!(ParamDomain::new(1.0, 1.0, false).is_err());
        assert!(ParamDomain::new(0.0, f64::INFINITY, false).is_err());
    }
}
